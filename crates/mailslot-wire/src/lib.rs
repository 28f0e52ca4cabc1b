//! Framed request/response protocol between mailslot clients and the relay
//! server.
//!
//! Every message is framed with:
//! - A 2-byte magic number ("MS") for stream synchronization
//! - A 1-byte opcode (request or response kind)
//! - A 4-byte little-endian payload length
//!
//! One request yields exactly one response; there is no pipelining. The
//! four requests mirror the relay handle lifecycle: open an instance,
//! select a channel, send a message, receive a message. Error responses
//! carry a stable one-byte code plus the failing operation's numeric
//! context, so a client reconstructs the same typed error a local handle
//! would have returned.

pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use codec::{
    decode_request, decode_response, encode_request, encode_response, Request, Response,
    SessionError, HEADER_SIZE, MAX_WIRE_PAYLOAD,
};
pub use error::{Result, WireError};
pub use reader::WireReader;
pub use writer::WireWriter;
