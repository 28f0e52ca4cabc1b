use mailslot_core::RelayError;

use crate::transport::TransportError;

/// Errors that can occur in client/server relay operations.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// Socket-level failure (bind, connect, accept, clone).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Frame-level failure (encode, decode, stream I/O).
    #[error("wire error: {0}")]
    Wire(#[from] mailslot_wire::WireError),

    /// The server reported a relay engine error, reconstructed with the
    /// same variant and context a local handle would have returned.
    #[error(transparent)]
    Relay(RelayError),

    /// The server rejected the request at the session level (no handle
    /// open, protocol violation).
    #[error("session rejected: {0}")]
    Session(String),

    /// The server's response did not match the request's expected shape.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

pub type Result<T> = std::result::Result<T, RemoteError>;
