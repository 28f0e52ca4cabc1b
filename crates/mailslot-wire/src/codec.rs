use bytes::{Buf, BufMut, Bytes, BytesMut};

use mailslot_core::RelayError;

use crate::error::{Result, WireError};

/// Frame header: magic (2) + opcode (1) + length (4) = 7 bytes.
pub const HEADER_SIZE: usize = 7;

/// Magic bytes: "MS" (0x4D 0x53).
pub const MAGIC: [u8; 2] = [0x4D, 0x53];

/// Maximum wire payload. Relay messages are far smaller (128 bytes by
/// default); this bound only protects the decoder from hostile lengths.
pub const MAX_WIRE_PAYLOAD: usize = 64 * 1024;

const OP_OPEN: u8 = 0x01;
const OP_SELECT: u8 = 0x02;
const OP_SEND: u8 = 0x03;
const OP_RECV: u8 = 0x04;
const OP_OK: u8 = 0x80;
const OP_ERR: u8 = 0x81;

const ERR_INVALID_CHANNEL: u8 = 1;
const ERR_NOT_SELECTED: u8 = 2;
const ERR_INVALID_SIZE: u8 = 3;
const ERR_NO_MESSAGE: u8 = 4;
const ERR_BUFFER_TOO_SMALL: u8 = 5;
const ERR_TOO_MANY_INSTANCES: u8 = 6;
const ERR_NOT_OPENED: u8 = 7;
const ERR_PROTOCOL: u8 = 8;

/// ERR payload prefix: code (1) + two u64 context values (16).
const ERR_PREFIX: usize = 17;

/// A client request. One request per frame, one response per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Open a handle against a device instance. Replaces any handle the
    /// session already holds.
    Open { instance: u32 },
    /// Select a channel on the session's handle.
    Select { channel: u64 },
    /// Deposit a whole message on the selected channel.
    Send { payload: Bytes },
    /// Retrieve the pending message; `max_len` is the caller's buffer size.
    Recv { max_len: u32 },
}

/// A server response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Success. Empty for Open/Select; the accepted length (4-byte LE) for
    /// Send; the message bytes for Recv.
    Ok { payload: Bytes },
    /// Failure, with enough context to rebuild the typed error client-side.
    Err(SessionError),
}

impl Response {
    pub fn ok_empty() -> Self {
        Self::Ok {
            payload: Bytes::new(),
        }
    }
}

/// A failure reported by the server for one request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// A relay engine error, exactly as a local handle would return it.
    #[error(transparent)]
    Relay(#[from] RelayError),

    /// Select/Send/Recv arrived before any Open on this session.
    #[error("no handle open on this session (send Open first)")]
    NotOpened,

    /// The request itself violated the protocol.
    #[error("protocol violation: {0}")]
    Protocol(String),
}

impl SessionError {
    /// Stable wire code, plus two variant-specific context values.
    fn wire_parts(&self) -> (u8, u64, u64, &str) {
        match self {
            SessionError::Relay(RelayError::InvalidChannel) => (ERR_INVALID_CHANNEL, 0, 0, ""),
            SessionError::Relay(RelayError::NotSelected) => (ERR_NOT_SELECTED, 0, 0, ""),
            SessionError::Relay(RelayError::InvalidSize { size, max }) => {
                (ERR_INVALID_SIZE, *size as u64, *max as u64, "")
            }
            SessionError::Relay(RelayError::NoMessage) => (ERR_NO_MESSAGE, 0, 0, ""),
            SessionError::Relay(RelayError::BufferTooSmall { needed, provided }) => {
                (ERR_BUFFER_TOO_SMALL, *needed as u64, *provided as u64, "")
            }
            SessionError::Relay(RelayError::TooManyInstances { instance, max }) => (
                ERR_TOO_MANY_INSTANCES,
                u64::from(*instance),
                u64::from(*max),
                "",
            ),
            // A registry rejects its configuration at construction, long
            // before any session exists; if it ever surfaces here, report
            // it as a protocol-level failure.
            SessionError::Relay(RelayError::InvalidConfig(detail)) => (ERR_PROTOCOL, 0, 0, detail),
            SessionError::NotOpened => (ERR_NOT_OPENED, 0, 0, ""),
            SessionError::Protocol(detail) => (ERR_PROTOCOL, 0, 0, detail),
        }
    }

    fn from_wire_parts(code: u8, a: u64, b: u64, detail: String) -> Result<Self> {
        let err = match code {
            ERR_INVALID_CHANNEL => SessionError::Relay(RelayError::InvalidChannel),
            ERR_NOT_SELECTED => SessionError::Relay(RelayError::NotSelected),
            ERR_INVALID_SIZE => SessionError::Relay(RelayError::InvalidSize {
                size: a as usize,
                max: b as usize,
            }),
            ERR_NO_MESSAGE => SessionError::Relay(RelayError::NoMessage),
            ERR_BUFFER_TOO_SMALL => SessionError::Relay(RelayError::BufferTooSmall {
                needed: a as usize,
                provided: b as usize,
            }),
            ERR_TOO_MANY_INSTANCES => SessionError::Relay(RelayError::TooManyInstances {
                instance: a as u32,
                max: b as u32,
            }),
            ERR_NOT_OPENED => SessionError::NotOpened,
            ERR_PROTOCOL => SessionError::Protocol(detail),
            other => {
                return Err(WireError::Malformed {
                    what: "error code",
                    len: other as usize,
                })
            }
        };
        Ok(err)
    }
}

/// Encode a request into the wire format.
pub fn encode_request(request: &Request, dst: &mut BytesMut) -> Result<()> {
    match request {
        Request::Open { instance } => {
            put_header(dst, OP_OPEN, 4);
            dst.put_u32_le(*instance);
        }
        Request::Select { channel } => {
            put_header(dst, OP_SELECT, 8);
            dst.put_u64_le(*channel);
        }
        Request::Send { payload } => {
            check_payload_len(payload.len())?;
            put_header(dst, OP_SEND, payload.len());
            dst.put_slice(payload);
        }
        Request::Recv { max_len } => {
            put_header(dst, OP_RECV, 4);
            dst.put_u32_le(*max_len);
        }
    }
    Ok(())
}

/// Encode a response into the wire format.
pub fn encode_response(response: &Response, dst: &mut BytesMut) -> Result<()> {
    match response {
        Response::Ok { payload } => {
            check_payload_len(payload.len())?;
            put_header(dst, OP_OK, payload.len());
            dst.put_slice(payload);
        }
        Response::Err(err) => {
            let (code, a, b, detail) = err.wire_parts();
            check_payload_len(ERR_PREFIX + detail.len())?;
            put_header(dst, OP_ERR, ERR_PREFIX + detail.len());
            dst.put_u8(code);
            dst.put_u64_le(a);
            dst.put_u64_le(b);
            dst.put_slice(detail.as_bytes());
        }
    }
    Ok(())
}

/// Decode one request from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't hold a complete frame yet.
/// On success, consumes the frame bytes from the buffer.
pub fn decode_request(src: &mut BytesMut) -> Result<Option<Request>> {
    let Some((opcode, payload)) = take_frame(src)? else {
        return Ok(None);
    };

    let request = match opcode {
        OP_OPEN => Request::Open {
            instance: fixed_u32(&payload, "Open")?,
        },
        OP_SELECT => Request::Select {
            channel: fixed_u64(&payload, "Select")?,
        },
        OP_SEND => Request::Send { payload },
        OP_RECV => Request::Recv {
            max_len: fixed_u32(&payload, "Recv")?,
        },
        other => return Err(WireError::BadOpcode(other)),
    };
    Ok(Some(request))
}

/// Decode one response from a buffer. Same contract as [`decode_request`].
pub fn decode_response(src: &mut BytesMut) -> Result<Option<Response>> {
    let Some((opcode, payload)) = take_frame(src)? else {
        return Ok(None);
    };

    let response = match opcode {
        OP_OK => Response::Ok { payload },
        OP_ERR => {
            if payload.len() < ERR_PREFIX {
                return Err(WireError::Malformed {
                    what: "Err",
                    len: payload.len(),
                });
            }
            let code = payload[0];
            let a = u64::from_le_bytes(payload[1..9].try_into().expect("slice is 8 bytes"));
            let b = u64::from_le_bytes(payload[9..17].try_into().expect("slice is 8 bytes"));
            let detail = String::from_utf8_lossy(&payload[ERR_PREFIX..]).into_owned();
            Response::Err(SessionError::from_wire_parts(code, a, b, detail)?)
        }
        other => return Err(WireError::BadOpcode(other)),
    };
    Ok(Some(response))
}

fn put_header(dst: &mut BytesMut, opcode: u8, payload_len: usize) {
    dst.reserve(HEADER_SIZE + payload_len);
    dst.put_slice(&MAGIC);
    dst.put_u8(opcode);
    dst.put_u32_le(payload_len as u32);
}

fn check_payload_len(len: usize) -> Result<()> {
    if len > MAX_WIRE_PAYLOAD {
        return Err(WireError::PayloadTooLarge {
            size: len,
            max: MAX_WIRE_PAYLOAD,
        });
    }
    Ok(())
}

/// Split one complete frame off the buffer, or report that more input is
/// needed.
fn take_frame(src: &mut BytesMut) -> Result<Option<(u8, Bytes)>> {
    if src.len() < HEADER_SIZE {
        return Ok(None);
    }

    if src[0..2] != MAGIC {
        return Err(WireError::InvalidMagic);
    }

    let opcode = src[2];
    let payload_len = u32::from_le_bytes(src[3..7].try_into().expect("slice is 4 bytes")) as usize;
    if payload_len > MAX_WIRE_PAYLOAD {
        return Err(WireError::PayloadTooLarge {
            size: payload_len,
            max: MAX_WIRE_PAYLOAD,
        });
    }

    if src.len() < HEADER_SIZE + payload_len {
        return Ok(None);
    }

    src.advance(HEADER_SIZE);
    let payload = src.split_to(payload_len).freeze();
    Ok(Some((opcode, payload)))
}

fn fixed_u32(payload: &Bytes, what: &'static str) -> Result<u32> {
    let bytes: [u8; 4] = payload.as_ref().try_into().map_err(|_| WireError::Malformed {
        what,
        len: payload.len(),
    })?;
    Ok(u32::from_le_bytes(bytes))
}

fn fixed_u64(payload: &Bytes, what: &'static str) -> Result<u64> {
    let bytes: [u8; 8] = payload.as_ref().try_into().map_err(|_| WireError::Malformed {
        what,
        len: payload.len(),
    })?;
    Ok(u64::from_le_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip_request(request: Request) -> Request {
        let mut buf = BytesMut::new();
        encode_request(&request, &mut buf).unwrap();
        let decoded = decode_request(&mut buf).unwrap().unwrap();
        assert!(buf.is_empty());
        decoded
    }

    fn round_trip_response(response: Response) -> Response {
        let mut buf = BytesMut::new();
        encode_response(&response, &mut buf).unwrap();
        let decoded = decode_response(&mut buf).unwrap().unwrap();
        assert!(buf.is_empty());
        decoded
    }

    #[test]
    fn requests_round_trip() {
        assert_eq!(
            round_trip_request(Request::Open { instance: 3 }),
            Request::Open { instance: 3 }
        );
        assert_eq!(
            round_trip_request(Request::Select { channel: u64::MAX }),
            Request::Select { channel: u64::MAX }
        );
        assert_eq!(
            round_trip_request(Request::Send {
                payload: Bytes::from_static(b"hello")
            }),
            Request::Send {
                payload: Bytes::from_static(b"hello")
            }
        );
        assert_eq!(
            round_trip_request(Request::Recv { max_len: 128 }),
            Request::Recv { max_len: 128 }
        );
    }

    #[test]
    fn relay_errors_survive_the_wire_with_context() {
        let original = Response::Err(SessionError::Relay(RelayError::BufferTooSmall {
            needed: 12,
            provided: 4,
        }));
        assert_eq!(round_trip_response(original.clone()), original);

        let original = Response::Err(SessionError::Relay(RelayError::InvalidSize {
            size: 200,
            max: 128,
        }));
        assert_eq!(round_trip_response(original.clone()), original);

        let original = Response::Err(SessionError::Relay(RelayError::TooManyInstances {
            instance: 400,
            max: 256,
        }));
        assert_eq!(round_trip_response(original.clone()), original);
    }

    #[test]
    fn session_errors_survive_the_wire() {
        assert_eq!(
            round_trip_response(Response::Err(SessionError::NotOpened)),
            Response::Err(SessionError::NotOpened)
        );
        let protocol = Response::Err(SessionError::Protocol("bad opcode".to_string()));
        assert_eq!(round_trip_response(protocol.clone()), protocol);
    }

    #[test]
    fn ok_payload_round_trips() {
        let ok = Response::Ok {
            payload: Bytes::from_static(b"message bytes"),
        };
        assert_eq!(round_trip_response(ok.clone()), ok);
        assert_eq!(round_trip_response(Response::ok_empty()), Response::ok_empty());
    }

    #[test]
    fn incomplete_header_needs_more_data() {
        let mut buf = BytesMut::from(&MAGIC[..]);
        assert!(decode_request(&mut buf).unwrap().is_none());
    }

    #[test]
    fn incomplete_payload_needs_more_data() {
        let mut buf = BytesMut::new();
        encode_request(
            &Request::Send {
                payload: Bytes::from_static(b"hello"),
            },
            &mut buf,
        )
        .unwrap();
        buf.truncate(HEADER_SIZE + 2);
        assert!(decode_request(&mut buf).unwrap().is_none());
    }

    #[test]
    fn invalid_magic_is_rejected() {
        let mut buf = BytesMut::from(&[0xFFu8, 0xFF, 0x01, 0, 0, 0, 0][..]);
        assert!(matches!(
            decode_request(&mut buf),
            Err(WireError::InvalidMagic)
        ));
    }

    #[test]
    fn unknown_opcode_is_rejected() {
        let mut buf = BytesMut::new();
        put_header(&mut buf, 0x7F, 0);
        assert!(matches!(
            decode_request(&mut buf),
            Err(WireError::BadOpcode(0x7F))
        ));
    }

    #[test]
    fn hostile_length_is_rejected() {
        let mut buf = BytesMut::new();
        buf.put_slice(&MAGIC);
        buf.put_u8(OP_SEND);
        buf.put_u32_le(16 * 1024 * 1024);
        assert!(matches!(
            decode_request(&mut buf),
            Err(WireError::PayloadTooLarge { .. })
        ));
    }

    #[test]
    fn truncated_fixed_payload_is_malformed() {
        let mut buf = BytesMut::new();
        put_header(&mut buf, OP_OPEN, 2);
        buf.put_u16_le(3);
        assert!(matches!(
            decode_request(&mut buf),
            Err(WireError::Malformed { what: "Open", .. })
        ));
    }

    #[test]
    fn back_to_back_frames_decode_in_order() {
        let mut buf = BytesMut::new();
        encode_request(&Request::Select { channel: 42 }, &mut buf).unwrap();
        encode_request(
            &Request::Send {
                payload: Bytes::from_static(b"x"),
            },
            &mut buf,
        )
        .unwrap();

        assert_eq!(
            decode_request(&mut buf).unwrap().unwrap(),
            Request::Select { channel: 42 }
        );
        assert_eq!(
            decode_request(&mut buf).unwrap().unwrap(),
            Request::Send {
                payload: Bytes::from_static(b"x")
            }
        );
        assert!(buf.is_empty());
    }
}
