/// Errors that can occur while encoding, decoding, or transporting wire
/// frames.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The frame header contains an invalid magic number.
    #[error("invalid frame magic (expected 0x4D53 \"MS\")")]
    InvalidMagic,

    /// The frame header carries an opcode this protocol does not define.
    #[error("unknown opcode 0x{0:02x}")]
    BadOpcode(u8),

    /// The payload exceeds the wire payload bound.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The payload length does not match the opcode's expected shape.
    #[error("malformed {what} payload ({len} bytes)")]
    Malformed { what: &'static str, len: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("wire I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection was closed before a complete frame was exchanged.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, WireError>;
