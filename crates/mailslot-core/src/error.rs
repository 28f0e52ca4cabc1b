/// Errors that can occur in relay engine operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    /// Channel id 0 is reserved for "no channel selected".
    #[error("channel id 0 is reserved (no channel selected)")]
    InvalidChannel,

    /// Send or receive attempted before any channel was selected.
    #[error("no channel selected on this handle")]
    NotSelected,

    /// Send payload is empty or exceeds the slot capacity.
    #[error("message size {size} out of range (1..={max} bytes)")]
    InvalidSize { size: usize, max: usize },

    /// Receive on a channel with nothing pending.
    ///
    /// This is a non-blocking would-block condition: the caller may retry
    /// after a later send, but the engine itself never waits.
    #[error("no message pending on the selected channel")]
    NoMessage,

    /// Receive buffer smaller than the stored message. Truncated reads are
    /// not permitted; the message stays pending.
    #[error("receive buffer too small ({provided} bytes, message is {needed})")]
    BufferTooSmall { needed: usize, provided: usize },

    /// Instance id beyond the configured instance bound.
    #[error("instance {instance} out of range (max {max} instances)")]
    TooManyInstances { instance: u32, max: u32 },

    /// Rejected registry configuration.
    #[error("invalid relay configuration: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = std::result::Result<T, RelayError>;
