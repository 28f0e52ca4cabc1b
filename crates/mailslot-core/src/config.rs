use crate::error::{RelayError, Result};

/// Default slot capacity in bytes.
pub const DEFAULT_MESSAGE_CAPACITY: usize = 128;

/// Default bound on distinct device instances.
pub const DEFAULT_MAX_INSTANCES: u32 = 256;

/// Tunables for a [`SlotRegistry`](crate::SlotRegistry).
///
/// Defaults match the classic message-slot bounds (128-byte messages, 256
/// device instances); both are configuration so tests and embedders can
/// size isolated registries instead of sharing hard-coded constants.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Capacity of every slot buffer in bytes. Sends larger than this fail.
    pub message_capacity: usize,
    /// Instance ids `0..max_instances` are valid; anything above is rejected.
    pub max_instances: u32,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            message_capacity: DEFAULT_MESSAGE_CAPACITY,
            max_instances: DEFAULT_MAX_INSTANCES,
        }
    }
}

impl RelayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.message_capacity == 0 {
            return Err(RelayError::InvalidConfig("message_capacity must be >= 1"));
        }
        if self.max_instances == 0 {
            return Err(RelayError::InvalidConfig("max_instances must be >= 1"));
        }
        Ok(())
    }
}
