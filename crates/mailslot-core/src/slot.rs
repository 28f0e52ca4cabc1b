use crate::error::{RelayError, Result};

/// Fixed-capacity storage cell for one channel's pending message.
///
/// A slot holds at most one message. A successful [`store`](Self::store)
/// fully replaces the previous content; a [`load`](Self::load) returns the
/// message without consuming it, so repeated loads observe the same bytes
/// until the next store overwrites them. The non-consuming read is the
/// deliberate contract, not an accident of implementation.
#[derive(Debug)]
pub struct SlotBuffer {
    data: Box<[u8]>,
    len: usize,
}

impl SlotBuffer {
    /// Create an empty slot with the given capacity in bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity].into_boxed_slice(),
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Length of the pending message, 0 when the slot is empty.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether a message is pending. Equivalent to `!is_empty()`; the
    /// "has message iff length > 0" invariant holds by construction.
    pub fn has_message(&self) -> bool {
        self.len > 0
    }

    /// Store a message, replacing any previous content.
    ///
    /// Empty payloads and payloads over capacity fail with
    /// [`RelayError::InvalidSize`]. Validation happens before any byte is
    /// written, so a failed store leaves the previous message untouched.
    /// Returns the number of bytes accepted (always the full payload).
    pub fn store(&mut self, payload: &[u8]) -> Result<usize> {
        if payload.is_empty() || payload.len() > self.data.len() {
            return Err(RelayError::InvalidSize {
                size: payload.len(),
                max: self.data.len(),
            });
        }
        self.data[..payload.len()].copy_from_slice(payload);
        self.len = payload.len();
        Ok(self.len)
    }

    /// Borrow the pending message without consuming it.
    ///
    /// `max_len` is the size of the caller's receive buffer; a message
    /// longer than that fails with [`RelayError::BufferTooSmall`] rather
    /// than truncating, and stays pending.
    pub fn load(&self, max_len: usize) -> Result<&[u8]> {
        if self.len == 0 {
            return Err(RelayError::NoMessage);
        }
        if self.len > max_len {
            return Err(RelayError::BufferTooSmall {
                needed: self.len,
                provided: max_len,
            });
        }
        Ok(&self.data[..self.len])
    }

    /// Drop any pending message. Used by teardown only; normal operation
    /// never empties a slot once a message has been stored.
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_slot_is_empty() {
        let slot = SlotBuffer::new(128);
        assert!(slot.is_empty());
        assert!(!slot.has_message());
        assert_eq!(slot.len(), 0);
        assert_eq!(slot.capacity(), 128);
    }

    #[test]
    fn store_then_load_round_trips() {
        let mut slot = SlotBuffer::new(128);
        assert_eq!(slot.store(b"hello").unwrap(), 5);
        assert!(slot.has_message());
        assert_eq!(slot.load(128).unwrap(), b"hello");
    }

    #[test]
    fn load_does_not_consume() {
        let mut slot = SlotBuffer::new(128);
        slot.store(b"sticky").unwrap();
        assert_eq!(slot.load(128).unwrap(), b"sticky");
        assert_eq!(slot.load(128).unwrap(), b"sticky");
        assert!(slot.has_message());
    }

    #[test]
    fn store_replaces_previous_content() {
        let mut slot = SlotBuffer::new(128);
        slot.store(b"a longer first message").unwrap();
        slot.store(b"second").unwrap();
        assert_eq!(slot.load(128).unwrap(), b"second");
    }

    #[test]
    fn store_accepts_exact_capacity() {
        let mut slot = SlotBuffer::new(128);
        let payload = vec![0xA5u8; 128];
        assert_eq!(slot.store(&payload).unwrap(), 128);
        assert_eq!(slot.load(128).unwrap(), payload.as_slice());
    }

    #[test]
    fn empty_store_fails_and_preserves_content() {
        let mut slot = SlotBuffer::new(128);
        slot.store(b"keep me").unwrap();
        assert_eq!(
            slot.store(b""),
            Err(RelayError::InvalidSize { size: 0, max: 128 })
        );
        assert_eq!(slot.load(128).unwrap(), b"keep me");
    }

    #[test]
    fn oversized_store_fails_and_preserves_content() {
        let mut slot = SlotBuffer::new(128);
        slot.store(b"keep me").unwrap();
        let too_big = vec![0u8; 200];
        assert_eq!(
            slot.store(&too_big),
            Err(RelayError::InvalidSize {
                size: 200,
                max: 128
            })
        );
        assert_eq!(slot.load(128).unwrap(), b"keep me");
    }

    #[test]
    fn load_from_empty_slot_fails() {
        let slot = SlotBuffer::new(128);
        assert_eq!(slot.load(128), Err(RelayError::NoMessage));
    }

    #[test]
    fn undersized_load_fails_without_consuming() {
        let mut slot = SlotBuffer::new(128);
        slot.store(b"twelve bytes").unwrap();
        assert_eq!(
            slot.load(4),
            Err(RelayError::BufferTooSmall {
                needed: 12,
                provided: 4
            })
        );
        assert_eq!(slot.load(12).unwrap(), b"twelve bytes");
    }

    #[test]
    fn clear_empties_the_slot() {
        let mut slot = SlotBuffer::new(128);
        slot.store(b"gone").unwrap();
        slot.clear();
        assert!(slot.is_empty());
        assert_eq!(slot.load(128), Err(RelayError::NoMessage));
    }
}
