use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::error::Result;
use crate::slot::SlotBuffer;

/// A named single-slot mailbox within one device instance.
///
/// The slot is guarded by its own mutex, so sends and receives on one
/// channel serialize against each other without contending with any other
/// channel or instance.
#[derive(Debug)]
pub struct Channel {
    id: u64,
    slot: Mutex<SlotBuffer>,
}

impl Channel {
    fn new(id: u64, capacity: usize) -> Self {
        Self {
            id,
            slot: Mutex::new(SlotBuffer::new(capacity)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Whether this channel currently holds a pending message.
    pub fn has_message(&self) -> bool {
        self.lock_slot().has_message()
    }

    /// Store a message in this channel's slot, replacing any previous one.
    pub fn store(&self, payload: &[u8]) -> Result<usize> {
        self.lock_slot().store(payload)
    }

    /// Copy out the pending message without consuming it.
    pub fn load(&self, max_len: usize) -> Result<Vec<u8>> {
        self.lock_slot().load(max_len).map(<[u8]>::to_vec)
    }

    pub(crate) fn clear(&self) {
        self.lock_slot().clear();
    }

    fn lock_slot(&self) -> std::sync::MutexGuard<'_, SlotBuffer> {
        // A panic while holding the lock cannot leave the slot half-written
        // (store validates before mutating), so a poisoned lock is still
        // consistent state.
        match self.slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Per-device-instance collection of channels, unique by id.
///
/// Channels are created on first select of an id and never removed
/// individually; they live until [`clear`](Self::clear) at teardown.
#[derive(Debug)]
pub struct ChannelTable {
    instance_id: u32,
    message_capacity: usize,
    channels: Mutex<HashMap<u64, Arc<Channel>>>,
}

impl ChannelTable {
    pub(crate) fn new(instance_id: u32, message_capacity: usize) -> Self {
        Self {
            instance_id,
            message_capacity,
            channels: Mutex::new(HashMap::new()),
        }
    }

    pub fn instance_id(&self) -> u32 {
        self.instance_id
    }

    /// Look up a channel, creating an empty one on first use of the id.
    ///
    /// The returned `Arc` is shared: every handle that selects this id on
    /// this instance observes the same slot.
    pub fn find_or_create(&self, channel_id: u64) -> Arc<Channel> {
        let mut channels = self.lock_channels();
        Arc::clone(channels.entry(channel_id).or_insert_with(|| {
            debug!(
                instance = self.instance_id,
                channel = channel_id,
                "creating channel"
            );
            Arc::new(Channel::new(channel_id, self.message_capacity))
        }))
    }

    /// Read-only lookup. Never creates; send/receive paths must not
    /// materialize channels as a side effect.
    pub fn lookup(&self, channel_id: u64) -> Option<Arc<Channel>> {
        self.lock_channels().get(&channel_id).cloned()
    }

    pub fn channel_count(&self) -> usize {
        self.lock_channels().len()
    }

    /// Drop every channel and its pending message. Teardown only.
    pub fn clear(&self) {
        let mut channels = self.lock_channels();
        for channel in channels.values() {
            channel.clear();
        }
        channels.clear();
    }

    fn lock_channels(&self) -> std::sync::MutexGuard<'_, HashMap<u64, Arc<Channel>>> {
        match self.channels.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RelayError;

    #[test]
    fn find_or_create_returns_the_same_channel() {
        let table = ChannelTable::new(0, 128);
        let first = table.find_or_create(42);
        let second = table.find_or_create(42);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(table.channel_count(), 1);
    }

    #[test]
    fn lookup_never_creates() {
        let table = ChannelTable::new(0, 128);
        assert!(table.lookup(7).is_none());
        assert_eq!(table.channel_count(), 0);

        table.find_or_create(7);
        assert!(table.lookup(7).is_some());
    }

    #[test]
    fn channels_are_isolated_by_id() {
        let table = ChannelTable::new(0, 128);
        let five = table.find_or_create(5);
        let seven = table.find_or_create(7);

        five.store(b"for five").unwrap();
        assert_eq!(seven.load(128), Err(RelayError::NoMessage));
        assert_eq!(five.load(128).unwrap(), b"for five");
    }

    #[test]
    fn message_is_shared_across_lookups() {
        let table = ChannelTable::new(0, 128);
        table.find_or_create(9).store(b"shared").unwrap();
        let again = table.lookup(9).expect("channel 9 should exist");
        assert_eq!(again.load(128).unwrap(), b"shared");
    }

    #[test]
    fn clear_drops_channels_and_messages() {
        let table = ChannelTable::new(0, 128);
        table.find_or_create(1).store(b"x").unwrap();
        table.find_or_create(2);
        table.clear();
        assert_eq!(table.channel_count(), 0);
        assert!(table.lookup(1).is_none());
    }
}
