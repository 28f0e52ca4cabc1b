use std::sync::Arc;

use tracing::debug;

use crate::error::{RelayError, Result};
use crate::table::{Channel, ChannelTable};

/// One caller's open session against a device instance.
///
/// A handle starts unselected; [`select`](Self::select) binds it to a
/// channel id, after which [`send`](Self::send) and [`recv`](Self::recv)
/// operate on that channel's slot. Dropping the handle releases the session
/// without touching the underlying table or its messages — messages outlive
/// the handle that wrote them.
///
/// Channels are only ever materialized by `select`; send and receive work
/// on the channel captured at selection time and never create one
/// implicitly.
#[derive(Debug)]
pub struct SlotHandle {
    table: Arc<ChannelTable>,
    selected: Option<Arc<Channel>>,
}

impl SlotHandle {
    pub(crate) fn new(table: Arc<ChannelTable>) -> Self {
        Self {
            table,
            selected: None,
        }
    }

    /// The device instance this handle was opened against.
    pub fn instance_id(&self) -> u32 {
        self.table.instance_id()
    }

    /// The currently selected channel id, if any.
    pub fn selected_channel(&self) -> Option<u64> {
        self.selected.as_ref().map(|channel| channel.id())
    }

    /// Bind this handle to a channel, creating it on first use of the id.
    ///
    /// Channel id 0 is reserved and always fails with
    /// [`RelayError::InvalidChannel`]. Re-selecting (the same or another id)
    /// merely repoints the handle; the target channel's pending message is
    /// unaffected.
    pub fn select(&mut self, channel_id: u64) -> Result<()> {
        if channel_id == 0 {
            return Err(RelayError::InvalidChannel);
        }
        let channel = self.table.find_or_create(channel_id);
        debug!(
            instance = self.table.instance_id(),
            channel = channel_id,
            "channel selected"
        );
        self.selected = Some(channel);
        Ok(())
    }

    /// Deposit a whole message on the selected channel, replacing any
    /// previous one. Returns the number of bytes accepted — always the full
    /// payload; there are no partial sends.
    pub fn send(&self, payload: &[u8]) -> Result<usize> {
        let channel = self.selected.as_ref().ok_or(RelayError::NotSelected)?;
        let accepted = channel.store(payload)?;
        debug!(
            instance = self.table.instance_id(),
            channel = channel.id(),
            bytes = accepted,
            "message stored"
        );
        Ok(accepted)
    }

    /// Retrieve the pending message on the selected channel.
    ///
    /// `max_len` is the caller's buffer size; messages longer than that
    /// fail rather than truncate. An empty channel fails with
    /// [`RelayError::NoMessage`] immediately — this is a non-blocking
    /// single-shot read, never a wait.
    pub fn recv(&self, max_len: usize) -> Result<Vec<u8>> {
        let channel = self.selected.as_ref().ok_or(RelayError::NotSelected)?;
        channel.load(max_len)
    }
}
