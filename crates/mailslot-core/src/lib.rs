//! Multi-channel single-slot mailbox relay.
//!
//! Every device instance (a `u32` id) hosts an unbounded set of channels,
//! and every channel holds at most one pending message of bounded size.
//! A writer selects a channel on a handle and deposits a message; a reader
//! selects the same channel on a (possibly different) handle and retrieves
//! the most recently deposited message. Last write wins per channel.
//!
//! This is the core value-add layer of mailslot. It is purely in-memory and
//! does no I/O; hosting it across processes lives in `mailslot-remote`.
//!
//! ```
//! use mailslot_core::SlotRegistry;
//!
//! let registry = SlotRegistry::with_defaults();
//! let mut writer = registry.open(0).unwrap();
//! let mut reader = registry.open(0).unwrap();
//!
//! writer.select(42).unwrap();
//! writer.send(b"hello").unwrap();
//!
//! reader.select(42).unwrap();
//! assert_eq!(reader.recv(128).unwrap(), b"hello");
//! ```

pub mod config;
pub mod error;
pub mod handle;
pub mod registry;
pub mod slot;
pub mod table;

pub use config::{RelayConfig, DEFAULT_MAX_INSTANCES, DEFAULT_MESSAGE_CAPACITY};
pub use error::{RelayError, Result};
pub use handle::SlotHandle;
pub use registry::SlotRegistry;
pub use slot::SlotBuffer;
pub use table::{Channel, ChannelTable};
