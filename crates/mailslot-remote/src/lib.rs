//! Unix domain socket hosting for the mailslot relay.
//!
//! The relay core is purely in-memory, so independent sender and reader
//! processes need a host that owns the registry and makes it reachable.
//! A small server process plays that role, over a Unix domain socket.
//! Each accepted connection is one session owning at most one relay
//! handle, mirroring per-descriptor semantics: open, select, send/recv,
//! released on disconnect.
//!
//! This crate is Unix-only.

pub mod client;
pub mod error;
pub mod server;
pub mod transport;

pub use client::RelayClient;
pub use error::{RemoteError, Result};
pub use server::RelayServer;
pub use transport::{TransportError, UdsListener};
