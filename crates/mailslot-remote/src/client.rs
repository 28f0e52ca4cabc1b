use std::os::unix::net::UnixStream;
use std::path::Path;

use bytes::Bytes;
use tracing::debug;

use mailslot_wire::{Request, Response, SessionError, WireReader, WireWriter};

use crate::error::{RemoteError, Result};
use crate::transport::{self, TransportError};

/// Client side of one relay session.
///
/// Connecting performs the Open immediately, so a constructed client always
/// holds a live (unselected) handle on the server. Every operation is one
/// synchronous request/response round trip; dropping the client closes the
/// connection, which releases the server-side handle without touching any
/// pending message.
pub struct RelayClient {
    reader: WireReader<UnixStream>,
    writer: WireWriter<UnixStream>,
    instance: u32,
}

impl RelayClient {
    /// Connect to the relay at `path` and open a handle on `instance`.
    pub fn open(path: impl AsRef<Path>, instance: u32) -> Result<Self> {
        let stream = transport::connect(path.as_ref())?;
        let write_half = stream.try_clone().map_err(TransportError::Io)?;

        let mut client = Self {
            reader: WireReader::new(stream),
            writer: WireWriter::new(write_half),
            instance,
        };
        client.call(Request::Open { instance })?;
        debug!(instance, "relay handle opened");
        Ok(client)
    }

    /// Select a channel for subsequent send/recv calls.
    pub fn select(&mut self, channel: u64) -> Result<()> {
        self.call(Request::Select { channel })?;
        Ok(())
    }

    /// Deposit a whole message on the selected channel. Returns the number
    /// of bytes accepted (always the full payload).
    pub fn send(&mut self, payload: &[u8]) -> Result<usize> {
        let reply = self.call(Request::Send {
            payload: Bytes::copy_from_slice(payload),
        })?;
        let bytes: [u8; 4] = reply.as_ref().try_into().map_err(|_| {
            RemoteError::UnexpectedResponse(format!(
                "send reply should be 4 bytes, got {}",
                reply.len()
            ))
        })?;
        Ok(u32::from_le_bytes(bytes) as usize)
    }

    /// Retrieve the pending message on the selected channel. `max_len`
    /// advertises the caller's buffer size; longer messages fail rather
    /// than truncate.
    pub fn recv(&mut self, max_len: u32) -> Result<Vec<u8>> {
        let reply = self.call(Request::Recv { max_len })?;
        Ok(reply.to_vec())
    }

    fn call(&mut self, request: Request) -> Result<Bytes> {
        self.writer.write_request(&request)?;
        match self.reader.read_response()? {
            Response::Ok { payload } => Ok(payload),
            Response::Err(SessionError::Relay(err)) => Err(RemoteError::Relay(err)),
            Response::Err(other) => Err(RemoteError::Session(other.to_string())),
        }
    }
}

impl std::fmt::Debug for RelayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayClient")
            .field("instance", &self.instance)
            .finish()
    }
}
