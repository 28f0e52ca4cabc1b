use std::io::{ErrorKind, Read};

use bytes::BytesMut;

use crate::codec::{decode_request, decode_response, Request, Response};
use crate::error::{Result, WireError};

const READ_CHUNK_SIZE: usize = 4 * 1024;

/// Reads complete wire frames from any `Read` stream (blocking).
pub struct WireReader<R> {
    inner: R,
    buf: BytesMut,
}

impl<R: Read> WireReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(READ_CHUNK_SIZE),
        }
    }

    /// Read one complete request, blocking until it arrives.
    pub fn read_request(&mut self) -> Result<Request> {
        self.read_frame(decode_request)
    }

    /// Read one complete response, blocking until it arrives.
    pub fn read_response(&mut self) -> Result<Response> {
        self.read_frame(decode_response)
    }

    fn read_frame<T>(&mut self, decode: fn(&mut BytesMut) -> Result<Option<T>>) -> Result<T> {
        loop {
            if let Some(frame) = decode(&mut self.buf)? {
                return Ok(frame);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            match self.inner.read(&mut chunk) {
                Ok(0) => return Err(WireError::ConnectionClosed),
                Ok(n) => self.buf.extend_from_slice(&chunk[..n]),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(WireError::Io(err)),
            }
        }
    }
}
