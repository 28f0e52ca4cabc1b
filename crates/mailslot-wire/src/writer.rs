use std::io::{ErrorKind, Write};

use bytes::BytesMut;

use crate::codec::{encode_request, encode_response, Request, Response};
use crate::error::{Result, WireError};

const INITIAL_BUFFER_CAPACITY: usize = 1024;

/// Writes complete wire frames to any `Write` stream (blocking).
pub struct WireWriter<W> {
    inner: W,
    buf: BytesMut,
}

impl<W: Write> WireWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
        }
    }

    /// Encode and write one request, then flush.
    pub fn write_request(&mut self, request: &Request) -> Result<()> {
        self.buf.clear();
        encode_request(request, &mut self.buf)?;
        self.write_buffered()
    }

    /// Encode and write one response, then flush.
    pub fn write_response(&mut self, response: &Response) -> Result<()> {
        self.buf.clear();
        encode_response(response, &mut self.buf)?;
        self.write_buffered()
    }

    fn write_buffered(&mut self) -> Result<()> {
        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(WireError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(WireError::Io(err)),
            }
        }
        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(WireError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> W {
        self.inner
    }
}
