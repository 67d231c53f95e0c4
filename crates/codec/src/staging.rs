//! Staging buffers between codecs and streams
//!
//! Codecs never talk to the stream directly for small writes: they stage
//! bytes in a fixed-capacity buffer and flush it when it runs full. Reads
//! are staged the same way.
//!
//! ## Invariants
//!
//! - A single atomic write never straddles a flush: [`StagingWriter::reserve`]
//!   flushes first when the request does not fit in the remaining space.
//! - A request larger than the whole buffer is [`Error::CapacityExceeded`].
//!   Large payloads go through [`StagingWriter::put_chunked`] or
//!   [`StagingWriter::put_direct`] instead.

use graphstream_core::{Error, Result, DEFAULT_STAGING_BUFFER_SIZE};
use graphstream_session::{Cache, Cached, Recyclable};
use once_cell::sync::Lazy;
use std::io::{ErrorKind, Read, Write};
use tracing::trace;

/// Pool of default-sized staging buffers.
pub static STAGING_BUFFERS: Lazy<Cache<StagingBuffer>> = Lazy::new(Cache::new);

/// Fixed-capacity byte buffer.
#[derive(Debug)]
pub struct StagingBuffer {
    bytes: Box<[u8]>,
}

impl StagingBuffer {
    /// Create a buffer of `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        StagingBuffer {
            bytes: vec![0u8; capacity].into_boxed_slice(),
        }
    }

    /// Claim a buffer of `capacity` bytes: from the pool for the default
    /// size, a detached allocation otherwise.
    pub fn claim(capacity: usize) -> Cached<StagingBuffer> {
        if capacity == DEFAULT_STAGING_BUFFER_SIZE {
            STAGING_BUFFERS.claim()
        } else {
            Cached::detached(StagingBuffer::with_capacity(capacity))
        }
    }

    /// Capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }
}

impl Default for StagingBuffer {
    fn default() -> Self {
        StagingBuffer::with_capacity(DEFAULT_STAGING_BUFFER_SIZE)
    }
}

impl Recyclable for StagingBuffer {
    // Stale bytes are never read before being overwritten.
    fn reset(&mut self) {}
}

/// Buffered writer with atomic reservations.
pub struct StagingWriter<W: Write> {
    stream: W,
    buffer: Cached<StagingBuffer>,
    len: usize,
}

impl<W: Write> StagingWriter<W> {
    /// Stage writes to `stream` through a buffer of `capacity` bytes.
    pub fn new(stream: W, capacity: usize) -> Self {
        StagingWriter {
            stream,
            buffer: StagingBuffer::claim(capacity),
            len: 0,
        }
    }

    /// Buffer capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Make room for `n` contiguous bytes, flushing if needed.
    pub fn ensure_buffer_space(&mut self, n: usize) -> Result<()> {
        let capacity = self.capacity();
        if n > capacity {
            return Err(Error::CapacityExceeded {
                requested: n,
                capacity,
            });
        }
        if self.len + n > capacity {
            self.flush_buffer()?;
        }
        Ok(())
    }

    /// Reserve `n` contiguous bytes and return them for filling.
    pub fn reserve(&mut self, n: usize) -> Result<&mut [u8]> {
        self.ensure_buffer_space(n)?;
        let start = self.len;
        self.len += n;
        Ok(&mut self.buffer.bytes[start..start + n])
    }

    /// Stage one byte.
    pub fn put_u8(&mut self, value: u8) -> Result<()> {
        self.reserve(1)?[0] = value;
        Ok(())
    }

    /// Stage `bytes` in buffer-sized pieces.
    pub fn put_chunked(&mut self, mut bytes: &[u8]) -> Result<()> {
        while !bytes.is_empty() {
            if self.len == self.capacity() {
                self.flush_buffer()?;
            }
            let n = bytes.len().min(self.capacity() - self.len);
            self.buffer.bytes[self.len..self.len + n].copy_from_slice(&bytes[..n]);
            self.len += n;
            bytes = &bytes[n..];
        }
        Ok(())
    }

    /// Flush staged bytes and write `bytes` straight to the stream.
    pub fn put_direct(&mut self, bytes: &[u8]) -> Result<()> {
        self.flush_buffer()?;
        self.stream.write_all(bytes)?;
        Ok(())
    }

    /// Write staged bytes to the stream without flushing the stream itself.
    pub fn flush_buffer(&mut self) -> Result<()> {
        if self.len > 0 {
            trace!(target: "graphstream", bytes = self.len, "flushing staging buffer");
            self.stream.write_all(&self.buffer.bytes[..self.len])?;
            self.len = 0;
        }
        Ok(())
    }

    /// Write staged bytes and flush the stream.
    pub fn flush(&mut self) -> Result<()> {
        self.flush_buffer()?;
        self.stream.flush()?;
        Ok(())
    }

    /// Bytes staged but not yet written.
    pub fn pending(&self) -> usize {
        self.len
    }

    /// The underlying stream.
    pub fn get_ref(&self) -> &W {
        &self.stream
    }

    /// The underlying stream, mutably.
    ///
    /// Staged bytes are not flushed first.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.stream
    }

    /// Flush and return the stream.
    pub fn into_inner(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.stream)
    }
}

/// Buffered reader with lookahead.
pub struct StagingReader<R: Read> {
    stream: R,
    buffer: Cached<StagingBuffer>,
    start: usize,
    end: usize,
    consumed: u64,
    eof: bool,
}

impl<R: Read> StagingReader<R> {
    /// Stage reads from `stream` through a buffer of `capacity` bytes.
    pub fn new(stream: R, capacity: usize) -> Self {
        StagingReader {
            stream,
            buffer: StagingBuffer::claim(capacity),
            start: 0,
            end: 0,
            consumed: 0,
            eof: false,
        }
    }

    /// Number of bytes consumed since creation.
    pub fn position(&self) -> u64 {
        self.consumed
    }

    fn available(&self) -> usize {
        self.end - self.start
    }

    /// Try to have at least `n` (at most capacity) bytes buffered.
    ///
    /// Returns whether they are available; `false` means the stream ended.
    fn fill(&mut self, n: usize) -> Result<bool> {
        let n = n.min(self.buffer.capacity());
        if self.available() >= n {
            return Ok(true);
        }
        if self.start > 0 {
            self.buffer.bytes.copy_within(self.start..self.end, 0);
            self.end -= self.start;
            self.start = 0;
        }
        while self.end < n && !self.eof {
            match self.stream.read(&mut self.buffer.bytes[self.end..]) {
                Ok(0) => self.eof = true,
                Ok(read) => self.end += read,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(self.end >= n)
    }

    /// Next byte without consuming it.
    pub fn peek_u8(&mut self) -> Result<Option<u8>> {
        if !self.fill(1)? {
            return Ok(None);
        }
        Ok(Some(self.buffer.bytes[self.start]))
    }

    /// Consume one byte.
    pub fn take_u8(&mut self) -> Result<Option<u8>> {
        let byte = self.peek_u8()?;
        if byte.is_some() {
            self.start += 1;
            self.consumed += 1;
        }
        Ok(byte)
    }

    /// Consume exactly `N` bytes.
    pub fn take_array<const N: usize>(&mut self) -> Result<Option<[u8; N]>> {
        let mut out = [0u8; N];
        Ok(self.read_exact_into(&mut out)?.then_some(out))
    }

    /// Fill `out` completely, in buffer-sized pieces if needed.
    ///
    /// Returns `false` if the stream ended first.
    pub fn read_exact_into(&mut self, out: &mut [u8]) -> Result<bool> {
        let mut filled = 0;
        while filled < out.len() {
            if !self.fill(1)? {
                return Ok(false);
            }
            let n = self.available().min(out.len() - filled);
            out[filled..filled + n].copy_from_slice(&self.buffer.bytes[self.start..self.start + n]);
            self.start += n;
            self.consumed += n as u64;
            filled += n;
        }
        Ok(true)
    }

    /// Discard `n` bytes. Returns `false` if the stream ended first.
    pub fn skip_bytes(&mut self, mut n: u64) -> Result<bool> {
        while n > 0 {
            if !self.fill(1)? {
                return Ok(false);
            }
            let step = (self.available() as u64).min(n) as usize;
            self.start += step;
            self.consumed += step as u64;
            n -= step as u64;
        }
        Ok(true)
    }

    /// Drop buffered bytes and the end-of-stream flag.
    pub fn reset(&mut self) {
        self.start = 0;
        self.end = 0;
        self.eof = false;
    }

    /// The underlying stream.
    pub fn get_ref(&self) -> &R {
        &self.stream
    }

    /// The underlying stream, mutably. Buffered bytes are not returned to it.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.stream
    }

    /// Return the stream, dropping buffered bytes.
    pub fn into_inner(self) -> R {
        self.stream
    }
}
