//! Buffered channel
//!
//! Two independent halves over a transport:
//!
//! - `SendBuffer` collects writes in memory and hands them to the sink in
//!   one logical send on `flush`.
//! - `RecvBuffer` refills from the source a whole buffer at a time and
//!   serves reads out of what it already holds.
//!
//! Both buffers grow by doubling and never shrink.

use std::io;

use bytes::{Buf, Bytes, BytesMut};

use crate::config::Config;
use crate::error::{Result, TntError};

use super::transport::{send_all, ByteSink, ByteSource};

// =============================================================================
// Send Half
// =============================================================================

/// Accumulate-then-flush buffer in front of a sink
pub struct SendBuffer<W> {
    sink: W,
    buf: BytesMut,
    capacity: usize,
}

impl<W: ByteSink> SendBuffer<W> {
    pub fn with_capacity(sink: W, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            sink,
            buf: BytesMut::with_capacity(capacity),
            capacity,
        }
    }

    /// Buffer `bytes` without touching the sink
    ///
    /// A payload larger than the whole buffer flushes what is pending and
    /// goes straight to the sink. A payload that merely does not fit grows
    /// the buffer.
    pub fn write(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() > self.capacity {
            self.flush()?;
            tracing::trace!("Sending {} bytes past the buffer", bytes.len());
            send_all(&mut self.sink, bytes)
                .map_err(|(written, source)| TntError::Transport { written, source })?;
            self.sink.sync()?;
            return Ok(());
        }
        let needed = self.buf.len() + bytes.len();
        if needed > self.capacity {
            while self.capacity < needed {
                self.capacity *= 2;
            }
            self.buf.reserve(self.capacity - self.buf.len());
            tracing::trace!("Send buffer grown to {} bytes", self.capacity);
        }
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    /// Send everything buffered, returning the byte count
    ///
    /// On failure the bytes the sink accepted are dropped and the rest stay
    /// buffered; the error says how many went out.
    pub fn flush(&mut self) -> Result<usize> {
        if self.buf.is_empty() {
            return Ok(0);
        }
        let len = self.buf.len();
        if let Err((written, source)) = send_all(&mut self.sink, &self.buf) {
            self.buf.advance(written);
            return Err(TntError::Transport { written, source });
        }
        self.buf.clear();
        self.sink.sync()?;
        tracing::trace!("Flushed {} bytes", len);
        Ok(len)
    }

    /// Bytes waiting for `flush`
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    /// The sink; unflushed bytes are discarded
    pub fn into_inner(self) -> W {
        self.sink
    }
}

// =============================================================================
// Receive Half
// =============================================================================

/// Refill-on-demand buffer behind a source
pub struct RecvBuffer<R> {
    source: R,
    buf: BytesMut,
    capacity: usize,
}

impl<R> RecvBuffer<R> {
    /// Received bytes not yet consumed
    pub fn buffered(&self) -> &[u8] {
        &self.buf
    }

    /// Discard the first `n` buffered bytes
    ///
    /// # Panics
    /// If fewer than `n` bytes are buffered.
    pub fn consume(&mut self, n: usize) {
        self.buf.advance(n);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get_ref(&self) -> &R {
        &self.source
    }

    /// The source; buffered bytes are discarded
    pub fn into_inner(self) -> R {
        self.source
    }
}

impl<R: ByteSource> RecvBuffer<R> {
    pub fn with_capacity(source: R, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            source,
            buf: BytesMut::with_capacity(capacity),
            capacity,
        }
    }

    /// Read from the source until at least `n` bytes are buffered
    ///
    /// Each source read asks for the whole free space of the buffer, not
    /// just the shortfall. Returns the buffered byte count, which is below
    /// `n` only if the source reached end of stream.
    pub fn fill(&mut self, n: usize) -> Result<usize> {
        if n > self.capacity {
            while self.capacity < n {
                self.capacity *= 2;
            }
            tracing::trace!("Receive buffer grown to {} bytes", self.capacity);
        }
        while self.buf.len() < n {
            let start = self.buf.len();
            self.buf.resize(self.capacity, 0);
            let read = loop {
                match self.source.recv(&mut self.buf[start..]) {
                    Ok(read) => break Ok(read),
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => break Err(e),
                }
            };
            match read {
                Ok(read) => {
                    self.buf.truncate(start + read);
                    if read == 0 {
                        break;
                    }
                }
                Err(e) => {
                    self.buf.truncate(start);
                    return Err(e.into());
                }
            }
        }
        Ok(self.buf.len())
    }

    /// Up to `n` bytes, fewer only at end of stream
    pub fn read(&mut self, n: usize) -> Result<Bytes> {
        let available = self.fill(n)?.min(n);
        Ok(self.buf.split_to(available).freeze())
    }

    /// Exactly `n` bytes
    pub fn read_exact(&mut self, n: usize) -> Result<Bytes> {
        let available = self.fill(n)?;
        if available < n {
            return Err(TntError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("wanted {} bytes, source ended after {}", n, available),
            )));
        }
        Ok(self.buf.split_to(n).freeze())
    }
}

// =============================================================================
// Channel
// =============================================================================

/// A send half and a receive half over one transport
pub struct BufferedChannel<R, W> {
    rx: RecvBuffer<R>,
    tx: SendBuffer<W>,
}

impl<R: ByteSource, W: ByteSink> BufferedChannel<R, W> {
    pub fn new(reader: R, writer: W, config: &Config) -> Self {
        Self {
            rx: RecvBuffer::with_capacity(reader, config.recv_buffer_size),
            tx: SendBuffer::with_capacity(writer, config.send_buffer_size),
        }
    }

    pub fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.tx.write(bytes)
    }

    pub fn flush(&mut self) -> Result<usize> {
        self.tx.flush()
    }

    pub fn read(&mut self, n: usize) -> Result<Bytes> {
        self.rx.read(n)
    }

    pub fn tx(&mut self) -> &mut SendBuffer<W> {
        &mut self.tx
    }

    pub fn rx(&mut self) -> &mut RecvBuffer<R> {
        &mut self.rx
    }

    pub fn into_parts(self) -> (RecvBuffer<R>, SendBuffer<W>) {
        (self.rx, self.tx)
    }
}
