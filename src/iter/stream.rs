//! Frame streams
//!
//! Pull successive replies or requests out of a byte source. Each advance
//! runs the frame decoder over the receive buffer and refills the buffer
//! from the source until one whole frame is available.
//!
//! Only one decoded frame is alive per stream: advancing drops the previous
//! one before decoding the next.

use std::io;

use crate::config::Config;
use crate::error::{Result, TntError};
use crate::network::{ByteSource, RecvBuffer};
use crate::protocol::{decode_frame, Decoded, Frame, Header, Reply, Request};

use super::{Cursor, IterStatus};

/// Forward-only cursor over the frames of a byte source
pub struct FrameStream<S, F> {
    rx: RecvBuffer<S>,
    max_body_len: usize,
    current: Option<F>,
    status: IterStatus,
    error: Option<TntError>,
    finished: bool,
    frames: u64,
}

/// Replies read from a server or a capture
pub type ReplyStream<S> = FrameStream<S, Reply>;

/// Requests read from a client or a capture
pub type RequestStream<S> = FrameStream<S, Request>;

impl<S, F> FrameStream<S, F> {
    /// Frame under the cursor
    pub fn current(&self) -> Option<&F> {
        self.current.as_ref()
    }

    /// Take ownership of the frame under the cursor
    pub fn take_current(&mut self) -> Option<F> {
        self.current.take()
    }

    /// Number of frames decoded so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Why the stream failed
    pub fn error(&self) -> Option<&TntError> {
        self.error.as_ref()
    }

    pub fn take_error(&mut self) -> Option<TntError> {
        self.error.take()
    }

    /// Bytes received but not yet decoded
    pub fn buffered(&self) -> usize {
        self.rx.buffered().len()
    }

    pub fn into_inner(self) -> S {
        self.rx.into_inner()
    }
}

impl<S: ByteSource, F: Frame> FrameStream<S, F> {
    pub fn new(source: S) -> Self {
        Self::with_config(source, &Config::default())
    }

    pub fn with_config(source: S, config: &Config) -> Self {
        Self::from_recv_buffer(
            RecvBuffer::with_capacity(source, config.recv_buffer_size),
            config.max_body_len,
        )
    }

    pub(crate) fn from_recv_buffer(rx: RecvBuffer<S>, max_body_len: usize) -> Self {
        Self {
            rx,
            max_body_len,
            current: None,
            status: IterStatus::Ok,
            error: None,
            finished: false,
            frames: 0,
        }
    }
}

impl<S: ByteSource, F: Frame> Cursor for FrameStream<S, F> {
    fn advance(&mut self) -> bool {
        self.current = None;
        if self.finished {
            return false;
        }
        match read_frame::<S, F>(&mut self.rx, self.max_body_len) {
            Ok(Some(frame)) => {
                self.current = Some(frame);
                self.frames += 1;
                true
            }
            Ok(None) => {
                tracing::trace!("{} stream ended after {} frames", F::KIND, self.frames);
                self.finished = true;
                false
            }
            Err(e) => {
                tracing::warn!("{} stream stopped after {} frames: {}", F::KIND, self.frames, e);
                self.finished = true;
                self.status = IterStatus::Fail;
                self.error = Some(e);
                false
            }
        }
    }

    fn rewind(&mut self) -> bool {
        false
    }

    fn status(&self) -> IterStatus {
        self.status
    }
}

impl<S: ByteSource, F: Frame> Iterator for FrameStream<S, F> {
    type Item = Result<F>;

    /// Yields each frame, then the error that stopped the stream, if any
    fn next(&mut self) -> Option<Self::Item> {
        if self.advance() {
            return self.current.take().map(Ok);
        }
        self.error.take().map(Err)
    }
}

/// Read one whole frame, refilling `rx` from its source as needed
///
/// Returns `Ok(None)` when the source ends exactly on a frame boundary.
/// Ending inside a frame is an `UnexpectedEof` I/O error.
pub(crate) fn read_frame<S: ByteSource, F: Frame>(
    rx: &mut RecvBuffer<S>,
    max_body_len: usize,
) -> Result<Option<F>> {
    loop {
        if let Decoded::Complete { value: header, .. } = Header::decode(rx.buffered())? {
            if header.body_len as usize > max_body_len {
                return Err(TntError::FrameTooLarge {
                    len: header.body_len as usize,
                    max: max_body_len,
                });
            }
        }

        let needed = match decode_frame::<F>(rx.buffered())? {
            Decoded::Complete { value, consumed } => {
                rx.consume(consumed);
                return Ok(Some(value));
            }
            Decoded::NeedBytes(n) => n,
        };

        let have = rx.buffered().len();
        if rx.fill(have + needed)? == have {
            if have == 0 {
                return Ok(None);
            }
            return Err(TntError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("source ended {} bytes into a {} frame", have, F::KIND),
            )));
        }
    }
}
