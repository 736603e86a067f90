//! Protocol codec
//!
//! Framing for requests and replies: header + body in, `Decoded` out.
//!
//! Decoding never touches body bytes until the whole frame is buffered:
//! with fewer than 12 bytes the decoder asks for the rest of the header,
//! then for the rest of the body, and only then dispatches on the op type.

use std::marker::PhantomData;

use bytes::BytesMut;

use super::header::{Header, OpType, HEADER_SIZE};
use super::reply::Reply;
use super::request::{Request, RequestBody};
use super::wire::{wire_len, Decoded};
use crate::error::{Result, TntError};

/// A message that travels in one frame
pub trait Frame: Sized {
    /// Name used in logs and errors
    const KIND: &'static str;

    /// Decode the body that follows `header`
    fn decode_body(header: &Header, body: &[u8]) -> Result<Self>;
}

impl Frame for Request {
    const KIND: &'static str = "request";

    fn decode_body(header: &Header, body: &[u8]) -> Result<Self> {
        let body = RequestBody::decode(header.op_type, body)?;
        Ok(Request::new(header.request_id, body))
    }
}

impl Frame for Reply {
    const KIND: &'static str = "reply";

    fn decode_body(header: &Header, body: &[u8]) -> Result<Self> {
        Reply::decode(header.op_type, header.request_id, body)
    }
}

// =============================================================================
// Encoding
// =============================================================================

/// Write a frame whose body is produced by `put_body`
///
/// `body_len` is computed by the caller from the parts it is about to
/// write; the bytes actually written are checked against it.
pub(crate) fn write_frame(
    buf: &mut BytesMut,
    op_type: OpType,
    request_id: u32,
    body_len: usize,
    put_body: impl FnOnce(&mut BytesMut) -> Result<()>,
) -> Result<usize> {
    let wire_body_len = wire_len(body_len, "frame body")?;
    let start = buf.len();
    buf.reserve(HEADER_SIZE + body_len);
    Header::new(op_type, wire_body_len, request_id).encode(buf);
    let body_start = buf.len();
    if let Err(e) = put_body(buf) {
        buf.truncate(start);
        return Err(e);
    }
    let written = buf.len() - body_start;
    if written != body_len {
        buf.truncate(start);
        return Err(TntError::SizeMismatch {
            expected: body_len,
            actual: written,
        });
    }
    Ok(HEADER_SIZE + body_len)
}

/// Append `request` to `buf`, returning the frame size
pub fn encode_request(request: &Request, buf: &mut BytesMut) -> Result<usize> {
    write_frame(
        buf,
        request.op_type(),
        request.request_id,
        request.body_len(),
        |b| request.body.encode(b),
    )
}

/// Append `reply` to `buf`, returning the frame size
pub fn encode_reply(reply: &Reply, buf: &mut BytesMut) -> Result<usize> {
    write_frame(
        buf,
        reply.op_type,
        reply.request_id,
        reply.encoded_size(),
        |b| reply.encode_body(b),
    )
}

// =============================================================================
// Decoding
// =============================================================================

/// How many bytes the frame at the front of `buf` occupies
pub fn frame_size(buf: &[u8]) -> Result<Decoded<usize>> {
    Ok(match Header::decode(buf)? {
        Decoded::NeedBytes(n) => Decoded::NeedBytes(n),
        Decoded::Complete { value, .. } => {
            let total = value.frame_len();
            if buf.len() < total {
                Decoded::NeedBytes(total - buf.len())
            } else {
                Decoded::Complete {
                    value: total,
                    consumed: total,
                }
            }
        }
    })
}

/// Decode the frame at the front of `buf`
///
/// Bytes after the frame are left alone; `consumed` says where they start.
pub fn decode_frame<F: Frame>(buf: &[u8]) -> Result<Decoded<F>> {
    let header = match Header::decode(buf)? {
        Decoded::NeedBytes(n) => return Ok(Decoded::NeedBytes(n)),
        Decoded::Complete { value, .. } => value,
    };
    let total = header.frame_len();
    if buf.len() < total {
        return Ok(Decoded::NeedBytes(total - buf.len()));
    }
    let value = F::decode_body(&header, &buf[HEADER_SIZE..total])?;
    tracing::trace!(
        "Decoded {} {} (id {}, {} bytes)",
        header.op_type,
        F::KIND,
        header.request_id,
        total
    );
    Ok(Decoded::Complete {
        value,
        consumed: total,
    })
}

/// Decode a request frame
pub fn decode_request(buf: &[u8]) -> Result<Decoded<Request>> {
    decode_frame(buf)
}

/// Decode a reply frame
pub fn decode_reply(buf: &[u8]) -> Result<Decoded<Reply>> {
    decode_frame(buf)
}

// =============================================================================
// Stateful Decoder
// =============================================================================

/// Where a `FrameDecoder` is in the current frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeState {
    /// Fewer than `HEADER_SIZE` bytes buffered
    WantHeader,
    /// Header parsed, body incomplete
    WantBody(Header),
    /// A frame was malformed; `reset` is required
    Failed,
}

/// Decoder that accumulates chunks of any size and yields whole frames
pub struct FrameDecoder<F> {
    buf: BytesMut,
    state: DecodeState,
    max_body_len: usize,
    _frame: PhantomData<fn() -> F>,
}

/// Decoder for server replies
pub type ReplyDecoder = FrameDecoder<Reply>;

/// Decoder for client requests
pub type RequestDecoder = FrameDecoder<Request>;

impl<F: Frame> FrameDecoder<F> {
    pub fn new() -> Self {
        Self::with_max_body_len(crate::config::Config::default().max_body_len)
    }

    /// Decoder that rejects frames with bodies above `max_body_len`
    pub fn with_max_body_len(max_body_len: usize) -> Self {
        Self {
            buf: BytesMut::new(),
            state: DecodeState::WantHeader,
            max_body_len,
            _frame: PhantomData,
        }
    }

    /// Buffer more input
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn state(&self) -> DecodeState {
        self.state
    }

    /// Bytes buffered but not yet returned as a frame
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Drop buffered input and leave the failed state
    pub fn reset(&mut self) {
        self.buf.clear();
        self.state = DecodeState::WantHeader;
    }

    /// Try to produce the next frame from buffered input
    ///
    /// `consumed` in the result is the frame's size; those bytes are gone
    /// from the buffer. Any error moves the decoder to `Failed`.
    pub fn decode(&mut self) -> Result<Decoded<F>> {
        match self.step() {
            Ok(decoded) => Ok(decoded),
            Err(e) => {
                tracing::trace!("{} decoder failed: {}", F::KIND, e);
                self.state = DecodeState::Failed;
                Err(e)
            }
        }
    }

    fn step(&mut self) -> Result<Decoded<F>> {
        let header = match self.state {
            DecodeState::Failed => {
                return Err(TntError::Malformed(format!(
                    "{} decoder is in the failed state",
                    F::KIND
                )))
            }
            DecodeState::WantBody(header) => header,
            DecodeState::WantHeader => match Header::decode(&self.buf)? {
                Decoded::NeedBytes(n) => return Ok(Decoded::NeedBytes(n)),
                Decoded::Complete { value, .. } => {
                    if value.body_len as usize > self.max_body_len {
                        return Err(TntError::FrameTooLarge {
                            len: value.body_len as usize,
                            max: self.max_body_len,
                        });
                    }
                    self.state = DecodeState::WantBody(value);
                    value
                }
            },
        };

        let total = header.frame_len();
        if self.buf.len() < total {
            return Ok(Decoded::NeedBytes(total - self.buf.len()));
        }
        let frame = self.buf.split_to(total);
        self.state = DecodeState::WantHeader;
        let value = F::decode_body(&header, &frame[HEADER_SIZE..])?;
        Ok(Decoded::Complete {
            value,
            consumed: total,
        })
    }
}

impl<F: Frame> Default for FrameDecoder<F> {
    fn default() -> Self {
        Self::new()
    }
}
