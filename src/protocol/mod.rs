//! Protocol Module
//!
//! The Box binary protocol: one request/reply stream per connection.
//!
//! ## Frame Format
//!
//! Every message, in either direction, is a fixed header followed by a body.
//! ```text
//! ┌──────────────┬──────────────┬────────────────┬─────────────────────┐
//! │ op_type (4)  │ body_len (4) │ request_id (4) │       Body          │
//! └──────────────┴──────────────┴────────────────┴─────────────────────┘
//! ```
//! All integers are little-endian. `body_len` counts every byte after the
//! header, never the header itself.
//!
//! ### Operation Codes
//! - 65280: PING
//! - 13:    INSERT
//! - 17:    SELECT
//! - 19:    UPDATE
//! - 21:    DELETE
//! - 22:    CALL
//!
//! ### Field Sizes
//! Field lengths inside tuples and update ops are varints: 7 bits per byte,
//! most significant group first, high bit set on every byte but the last.
//!
//! Request and reply bodies are described in [`request`] and [`reply`].

pub mod header;
pub mod reply;
pub mod request;
pub mod update;
pub mod varint;
pub mod wire;

mod codec;
mod encoder;

pub use codec::{
    decode_frame, decode_reply, decode_request, encode_reply, encode_request, frame_size,
    DecodeState, Frame, FrameDecoder, ReplyDecoder, RequestDecoder,
};
pub use encoder::RequestEncoder;
pub use header::{Flags, Header, OpType, HEADER_SIZE};
pub use reply::{Reply, STATUS_ERROR, STATUS_OK, STATUS_TRY_AGAIN};
pub use request::{Call, Delete, Insert, Request, RequestBody, Select, Update};
pub use update::{ArithValue, Splice, UpdateOp, UpdateOpKind, UpdateOpList};
pub use wire::Decoded;
