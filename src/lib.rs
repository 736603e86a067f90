//! # tntproto
//!
//! Client side of the Box binary protocol:
//! - Request encoding for ping, insert, delete, update, select and call
//! - Reply and request decoding that reports how many bytes are missing
//! - Tuples of opaque byte-string fields with varint size prefixes
//! - Cursors over fields, tuples and streams of frames
//! - Buffered send/receive over any byte transport
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Connection                            │
//! │              (request ids, in-order replies)                 │
//! └──────────────┬──────────────────────────────┬───────────────┘
//!                │ encode                       │ decode
//!                ▼                              ▼
//!   ┌────────────────────────┐     ┌────────────────────────┐
//!   │    RequestEncoder      │     │  FrameDecoder/Stream   │
//!   │  (header + body_len)   │     │  (NeedBytes / Frame)   │
//!   └───────────┬────────────┘     └───────────▲────────────┘
//!               │                              │
//!               ▼                              │
//!   ┌────────────────────────┐     ┌────────────────────────┐
//!   │      SendBuffer        │     │      RecvBuffer        │
//!   │   (write, flush)       │     │    (fill, consume)     │
//!   └───────────┬────────────┘     └───────────▲────────────┘
//!               ▼                              │
//!          ByteSink  ───────  transport  ───────  ByteSource
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;

pub mod iter;
pub mod network;
pub mod protocol;
pub mod tuple;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::Config;
pub use error::{Result, TntError};
pub use iter::{Cursor, IterStatus};
pub use network::Connection;
pub use protocol::{Decoded, Flags, OpType, Reply, Request, RequestEncoder, UpdateOpList};
pub use tuple::{Tuple, TupleList};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of tntproto
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
