//! Error types for tntproto
//!
//! Provides a unified error type for encoding, decoding and transport I/O.
//! "Not enough bytes yet" is not an error: decoders report it through
//! [`Decoded::NeedBytes`](crate::protocol::Decoded).

use thiserror::Error;

/// Result type alias using TntError
pub type Result<T> = std::result::Result<T, TntError>;

/// Unified error type for tntproto operations
#[derive(Debug, Error)]
pub enum TntError {
    // -------------------------------------------------------------------------
    // Transport Errors (fatal to the connection)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transport write failed after {written} bytes: {source}")]
    Transport {
        written: usize,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Format Errors (fatal to the current frame)
    // -------------------------------------------------------------------------
    #[error("Malformed frame: {0}")]
    Malformed(String),

    #[error("Truncated reply row {row}: declared {declared} bytes, {available} available")]
    TruncatedRow {
        row: u32,
        declared: usize,
        available: usize,
    },

    #[error("Frame too large: body of {len} bytes (max {max})")]
    FrameTooLarge { len: usize, max: usize },

    // -------------------------------------------------------------------------
    // Construction Errors
    // -------------------------------------------------------------------------
    #[error("Out of memory: {0}")]
    OutOfMemory(String),

    #[error("Bad value: {0}")]
    BadValue(String),

    #[error("Encoded size mismatch: computed {expected} bytes, wrote {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TntError {
    /// True when the connection is unusable and the caller must reconnect
    pub fn is_connection_fatal(&self) -> bool {
        matches!(self, TntError::Io(_) | TntError::Transport { .. })
    }

    /// True for errors caused by bytes that violate the wire format
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            TntError::Malformed(_) | TntError::TruncatedRow { .. } | TntError::FrameTooLarge { .. }
        )
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        TntError::Malformed(msg.into())
    }
}
