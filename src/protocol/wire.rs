//! Wire primitives
//!
//! The `Decoded` progress value shared by every decoder, and bounds-checked
//! little-endian readers over a body slice.

use bytes::Buf;

use crate::error::{Result, TntError};

/// Outcome of a decode attempt over a possibly incomplete buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded<T> {
    /// Not enough bytes yet. The count is a lower bound on what is still
    /// missing; callers re-invoke after buffering at least that much more.
    NeedBytes(usize),

    /// A complete value and the number of input bytes it occupied.
    Complete { value: T, consumed: usize },
}

impl<T> Decoded<T> {
    /// Returns true if a value was decoded
    pub fn is_complete(&self) -> bool {
        matches!(self, Decoded::Complete { .. })
    }

    /// Missing byte count, if incomplete
    pub fn needed(&self) -> Option<usize> {
        match self {
            Decoded::NeedBytes(n) => Some(*n),
            Decoded::Complete { .. } => None,
        }
    }

    /// The decoded value, discarding the consumed count
    pub fn into_value(self) -> Option<T> {
        match self {
            Decoded::Complete { value, .. } => Some(value),
            Decoded::NeedBytes(_) => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Decoded<U> {
        match self {
            Decoded::NeedBytes(n) => Decoded::NeedBytes(n),
            Decoded::Complete { value, consumed } => Decoded::Complete {
                value: f(value),
                consumed,
            },
        }
    }
}

/// Read a little-endian u32, failing with `Malformed` when `what` is cut short
pub(crate) fn take_u32(cur: &mut &[u8], what: &str) -> Result<u32> {
    if cur.remaining() < 4 {
        return Err(TntError::Malformed(format!(
            "{}: need 4 bytes, {} left",
            what,
            cur.remaining()
        )));
    }
    Ok(cur.get_u32_le())
}

/// Read a single byte, failing with `Malformed` when the body is exhausted
pub(crate) fn take_u8(cur: &mut &[u8], what: &str) -> Result<u8> {
    if !cur.has_remaining() {
        return Err(TntError::Malformed(format!("{}: body exhausted", what)));
    }
    Ok(cur.get_u8())
}

/// Split off the next `len` bytes
pub(crate) fn take_bytes<'a>(cur: &mut &'a [u8], len: usize, what: &str) -> Result<&'a [u8]> {
    if cur.len() < len {
        return Err(TntError::Malformed(format!(
            "{}: declared {} bytes, {} left",
            what,
            len,
            cur.len()
        )));
    }
    let (head, tail) = cur.split_at(len);
    *cur = tail;
    Ok(head)
}

/// Convert a length to its u32 wire form
pub(crate) fn wire_len(len: usize, what: &str) -> Result<u32> {
    u32::try_from(len)
        .map_err(|_| TntError::BadValue(format!("{} of {} bytes exceeds u32 range", what, len)))
}
