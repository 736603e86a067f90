//! Varint codec
//!
//! Self-terminating size prefix used for every field and name length.
//! Seven value bits per byte, most significant group first; the high bit is
//! set on every byte except the last.
//!
//! ```text
//! value < 2^7   [0vvvvvvv]
//! value < 2^14  [1vvvvvvv][0vvvvvvv]
//! value < 2^21  [1vvvvvvv][1vvvvvvv][0vvvvvvv]
//! value < 2^28  4 bytes
//! otherwise     5 bytes, first byte <= 0x8F
//! ```

use bytes::BufMut;

use super::wire::Decoded;
use crate::error::{Result, TntError};

/// Longest encoding of a u32
pub const MAX_VARINT_LEN: usize = 5;

const CONTINUATION: u8 = 0x80;
const VALUE_MASK: u8 = 0x7F;

/// Number of bytes `encode` writes for `value`
#[inline]
pub const fn size_of(value: u32) -> usize {
    if value < (1 << 7) {
        1
    } else if value < (1 << 14) {
        2
    } else if value < (1 << 21) {
        3
    } else if value < (1 << 28) {
        4
    } else {
        5
    }
}

/// Write `value` into the first `size_of(value)` bytes of `dst`
///
/// Returns the number of bytes written, or `None` if `dst` is too short.
pub fn encode_to_slice(dst: &mut [u8], value: u32) -> Option<usize> {
    let len = size_of(value);
    if dst.len() < len {
        return None;
    }
    for (i, byte) in dst[..len].iter_mut().enumerate() {
        let shift = 7 * (len - 1 - i);
        let group = ((value >> shift) as u8) & VALUE_MASK;
        *byte = if i + 1 < len { group | CONTINUATION } else { group };
    }
    Some(len)
}

/// Append the encoding of `value` to `buf`
#[inline]
pub fn encode<B: BufMut>(buf: &mut B, value: u32) {
    let mut scratch = [0u8; MAX_VARINT_LEN];
    // scratch always holds MAX_VARINT_LEN bytes
    let len = encode_to_slice(&mut scratch, value).unwrap_or(0);
    buf.put_slice(&scratch[..len]);
}

/// Decode a varint from the front of `buf`
///
/// Stops at the first byte without the continuation bit. If `buf` ends
/// before that, returns the worst-case number of bytes still missing. A
/// sixth continuation byte, or a five-byte value above `u32::MAX`, is
/// malformed.
///
/// The worst case is `5 - buf.len()`: at most 4 once a first byte has been
/// seen, and 5 for an empty buffer, since even the first byte is missing.
pub fn decode(buf: &[u8]) -> Result<Decoded<u32>> {
    let mut value: u64 = 0;
    for (i, &byte) in buf.iter().take(MAX_VARINT_LEN).enumerate() {
        value = (value << 7) | u64::from(byte & VALUE_MASK);
        if byte & CONTINUATION == 0 {
            let value = u32::try_from(value).map_err(|_| {
                TntError::malformed(format!("varint value {} overflows u32", value))
            })?;
            return Ok(Decoded::Complete {
                value,
                consumed: i + 1,
            });
        }
    }
    if buf.len() >= MAX_VARINT_LEN {
        return Err(TntError::malformed(format!(
            "varint continues past {} bytes",
            MAX_VARINT_LEN
        )));
    }
    Ok(Decoded::NeedBytes(MAX_VARINT_LEN - buf.len()))
}

/// Decode a varint that must lie entirely inside `buf`
///
/// Used inside an already-delimited record, where running off the end
/// means the record itself is corrupt.
pub(crate) fn decode_bounded(buf: &[u8], what: &str) -> Result<(u32, usize)> {
    match decode(buf)? {
        Decoded::Complete { value, consumed } => Ok((value, consumed)),
        Decoded::NeedBytes(_) => Err(TntError::malformed(format!(
            "{}: size prefix runs past end of data",
            what
        ))),
    }
}
