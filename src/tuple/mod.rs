//! Tuple Module
//!
//! Variable-cardinality records of opaque byte-string fields.
//!
//! ## Tuple Wire Format
//! ```text
//! ┌────────────────┬─────────────┬──────────┬─────────────┬──────────┐
//! │ cardinality(4) │ varint(len) │ bytes... │ varint(len) │ bytes... │ ...
//! └────────────────┴─────────────┴──────────┴─────────────┴──────────┘
//! ```
//!
//! Fields carry no type tag. By convention a 4- or 8-byte field often holds
//! a little-endian integer; [`field_to_u32`] and [`field_to_u64`] apply that
//! convention.

mod list;
mod record;

use std::fmt;

pub use list::TupleList;
pub use record::Tuple;

/// Read a 4-byte field as a little-endian u32
pub fn field_to_u32(field: &[u8]) -> Option<u32> {
    let bytes: [u8; 4] = field.try_into().ok()?;
    Some(u32::from_le_bytes(bytes))
}

/// Read a 4- or 8-byte field as a little-endian integer
pub fn field_to_u64(field: &[u8]) -> Option<u64> {
    match field.len() {
        4 => field_to_u32(field).map(u64::from),
        8 => {
            let bytes: [u8; 8] = field.try_into().ok()?;
            Some(u64::from_le_bytes(bytes))
        }
        _ => None,
    }
}

/// Format one field the way a console would show it
///
/// Printable ASCII prints quoted, 4/8-byte fields print as integers,
/// anything else prints as hex.
pub(crate) fn fmt_field(f: &mut fmt::Formatter<'_>, field: &[u8]) -> fmt::Result {
    let printable = !field.is_empty() && field.iter().all(|b| (0x20..0x7f).contains(b));
    if printable {
        write!(f, "'")?;
        for &b in field {
            if b == b'\'' {
                write!(f, "\\'")?;
            } else {
                write!(f, "{}", b as char)?;
            }
        }
        return write!(f, "'");
    }
    if let Some(n) = field_to_u64(field) {
        return write!(f, "{}", n);
    }
    write!(f, "0x")?;
    for b in field {
        write!(f, "{:02x}", b)?;
    }
    Ok(())
}
