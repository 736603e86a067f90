//! Tuple implementation
//!
//! The tuple keeps its own wire encoding as storage, so `pack` is free and
//! field access walks the encoded bytes.

use std::fmt;

use bytes::{BufMut, BytesMut};

use crate::error::{Result, TntError};
use crate::iter::FieldIter;
use crate::protocol::varint;
use crate::protocol::wire::take_u32;

/// Cardinality header size
const CARDINALITY_SIZE: usize = 4;

/// Ordered record of opaque byte-string fields
///
/// Invariant: `data` always holds a valid tuple encoding whose first four
/// bytes are the field count.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Tuple {
    data: BytesMut,
}

impl Tuple {
    /// Create an empty tuple (cardinality 0)
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty tuple with room for `capacity` bytes of fields
    pub fn with_capacity(capacity: usize) -> Self {
        let mut data = BytesMut::with_capacity(CARDINALITY_SIZE + capacity);
        data.put_u32_le(0);
        Self { data }
    }

    /// Build a tuple from a sequence of fields
    pub fn from_fields<I, F>(fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: AsRef<[u8]>,
    {
        let mut tuple = Tuple::new();
        for field in fields {
            tuple.append(field.as_ref());
        }
        tuple
    }

    /// Decode a tuple that occupies all of `buf`
    ///
    /// The bytes are copied; the tuple does not borrow `buf`.
    pub fn from_wire(buf: &[u8]) -> Result<Self> {
        if buf.len() < CARDINALITY_SIZE {
            return Err(TntError::Malformed(format!(
                "tuple of {} bytes is shorter than its cardinality header",
                buf.len()
            )));
        }
        let len = Self::wire_len(buf)?;
        if len != buf.len() {
            return Err(TntError::Malformed(format!(
                "tuple decoded to {} bytes but {} were supplied",
                len,
                buf.len()
            )));
        }
        Ok(Self {
            data: BytesMut::from(buf),
        })
    }

    /// Measure the tuple encoded at the front of `buf`
    ///
    /// Walks every field's size prefix; bytes after the tuple are ignored.
    pub fn wire_len(buf: &[u8]) -> Result<usize> {
        let mut cur = buf;
        let cardinality = take_u32(&mut cur, "tuple cardinality")?;
        let mut pos = CARDINALITY_SIZE;
        for i in 0..cardinality {
            let (size, prefix) = varint::decode_bounded(&buf[pos..], "tuple field")?;
            let end = (pos + prefix)
                .checked_add(size as usize)
                .filter(|end| *end <= buf.len())
                .ok_or_else(|| {
                    TntError::Malformed(format!(
                        "field {} of {} declares {} bytes, only {} left",
                        i,
                        cardinality,
                        size,
                        buf.len() - pos - prefix
                    ))
                })?;
            pos = end;
        }
        Ok(pos)
    }

    /// Field count
    pub fn cardinality(&self) -> u32 {
        u32::from_le_bytes([self.data[0], self.data[1], self.data[2], self.data[3]])
    }

    pub fn len(&self) -> usize {
        self.cardinality() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.cardinality() == 0
    }

    /// Size of the wire encoding, cardinality header included
    pub fn encoded_size(&self) -> usize {
        self.data.len()
    }

    /// Append a copy of `field`
    ///
    /// # Panics
    /// If the field is longer than `u32::MAX` bytes or the tuple already
    /// holds `u32::MAX` fields. Use `try_append` to get an error instead.
    pub fn append(&mut self, field: &[u8]) -> &mut Self {
        if let Err(e) = self.try_append(field) {
            panic!("{}", e);
        }
        self
    }

    /// Append a copy of `field`, failing with `BadValue` where `append` panics
    pub fn try_append(&mut self, field: &[u8]) -> Result<&mut Self> {
        let slot = self.append_uninitialized(field.len())?;
        slot.copy_from_slice(field);
        Ok(self)
    }

    /// Append a zero-filled field of `size` bytes and return it for writing
    ///
    /// Nothing is written when `size` does not fit the u32 size prefix or
    /// the field count would overflow.
    pub fn append_uninitialized(&mut self, size: usize) -> Result<&mut [u8]> {
        let wire_size = u32::try_from(size).map_err(|_| {
            TntError::BadValue(format!(
                "tuple field of {} bytes exceeds the u32 size prefix",
                size
            ))
        })?;
        let cardinality = self.cardinality().checked_add(1).ok_or_else(|| {
            TntError::BadValue(format!("tuple already holds {} fields", u32::MAX))
        })?;
        self.data.reserve(varint::size_of(wire_size) + size);
        varint::encode(&mut self.data, wire_size);
        let start = self.data.len();
        self.data.resize(start + size, 0);
        self.data[..CARDINALITY_SIZE].copy_from_slice(&cardinality.to_le_bytes());
        Ok(&mut self.data[start..])
    }

    /// Append a 4-byte little-endian integer field
    pub fn append_u32(&mut self, value: u32) -> &mut Self {
        self.append(&value.to_le_bytes())
    }

    /// Append an 8-byte little-endian integer field
    pub fn append_u64(&mut self, value: u64) -> &mut Self {
        self.append(&value.to_le_bytes())
    }

    pub fn append_str(&mut self, value: &str) -> &mut Self {
        self.append(value.as_bytes())
    }

    /// Field at `index`, found by scanning from the first field
    pub fn get(&self, index: usize) -> Option<&[u8]> {
        self.fields().nth(index)
    }

    /// Cursor over the fields in order
    pub fn fields(&self) -> FieldIter<'_> {
        FieldIter::over_wire(&self.data)
    }

    /// The wire encoding
    pub fn pack(&self) -> &[u8] {
        &self.data
    }

    /// Append the wire encoding to `buf`
    pub fn pack_into<B: BufMut>(&self, buf: &mut B) {
        buf.put_slice(&self.data);
    }
}

impl Default for Tuple {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: AsRef<[u8]>> FromIterator<F> for Tuple {
    fn from_iter<I: IntoIterator<Item = F>>(iter: I) -> Self {
        Tuple::from_fields(iter)
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, field) in self.fields().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            super::fmt_field(f, field)?;
        }
        write!(f, "]")
    }
}

impl fmt::Debug for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tuple{}", self)
    }
}
