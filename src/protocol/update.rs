//! Update operations
//!
//! The operation payload of an UPDATE request.
//!
//! ## Wire Format
//! ```text
//! op_count (4)
//! per op: field_no (4) | op_code (1) | varint(arg_len) | arg
//! ```
//!
//! SET and INSERT carry the raw value; arithmetic ops carry a 4- or 8-byte
//! little-endian integer; DELETE carries no argument; SPLICE carries three
//! varint-prefixed sub-fields: offset (4), length (4), replacement.

use bytes::{BufMut, Bytes, BytesMut};

use super::varint;
use super::wire::{take_bytes, take_u32, take_u8, wire_len};
use crate::error::{Result, TntError};

/// Update operation codes (fixed protocol constants)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum UpdateOpKind {
    Set = 0,
    Add = 1,
    And = 2,
    Xor = 3,
    Or = 4,
    Splice = 5,
    Delete = 6,
    Insert = 7,
}

impl UpdateOpKind {
    pub fn from_u8(code: u8) -> Option<Self> {
        match code {
            0 => Some(UpdateOpKind::Set),
            1 => Some(UpdateOpKind::Add),
            2 => Some(UpdateOpKind::And),
            3 => Some(UpdateOpKind::Xor),
            4 => Some(UpdateOpKind::Or),
            5 => Some(UpdateOpKind::Splice),
            6 => Some(UpdateOpKind::Delete),
            7 => Some(UpdateOpKind::Insert),
            _ => None,
        }
    }

    /// ADD, AND, XOR and OR
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            UpdateOpKind::Add | UpdateOpKind::And | UpdateOpKind::Xor | UpdateOpKind::Or
        )
    }
}

/// Integer argument of an arithmetic op; the width is not tagged on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithValue {
    U32(u32),
    U64(u64),
}

impl ArithValue {
    fn to_le_bytes(self) -> Bytes {
        match self {
            ArithValue::U32(v) => Bytes::copy_from_slice(&v.to_le_bytes()),
            ArithValue::U64(v) => Bytes::copy_from_slice(&v.to_le_bytes()),
        }
    }
}

impl From<u32> for ArithValue {
    fn from(v: u32) -> Self {
        ArithValue::U32(v)
    }
}

impl From<u64> for ArithValue {
    fn from(v: u64) -> Self {
        ArithValue::U64(v)
    }
}

/// Decoded SPLICE argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splice {
    pub offset: u32,
    pub length: u32,
    pub replacement: Bytes,
}

impl Splice {
    fn encoded_size(&self) -> usize {
        2 * (varint::size_of(4) + 4)
            + varint::size_of(self.replacement.len() as u32)
            + self.replacement.len()
    }

    fn encode(&self) -> Result<Bytes> {
        let replacement_len = wire_len(self.replacement.len(), "splice replacement")?;
        let mut buf = BytesMut::with_capacity(self.encoded_size());
        varint::encode(&mut buf, 4);
        buf.put_u32_le(self.offset);
        varint::encode(&mut buf, 4);
        buf.put_u32_le(self.length);
        varint::encode(&mut buf, replacement_len);
        buf.put_slice(&self.replacement);
        Ok(buf.freeze())
    }

    fn decode(arg: &[u8]) -> Result<Self> {
        let mut cur = arg;
        let offset = Self::int_part(&mut cur, "splice offset")?;
        let length = Self::int_part(&mut cur, "splice length")?;
        let replacement = Self::part(&mut cur, "splice replacement")?;
        if !cur.is_empty() {
            return Err(TntError::Malformed(format!(
                "splice argument has {} trailing bytes",
                cur.len()
            )));
        }
        Ok(Splice {
            offset,
            length,
            replacement: Bytes::copy_from_slice(replacement),
        })
    }

    fn part<'a>(cur: &mut &'a [u8], what: &str) -> Result<&'a [u8]> {
        let (len, prefix) = varint::decode_bounded(cur, what)?;
        *cur = &cur[prefix..];
        take_bytes(cur, len as usize, what)
    }

    fn int_part(cur: &mut &[u8], what: &str) -> Result<u32> {
        let part = Self::part(cur, what)?;
        let bytes: [u8; 4] = part.try_into().map_err(|_| {
            TntError::Malformed(format!("{}: expected 4 bytes, got {}", what, part.len()))
        })?;
        Ok(u32::from_le_bytes(bytes))
    }
}

/// A single per-field update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOp {
    pub field_no: u32,
    pub kind: UpdateOpKind,
    pub arg: Bytes,
}

impl UpdateOp {
    /// Build an op, checking that `arg` has the shape `kind` requires
    pub fn new(field_no: u32, kind: UpdateOpKind, arg: impl Into<Bytes>) -> Result<Self> {
        let op = UpdateOp {
            field_no,
            kind,
            arg: arg.into(),
        };
        op.check()?;
        Ok(op)
    }

    /// `validate` for caller-built ops: a bad shape is the caller's value
    fn check(&self) -> Result<()> {
        self.validate().map_err(|e| match e {
            TntError::Malformed(msg) => TntError::BadValue(msg),
            other => other,
        })
    }

    fn validate(&self) -> Result<()> {
        wire_len(self.arg.len(), "update argument")?;
        match self.kind {
            k if k.is_arithmetic() => {
                if self.arg.len() != 4 && self.arg.len() != 8 {
                    return Err(TntError::Malformed(format!(
                        "{:?} on field {} needs a 4- or 8-byte integer, got {} bytes",
                        k,
                        self.field_no,
                        self.arg.len()
                    )));
                }
            }
            UpdateOpKind::Splice => {
                Splice::decode(&self.arg)?;
            }
            UpdateOpKind::Delete => {
                if !self.arg.is_empty() {
                    return Err(TntError::Malformed(format!(
                        "delete on field {} carries a {}-byte argument",
                        self.field_no,
                        self.arg.len()
                    )));
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Bytes this op occupies in the payload
    pub fn encoded_size(&self) -> usize {
        4 + 1 + varint::size_of(self.arg.len() as u32) + self.arg.len()
    }

    /// The SPLICE argument, if this is a splice
    pub fn splice(&self) -> Option<Splice> {
        match self.kind {
            UpdateOpKind::Splice => Splice::decode(&self.arg).ok(),
            _ => None,
        }
    }

    /// The integer argument of an arithmetic op
    pub fn arith_value(&self) -> Option<u64> {
        if !self.kind.is_arithmetic() {
            return None;
        }
        crate::tuple::field_to_u64(&self.arg)
    }

    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u32_le(self.field_no);
        buf.put_u8(self.kind as u8);
        varint::encode(buf, self.arg.len() as u32);
        buf.put_slice(&self.arg);
    }
}

/// Ordered update operations with a running encoded size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOpList {
    ops: Vec<UpdateOp>,
    /// op_count word plus every op's encoded size
    encoded_size: usize,
}

impl UpdateOpList {
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            encoded_size: 4,
        }
    }

    /// Replace field `field_no` with `data`
    pub fn add_assign(&mut self, field_no: u32, data: &[u8]) -> Result<&mut Self> {
        self.append_op(UpdateOp::new(
            field_no,
            UpdateOpKind::Set,
            Bytes::copy_from_slice(data),
        )?)
    }

    /// Apply ADD, AND, XOR or OR with an integer argument
    pub fn add_arith(
        &mut self,
        field_no: u32,
        kind: UpdateOpKind,
        value: impl Into<ArithValue>,
    ) -> Result<&mut Self> {
        if !kind.is_arithmetic() {
            return Err(TntError::BadValue(format!(
                "{:?} is not an arithmetic update op",
                kind
            )));
        }
        self.append_op(UpdateOp::new(field_no, kind, value.into().to_le_bytes())?)
    }

    /// Replace `length` bytes at `offset` inside field `field_no`
    pub fn add_splice(
        &mut self,
        field_no: u32,
        offset: u32,
        length: u32,
        replacement: &[u8],
    ) -> Result<&mut Self> {
        let splice = Splice {
            offset,
            length,
            replacement: Bytes::copy_from_slice(replacement),
        };
        let arg = splice.encode()?;
        self.append_op(UpdateOp::new(field_no, UpdateOpKind::Splice, arg)?)
    }

    /// Remove field `field_no`
    pub fn add_delete(&mut self, field_no: u32) -> Result<&mut Self> {
        self.append_op(UpdateOp::new(field_no, UpdateOpKind::Delete, Bytes::new())?)
    }

    /// Insert `data` before field `field_no`
    pub fn add_insert(&mut self, field_no: u32, data: &[u8]) -> Result<&mut Self> {
        self.append_op(UpdateOp::new(
            field_no,
            UpdateOpKind::Insert,
            Bytes::copy_from_slice(data),
        )?)
    }

    /// Append an already-built op
    ///
    /// The op's argument is checked against its kind the same way
    /// `UpdateOp::new` checks it, so a struct built by hand cannot slip an
    /// undecodable op into the payload.
    pub fn push(&mut self, op: UpdateOp) -> Result<&mut Self> {
        op.check()?;
        self.append_op(op)
    }

    fn append_op(&mut self, op: UpdateOp) -> Result<&mut Self> {
        self.ops
            .try_reserve(1)
            .map_err(|e| TntError::OutOfMemory(format!("update op list: {}", e)))?;
        self.encoded_size += op.encoded_size();
        self.ops.push(op);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UpdateOp> {
        self.ops.iter()
    }

    pub fn get(&self, index: usize) -> Option<&UpdateOp> {
        self.ops.get(index)
    }

    /// Payload size tracked while ops were added
    pub fn encoded_size(&self) -> usize {
        self.encoded_size
    }

    /// Append the payload to `buf`
    ///
    /// Fails with `SizeMismatch` if the bytes written differ from the
    /// running total: the request header was sized from that total.
    pub fn pack_into(&self, buf: &mut BytesMut) -> Result<usize> {
        let count = wire_len(self.ops.len(), "update op count")?;
        let start = buf.len();
        buf.reserve(self.encoded_size);
        buf.put_u32_le(count);
        for op in &self.ops {
            op.encode(buf);
        }
        let written = buf.len() - start;
        if written != self.encoded_size {
            return Err(TntError::SizeMismatch {
                expected: self.encoded_size,
                actual: written,
            });
        }
        Ok(written)
    }

    /// The payload as a standalone buffer
    pub fn pack(&self) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(self.encoded_size);
        self.pack_into(&mut buf)?;
        Ok(buf.freeze())
    }

    /// Decode a payload that occupies all of `buf`
    pub fn from_wire(buf: &[u8]) -> Result<Self> {
        let mut cur = buf;
        let count = take_u32(&mut cur, "update op count")?;
        let mut list = UpdateOpList::new();
        for i in 0..count {
            let field_no = take_u32(&mut cur, "update field_no")?;
            let code = take_u8(&mut cur, "update op code")?;
            let kind = UpdateOpKind::from_u8(code).ok_or_else(|| {
                TntError::Malformed(format!("update op {} has unknown code {}", i, code))
            })?;
            let (len, prefix) = varint::decode_bounded(cur, "update argument")?;
            cur = &cur[prefix..];
            let arg = take_bytes(&mut cur, len as usize, "update argument")?;
            let op = UpdateOp {
                field_no,
                kind,
                arg: Bytes::copy_from_slice(arg),
            };
            op.validate()?;
            list.append_op(op)?;
        }
        if !cur.is_empty() {
            return Err(TntError::Malformed(format!(
                "{} trailing bytes after {} update ops",
                cur.len(),
                count
            )));
        }
        Ok(list)
    }
}

impl Default for UpdateOpList {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a UpdateOpList {
    type Item = &'a UpdateOp;
    type IntoIter = std::slice::Iter<'a, UpdateOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}
