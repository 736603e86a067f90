//! Request definitions
//!
//! Client requests and their body encodings.
//!
//! ### Body by Operation
//! - PING:   empty
//! - INSERT: space (4) + flags (4) + tuple
//! - DELETE: space (4) + flags (4) + key tuple
//! - UPDATE: space (4) + flags (4) + key tuple + update ops
//! - SELECT: space (4) + index (4) + offset (4) + limit (4) + key_count (4) + key tuples
//! - CALL:   flags (4) + varint(name_len) + name + argument tuple

use bytes::{BufMut, BytesMut};

use super::header::{Flags, Header, OpType};
use super::update::UpdateOpList;
use super::varint;
use super::wire::{take_bytes, take_u32, wire_len};
use crate::error::{Result, TntError};
use crate::tuple::{Tuple, TupleList};

/// Insert a tuple into a space
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insert {
    pub space: u32,
    pub flags: Flags,
    pub tuple: Tuple,
}

/// Delete the tuple matching a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delete {
    pub space: u32,
    pub flags: Flags,
    pub key: Tuple,
}

/// Apply update operations to the tuple matching a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    pub space: u32,
    pub flags: Flags,
    pub key: Tuple,
    pub ops: UpdateOpList,
}

/// Select tuples matching any of the keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Select {
    pub space: u32,
    pub index: u32,
    pub offset: u32,
    pub limit: u32,
    pub keys: TupleList,
}

/// Call a stored procedure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub flags: Flags,
    pub proc_name: String,
    pub args: Tuple,
}

/// Per-operation request body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    Ping,
    Insert(Insert),
    Delete(Delete),
    Update(Update),
    Select(Select),
    Call(Call),
}

/// A complete request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub request_id: u32,
    pub body: RequestBody,
}

impl Request {
    pub fn new(request_id: u32, body: RequestBody) -> Self {
        Self { request_id, body }
    }

    pub fn ping() -> Self {
        Self::new(0, RequestBody::Ping)
    }

    pub fn insert(space: u32, flags: Flags, tuple: Tuple) -> Self {
        Self::new(0, RequestBody::Insert(Insert { space, flags, tuple }))
    }

    pub fn delete(space: u32, flags: Flags, key: Tuple) -> Self {
        Self::new(0, RequestBody::Delete(Delete { space, flags, key }))
    }

    pub fn update(space: u32, flags: Flags, key: Tuple, ops: UpdateOpList) -> Self {
        Self::new(
            0,
            RequestBody::Update(Update {
                space,
                flags,
                key,
                ops,
            }),
        )
    }

    pub fn select(space: u32, index: u32, offset: u32, limit: u32, keys: TupleList) -> Self {
        Self::new(
            0,
            RequestBody::Select(Select {
                space,
                index,
                offset,
                limit,
                keys,
            }),
        )
    }

    pub fn call(flags: Flags, proc_name: impl Into<String>, args: Tuple) -> Self {
        Self::new(
            0,
            RequestBody::Call(Call {
                flags,
                proc_name: proc_name.into(),
                args,
            }),
        )
    }

    /// Set the request id (builder style)
    pub fn with_id(mut self, request_id: u32) -> Self {
        self.request_id = request_id;
        self
    }

    pub fn op_type(&self) -> OpType {
        self.body.op_type()
    }

    /// Exact number of bytes that follow the header
    pub fn body_len(&self) -> usize {
        self.body.encoded_size()
    }

    /// Header this request is framed with
    pub fn header(&self) -> Result<Header> {
        let body_len = wire_len(self.body_len(), "request body")?;
        Ok(Header::new(self.op_type(), body_len, self.request_id))
    }
}

impl RequestBody {
    pub fn op_type(&self) -> OpType {
        match self {
            RequestBody::Ping => OpType::Ping,
            RequestBody::Insert(_) => OpType::Insert,
            RequestBody::Delete(_) => OpType::Delete,
            RequestBody::Update(_) => OpType::Update,
            RequestBody::Select(_) => OpType::Select,
            RequestBody::Call(_) => OpType::Call,
        }
    }

    pub(crate) fn encoded_size(&self) -> usize {
        match self {
            RequestBody::Ping => 0,
            RequestBody::Insert(i) => insert_body_len(&i.tuple),
            RequestBody::Delete(d) => delete_body_len(&d.key),
            RequestBody::Update(u) => update_body_len(&u.key, &u.ops),
            RequestBody::Select(s) => select_body_len(&s.keys),
            RequestBody::Call(c) => call_body_len(&c.proc_name, &c.args),
        }
    }

    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<()> {
        match self {
            RequestBody::Ping => Ok(()),
            RequestBody::Insert(i) => {
                put_insert_body(buf, i.space, i.flags, &i.tuple);
                Ok(())
            }
            RequestBody::Delete(d) => {
                put_delete_body(buf, d.space, d.flags, &d.key);
                Ok(())
            }
            RequestBody::Update(u) => put_update_body(buf, u.space, u.flags, &u.key, &u.ops),
            RequestBody::Select(s) => {
                put_select_body(buf, s.space, s.index, s.offset, s.limit, &s.keys)
            }
            RequestBody::Call(c) => put_call_body(buf, c.flags, &c.proc_name, &c.args),
        }
    }

    /// Decode the body of a request whose header has already been read
    pub(crate) fn decode(op_type: OpType, body: &[u8]) -> Result<Self> {
        match op_type {
            OpType::Ping => decode_ping(body),
            OpType::Insert => decode_insert(body),
            OpType::Delete => decode_delete(body),
            OpType::Update => decode_update(body),
            OpType::Select => decode_select(body),
            OpType::Call => decode_call(body),
        }
    }
}

// =============================================================================
// Body Sizes
// =============================================================================

pub(crate) fn insert_body_len(tuple: &Tuple) -> usize {
    8 + tuple.encoded_size()
}

pub(crate) fn delete_body_len(key: &Tuple) -> usize {
    8 + key.encoded_size()
}

pub(crate) fn update_body_len(key: &Tuple, ops: &UpdateOpList) -> usize {
    8 + key.encoded_size() + ops.encoded_size()
}

pub(crate) fn select_body_len(keys: &TupleList) -> usize {
    20 + keys.encoded_size()
}

pub(crate) fn call_body_len(proc_name: &str, args: &Tuple) -> usize {
    4 + varint::size_of(proc_name.len() as u32) + proc_name.len() + args.encoded_size()
}

// =============================================================================
// Body Encoding
// =============================================================================

pub(crate) fn put_insert_body(buf: &mut BytesMut, space: u32, flags: Flags, tuple: &Tuple) {
    buf.put_u32_le(space);
    buf.put_u32_le(flags.bits());
    tuple.pack_into(buf);
}

pub(crate) fn put_delete_body(buf: &mut BytesMut, space: u32, flags: Flags, key: &Tuple) {
    buf.put_u32_le(space);
    buf.put_u32_le(flags.bits());
    key.pack_into(buf);
}

pub(crate) fn put_update_body(
    buf: &mut BytesMut,
    space: u32,
    flags: Flags,
    key: &Tuple,
    ops: &UpdateOpList,
) -> Result<()> {
    buf.put_u32_le(space);
    buf.put_u32_le(flags.bits());
    key.pack_into(buf);
    ops.pack_into(buf)?;
    Ok(())
}

pub(crate) fn put_select_body(
    buf: &mut BytesMut,
    space: u32,
    index: u32,
    offset: u32,
    limit: u32,
    keys: &TupleList,
) -> Result<()> {
    let key_count = wire_len(keys.len(), "select key count")?;
    buf.put_u32_le(space);
    buf.put_u32_le(index);
    buf.put_u32_le(offset);
    buf.put_u32_le(limit);
    buf.put_u32_le(key_count);
    for key in keys {
        key.pack_into(buf);
    }
    Ok(())
}

pub(crate) fn put_call_body(
    buf: &mut BytesMut,
    flags: Flags,
    proc_name: &str,
    args: &Tuple,
) -> Result<()> {
    let name_len = wire_len(proc_name.len(), "procedure name")?;
    buf.put_u32_le(flags.bits());
    varint::encode(buf, name_len);
    buf.put_slice(proc_name.as_bytes());
    args.pack_into(buf);
    Ok(())
}

// =============================================================================
// Body Decoding
// =============================================================================

fn decode_ping(body: &[u8]) -> Result<RequestBody> {
    if !body.is_empty() {
        return Err(TntError::Malformed(format!(
            "ping request carries {} body bytes",
            body.len()
        )));
    }
    Ok(RequestBody::Ping)
}

fn decode_insert(body: &[u8]) -> Result<RequestBody> {
    let mut cur = body;
    let space = take_u32(&mut cur, "insert space")?;
    let flags = Flags::from_bits(take_u32(&mut cur, "insert flags")?);
    let tuple = Tuple::from_wire(cur)?;
    Ok(RequestBody::Insert(Insert { space, flags, tuple }))
}

fn decode_delete(body: &[u8]) -> Result<RequestBody> {
    let mut cur = body;
    let space = take_u32(&mut cur, "delete space")?;
    let flags = Flags::from_bits(take_u32(&mut cur, "delete flags")?);
    let key = Tuple::from_wire(cur)?;
    Ok(RequestBody::Delete(Delete { space, flags, key }))
}

fn decode_update(body: &[u8]) -> Result<RequestBody> {
    let mut cur = body;
    let space = take_u32(&mut cur, "update space")?;
    let flags = Flags::from_bits(take_u32(&mut cur, "update flags")?);
    let key_len = Tuple::wire_len(cur)?;
    let key = Tuple::from_wire(take_bytes(&mut cur, key_len, "update key")?)?;
    let ops = UpdateOpList::from_wire(cur)?;
    Ok(RequestBody::Update(Update {
        space,
        flags,
        key,
        ops,
    }))
}

fn decode_select(body: &[u8]) -> Result<RequestBody> {
    let mut cur = body;
    let space = take_u32(&mut cur, "select space")?;
    let index = take_u32(&mut cur, "select index")?;
    let offset = take_u32(&mut cur, "select offset")?;
    let limit = take_u32(&mut cur, "select limit")?;
    let key_count = take_u32(&mut cur, "select key count")?;
    // every key needs at least its cardinality word
    if key_count as usize > cur.len() / 4 {
        return Err(TntError::Malformed(format!(
            "select declares {} keys in {} bytes",
            key_count,
            cur.len()
        )));
    }
    let mut keys = TupleList::with_capacity(key_count as usize);
    for _ in 0..key_count {
        let len = Tuple::wire_len(cur)?;
        keys.push(Tuple::from_wire(take_bytes(&mut cur, len, "select key")?)?);
    }
    if !cur.is_empty() {
        return Err(TntError::Malformed(format!(
            "{} trailing bytes after {} select keys",
            cur.len(),
            key_count
        )));
    }
    Ok(RequestBody::Select(Select {
        space,
        index,
        offset,
        limit,
        keys,
    }))
}

fn decode_call(body: &[u8]) -> Result<RequestBody> {
    let mut cur = body;
    let flags = Flags::from_bits(take_u32(&mut cur, "call flags")?);
    let (name_len, prefix) = varint::decode_bounded(cur, "call procedure name")?;
    cur = &cur[prefix..];
    let name = take_bytes(&mut cur, name_len as usize, "call procedure name")?;
    let proc_name = std::str::from_utf8(name)
        .map_err(|e| TntError::Malformed(format!("call procedure name is not UTF-8: {}", e)))?
        .to_string();
    let args = Tuple::from_wire(cur)?;
    Ok(RequestBody::Call(Call {
        flags,
        proc_name,
        args,
    }))
}
