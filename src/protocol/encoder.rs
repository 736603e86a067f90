//! Request encoder
//!
//! Builds request frames back-to-back in one growable buffer. Each call
//! computes the body length from the parts it is given, writes the header
//! and body, and assigns the next request id. Nothing here touches the
//! network; callers hand `buffer()` or `take()` to a channel.

use bytes::{Bytes, BytesMut};

use super::codec::write_frame;
use super::header::{Flags, OpType};
use super::request::{self, Request};
use super::update::UpdateOpList;
use crate::error::Result;
use crate::tuple::{Tuple, TupleList};

/// Accumulates encoded requests
#[derive(Debug, Default)]
pub struct RequestEncoder {
    buf: BytesMut,
    next_id: u32,
    count: usize,
}

impl RequestEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            next_id: 0,
            count: 0,
        }
    }

    /// Id the next request will carry
    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    pub fn set_next_id(&mut self, id: u32) {
        self.next_id = id;
    }

    pub fn ping(&mut self) -> Result<u32> {
        self.frame(OpType::Ping, 0, |_| Ok(()))
    }

    pub fn insert(&mut self, space: u32, flags: Flags, tuple: &Tuple) -> Result<u32> {
        self.frame(OpType::Insert, request::insert_body_len(tuple), |b| {
            request::put_insert_body(b, space, flags, tuple);
            Ok(())
        })
    }

    pub fn delete(&mut self, space: u32, flags: Flags, key: &Tuple) -> Result<u32> {
        self.frame(OpType::Delete, request::delete_body_len(key), |b| {
            request::put_delete_body(b, space, flags, key);
            Ok(())
        })
    }

    pub fn update(
        &mut self,
        space: u32,
        flags: Flags,
        key: &Tuple,
        ops: &UpdateOpList,
    ) -> Result<u32> {
        self.frame(OpType::Update, request::update_body_len(key, ops), |b| {
            request::put_update_body(b, space, flags, key, ops)
        })
    }

    /// Select rows matching any of `keys`
    pub fn select(
        &mut self,
        space: u32,
        index: u32,
        offset: u32,
        limit: u32,
        keys: &TupleList,
    ) -> Result<u32> {
        self.frame(OpType::Select, request::select_body_len(keys), |b| {
            request::put_select_body(b, space, index, offset, limit, keys)
        })
    }

    pub fn call(&mut self, flags: Flags, proc_name: &str, args: &Tuple) -> Result<u32> {
        self.frame(OpType::Call, request::call_body_len(proc_name, args), |b| {
            request::put_call_body(b, flags, proc_name, args)
        })
    }

    /// Encode a prepared request, replacing its id with the next one
    pub fn encode(&mut self, request: &Request) -> Result<u32> {
        self.frame(request.op_type(), request.body_len(), |b| {
            request.body.encode(b)
        })
    }

    fn frame(
        &mut self,
        op_type: OpType,
        body_len: usize,
        put_body: impl FnOnce(&mut BytesMut) -> Result<()>,
    ) -> Result<u32> {
        let id = self.next_id;
        write_frame(&mut self.buf, op_type, id, body_len, put_body)?;
        self.commit(id, op_type);
        Ok(id)
    }

    fn commit(&mut self, id: u32, op_type: OpType) {
        tracing::trace!("Encoded {} request (id {})", op_type, id);
        self.next_id = id.wrapping_add(1);
        self.count += 1;
    }

    /// Encoded frames not yet taken
    pub fn buffer(&self) -> &[u8] {
        &self.buf
    }

    /// Hand over the encoded frames and start a fresh buffer
    pub fn take(&mut self) -> Bytes {
        self.count = 0;
        self.buf.split().freeze()
    }

    /// Number of frames in the buffer
    pub fn count(&self) -> usize {
        self.count
    }

    /// Bytes in the buffer
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.count = 0;
    }
}
