//! Reply definitions
//!
//! Server replies and their body encodings.
//!
//! ### Reply Body
//! ```text
//! PING:     empty
//! error:    code (4) + message bytes (NUL-terminated)
//! quiet:    code (4)
//! success:  code (4) + row_count (4) [ + row * row_count ]
//! row:      field_bytes (4) + cardinality (4) + fields
//! ```
//!
//! `field_bytes` counts the row's fields only, not its cardinality word,
//! so a row occupies `8 + field_bytes` bytes.
//!
//! ### Code Word
//! The low byte is the completion status (0 ok, 1 try again, 2 error); the
//! upper 24 bits are the server error code.

use bytes::{BufMut, BytesMut};

use super::header::OpType;
use super::wire::{take_u32, wire_len};
use crate::error::{Result, TntError};
use crate::tuple::{Tuple, TupleList};

/// Completion status: request executed
pub const STATUS_OK: u32 = 0;
/// Completion status: transient failure, the request may be retried
pub const STATUS_TRY_AGAIN: u32 = 1;
/// Completion status: permanent failure
pub const STATUS_ERROR: u32 = 2;

/// A server reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub op_type: OpType,
    pub request_id: u32,
    /// Raw code word, 0 on success
    pub code: u32,
    /// Present iff `code != 0`
    pub error: Option<String>,
    /// Absent for ping, errors and quiet replies
    pub row_count: Option<u32>,
    pub rows: TupleList,
}

impl Reply {
    pub fn ping(request_id: u32) -> Self {
        Self {
            op_type: OpType::Ping,
            request_id,
            code: 0,
            error: None,
            row_count: None,
            rows: TupleList::new(),
        }
    }

    /// Success carrying tuples; `row_count` is the number of rows
    ///
    /// A list longer than `u32::MAX` saturates the count, which
    /// `encode_reply` then rejects as a row-count mismatch.
    pub fn ok(op_type: OpType, request_id: u32, rows: TupleList) -> Self {
        let row_count = u32::try_from(rows.len()).unwrap_or(u32::MAX);
        Self {
            op_type,
            request_id,
            code: 0,
            error: None,
            row_count: Some(row_count),
            rows,
        }
    }

    /// Success carrying only an affected-row count
    pub fn affected(op_type: OpType, request_id: u32, count: u32) -> Self {
        Self {
            op_type,
            request_id,
            code: 0,
            error: None,
            row_count: Some(count),
            rows: TupleList::new(),
        }
    }

    /// Success with the payload suppressed
    pub fn quiet(op_type: OpType, request_id: u32) -> Self {
        Self {
            op_type,
            request_id,
            code: 0,
            error: None,
            row_count: None,
            rows: TupleList::new(),
        }
    }

    /// Failure with a non-zero code and a message
    pub fn error(op_type: OpType, request_id: u32, code: u32, message: impl Into<String>) -> Self {
        Self {
            op_type,
            request_id,
            code,
            error: Some(message.into()),
            row_count: None,
            rows: TupleList::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code == 0
    }

    /// Low byte of the code word
    pub fn completion_status(&self) -> u32 {
        self.code & 0xff
    }

    /// Server error code (upper 24 bits of the code word)
    pub fn error_code(&self) -> u32 {
        self.code >> 8
    }

    /// The server asked for the request to be retried
    pub fn is_transient(&self) -> bool {
        self.completion_status() == STATUS_TRY_AGAIN
    }

    /// Rows, in server order
    pub fn tuples(&self) -> &TupleList {
        &self.rows
    }

    pub(crate) fn encoded_size(&self) -> usize {
        if self.op_type == OpType::Ping {
            return 0;
        }
        if self.code != 0 {
            let message = self.error.as_deref().unwrap_or("");
            return 4 + message.len() + 1;
        }
        match self.row_count {
            None => 4,
            Some(_) => 8 + self.rows.iter().map(|t| 4 + t.encoded_size()).sum::<usize>(),
        }
    }

    pub(crate) fn encode_body(&self, buf: &mut BytesMut) -> Result<()> {
        if self.op_type == OpType::Ping {
            return Ok(());
        }
        buf.put_u32_le(self.code);
        if self.code != 0 {
            buf.put_slice(self.error.as_deref().unwrap_or("").as_bytes());
            buf.put_u8(0);
            return Ok(());
        }
        let Some(row_count) = self.row_count else {
            return Ok(());
        };
        if !self.rows.is_empty() && self.rows.len() != row_count as usize {
            return Err(TntError::BadValue(format!(
                "reply declares {} rows but carries {}",
                row_count,
                self.rows.len()
            )));
        }
        buf.put_u32_le(row_count);
        for row in &self.rows {
            let field_bytes = wire_len(row.encoded_size() - 4, "reply row")?;
            buf.put_u32_le(field_bytes);
            row.pack_into(buf);
        }
        Ok(())
    }

    /// Decode the body of a reply whose header has already been read
    ///
    /// Rows are collected into a local list that is only attached once every
    /// row decoded, so a failure part-way exposes nothing.
    pub(crate) fn decode(op_type: OpType, request_id: u32, body: &[u8]) -> Result<Self> {
        if op_type == OpType::Ping {
            if !body.is_empty() {
                return Err(TntError::Malformed(format!(
                    "ping reply carries {} body bytes",
                    body.len()
                )));
            }
            return Ok(Reply::ping(request_id));
        }

        let mut cur = body;
        let code = take_u32(&mut cur, "reply code")?;
        if code != 0 {
            let text = match cur.iter().rposition(|&b| b != 0) {
                Some(last) => &cur[..=last],
                None => &cur[..0],
            };
            let message = String::from_utf8_lossy(text).into_owned();
            return Ok(Reply::error(op_type, request_id, code, message));
        }
        if cur.is_empty() {
            return Ok(Reply::quiet(op_type, request_id));
        }

        let row_count = take_u32(&mut cur, "reply row count")?;
        if cur.is_empty() {
            return Ok(Reply::affected(op_type, request_id, row_count));
        }

        let rows = decode_rows(cur, row_count)?;
        Ok(Reply {
            op_type,
            request_id,
            code,
            error: None,
            row_count: Some(row_count),
            rows,
        })
    }
}

fn decode_rows(mut cur: &[u8], row_count: u32) -> Result<TupleList> {
    // every row needs at least its two 4-byte words
    let mut rows = TupleList::with_capacity((row_count as usize).min(cur.len() / 8));
    for row in 0..row_count {
        if cur.len() < 4 {
            return Err(TntError::TruncatedRow {
                row,
                declared: 4,
                available: cur.len(),
            });
        }
        let mut prefix = cur;
        let field_bytes = take_u32(&mut prefix, "reply row length")? as usize;
        let tuple_len = 4 + field_bytes;
        if prefix.len() < tuple_len {
            return Err(TntError::TruncatedRow {
                row,
                declared: tuple_len,
                available: prefix.len(),
            });
        }
        rows.push(Tuple::from_wire(&prefix[..tuple_len])?);
        cur = &prefix[tuple_len..];
    }
    if !cur.is_empty() {
        return Err(TntError::Malformed(format!(
            "{} trailing bytes after {} reply rows",
            cur.len(),
            row_count
        )));
    }
    Ok(rows)
}
