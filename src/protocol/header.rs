//! Frame header, operation codes and request flags
//!
//! Every request and reply starts with the same 12-byte header:
//!
//! ```text
//! ┌────────────┬────────────┬────────────────┐
//! │ op_type(4) │ body_len(4)│ request_id(4)  │   all u32 little-endian
//! └────────────┴────────────┴────────────────┘
//! ```
//!
//! `body_len` counts every byte after the header. Replies reuse the header
//! and carry their status code as the first body word.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use bytes::BufMut;

use super::wire::Decoded;
use crate::error::{Result, TntError};

/// Header size: op_type (4) + body_len (4) + request_id (4)
pub const HEADER_SIZE: usize = 12;

/// Operation codes (fixed protocol constants)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum OpType {
    Insert = 13,
    Select = 17,
    Update = 19,
    Delete = 21,
    Call = 22,
    Ping = 65280,
}

impl OpType {
    /// Try to convert a wire code to an operation
    pub fn from_u32(code: u32) -> Option<Self> {
        match code {
            13 => Some(OpType::Insert),
            17 => Some(OpType::Select),
            19 => Some(OpType::Update),
            21 => Some(OpType::Delete),
            22 => Some(OpType::Call),
            65280 => Some(OpType::Ping),
            _ => None,
        }
    }

    pub fn as_u32(self) -> u32 {
        self as u32
    }

    pub fn name(self) -> &'static str {
        match self {
            OpType::Insert => "insert",
            OpType::Select => "select",
            OpType::Update => "update",
            OpType::Delete => "delete",
            OpType::Call => "call",
            OpType::Ping => "ping",
        }
    }
}

impl fmt::Display for OpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fixed frame prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub op_type: OpType,
    pub body_len: u32,
    pub request_id: u32,
}

impl Header {
    pub fn new(op_type: OpType, body_len: u32, request_id: u32) -> Self {
        Self {
            op_type,
            body_len,
            request_id,
        }
    }

    /// Total frame size: header plus body
    pub fn frame_len(&self) -> usize {
        HEADER_SIZE + self.body_len as usize
    }

    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u32_le(self.op_type.as_u32());
        buf.put_u32_le(self.body_len);
        buf.put_u32_le(self.request_id);
    }

    /// Parse the header at the front of `buf`
    ///
    /// An unknown operation code is malformed: nothing after the header can
    /// be interpreted without it.
    pub fn decode(buf: &[u8]) -> Result<Decoded<Header>> {
        if buf.len() < HEADER_SIZE {
            return Ok(Decoded::NeedBytes(HEADER_SIZE - buf.len()));
        }
        let word = |i: usize| u32::from_le_bytes([buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]);
        let code = word(0);
        let op_type = OpType::from_u32(code)
            .ok_or_else(|| TntError::malformed(format!("unknown op type {}", code)))?;
        Ok(Decoded::Complete {
            value: Header {
                op_type,
                body_len: word(4),
                request_id: word(8),
            },
            consumed: HEADER_SIZE,
        })
    }
}

/// Request flags word carried by insert, delete, update and call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Flags(u32);

impl Flags {
    pub const NONE: Flags = Flags(0);
    /// Return the affected tuple in the reply
    pub const RETURN_TUPLE: Flags = Flags(1);
    /// Insert only if the key does not exist
    pub const ADD: Flags = Flags(2);
    /// Insert only if the key already exists
    pub const REPLACE: Flags = Flags(4);
    /// Suppress the reply payload
    pub const QUIET: Flags = Flags(8);

    pub const fn from_bits(bits: u32) -> Self {
        Flags(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

impl BitOrAssign for Flags {
    fn bitor_assign(&mut self, rhs: Flags) {
        self.0 |= rhs.0;
    }
}

impl From<u32> for Flags {
    fn from(bits: u32) -> Self {
        Flags(bits)
    }
}
