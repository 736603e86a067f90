//! Field cursor
//!
//! Walks the fields of an encoded tuple by skipping each field's size
//! prefix and data. Nothing is indexed up front.

use crate::error::TntError;
use crate::protocol::varint;

use super::{Cursor, IterStatus};

const CARDINALITY_SIZE: usize = 4;

/// Cursor over the fields of one encoded tuple
#[derive(Debug)]
pub struct FieldIter<'a> {
    data: &'a [u8],
    /// Offset of the next field's size prefix
    pos: usize,
    /// Index of `current`
    index: Option<u32>,
    current: Option<&'a [u8]>,
    status: IterStatus,
    error: Option<TntError>,
}

impl<'a> FieldIter<'a> {
    /// Cursor over a tuple encoding: cardinality, then the fields
    pub fn over_wire(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: CARDINALITY_SIZE,
            index: None,
            current: None,
            status: IterStatus::Ok,
            error: None,
        }
    }

    /// Field under the cursor
    pub fn current(&self) -> Option<&'a [u8]> {
        self.current
    }

    /// Index of the field under the cursor
    pub fn index(&self) -> Option<u32> {
        self.index
    }

    /// Declared field count, if the encoding has a cardinality header
    pub fn cardinality(&self) -> Option<u32> {
        let bytes: [u8; 4] = self.data.get(..CARDINALITY_SIZE)?.try_into().ok()?;
        Some(u32::from_le_bytes(bytes))
    }

    /// True while declared fields remain after the current one
    pub fn has_next(&self) -> bool {
        let next = self.index.map_or(0, |i| i + 1);
        self.status == IterStatus::Ok && self.cardinality().is_some_and(|c| next < c)
    }

    /// Why the cursor failed
    pub fn error(&self) -> Option<&TntError> {
        self.error.as_ref()
    }

    fn fail(&mut self, error: TntError) -> bool {
        tracing::trace!("Field cursor failed: {}", error);
        self.current = None;
        self.status = IterStatus::Fail;
        self.error = Some(error);
        false
    }
}

impl<'a> Cursor for FieldIter<'a> {
    fn advance(&mut self) -> bool {
        if self.status == IterStatus::Fail {
            return false;
        }
        let Some(cardinality) = self.cardinality() else {
            return self.fail(TntError::Malformed(format!(
                "tuple of {} bytes has no cardinality header",
                self.data.len()
            )));
        };
        let next = self.index.map_or(0, |i| i + 1);
        if next >= cardinality {
            self.current = None;
            if self.pos != self.data.len() {
                return self.fail(TntError::Malformed(format!(
                    "{} bytes follow the last of {} fields",
                    self.data.len() - self.pos,
                    cardinality
                )));
            }
            return false;
        }

        let rest = &self.data[self.pos..];
        let (size, prefix) = match varint::decode_bounded(rest, "tuple field") {
            Ok(v) => v,
            Err(e) => return self.fail(e),
        };
        let available = rest.len() - prefix;
        if size as usize > available {
            return self.fail(TntError::Malformed(format!(
                "field {} declares {} bytes, only {} left",
                next, size, available
            )));
        }
        let start = self.pos + prefix;
        let end = start + size as usize;
        self.current = Some(&self.data[start..end]);
        self.index = Some(next);
        self.pos = end;
        true
    }

    fn rewind(&mut self) -> bool {
        self.pos = CARDINALITY_SIZE;
        self.index = None;
        self.current = None;
        self.status = IterStatus::Ok;
        self.error = None;
        true
    }

    fn status(&self) -> IterStatus {
        self.status
    }
}

impl<'a> Iterator for FieldIter<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if self.advance() {
            self.current
        } else {
            None
        }
    }
}
