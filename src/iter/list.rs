//! Tuple cursor over a TupleList

use crate::tuple::{Tuple, TupleList};

use super::{Cursor, IterStatus};

/// Rewindable cursor over the tuples of a list
#[derive(Debug, Clone)]
pub struct TupleIter<'a> {
    list: &'a TupleList,
    next: usize,
    current: Option<&'a Tuple>,
}

impl<'a> TupleIter<'a> {
    pub fn new(list: &'a TupleList) -> Self {
        Self {
            list,
            next: 0,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&'a Tuple> {
        self.current
    }

    /// Index of the tuple under the cursor
    pub fn index(&self) -> Option<usize> {
        self.current.map(|_| self.next - 1)
    }
}

impl<'a> Cursor for TupleIter<'a> {
    fn advance(&mut self) -> bool {
        self.current = self.list.get(self.next);
        if self.current.is_some() {
            self.next += 1;
        }
        self.current.is_some()
    }

    fn rewind(&mut self) -> bool {
        self.next = 0;
        self.current = None;
        true
    }

    fn status(&self) -> IterStatus {
        IterStatus::Ok
    }
}

impl<'a> Iterator for TupleIter<'a> {
    type Item = &'a Tuple;

    fn next(&mut self) -> Option<Self::Item> {
        if self.advance() {
            self.current
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.list.len().saturating_sub(self.next);
        (left, Some(left))
    }
}

impl ExactSizeIterator for TupleIter<'_> {}
