//! TupleList implementation
//!
//! Insertion-ordered tuples: select key batches and multi-row replies.

use crate::iter::TupleIter;

use super::Tuple;

/// Ordered sequence of owned tuples
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TupleList {
    tuples: Vec<Tuple>,
}

impl TupleList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tuples: Vec::with_capacity(capacity),
        }
    }

    /// Append a new empty tuple and return it for the caller to fill
    pub fn add(&mut self) -> &mut Tuple {
        let index = self.tuples.len();
        self.tuples.push(Tuple::new());
        &mut self.tuples[index]
    }

    pub fn push(&mut self, tuple: Tuple) {
        self.tuples.push(tuple);
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Tuple> {
        self.tuples.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tuple> {
        self.tuples.iter()
    }

    /// Rewindable cursor over the tuples
    pub fn cursor(&self) -> TupleIter<'_> {
        TupleIter::new(self)
    }

    pub fn as_slice(&self) -> &[Tuple] {
        &self.tuples
    }

    /// Sum of the tuples' wire sizes
    pub fn encoded_size(&self) -> usize {
        self.tuples.iter().map(Tuple::encoded_size).sum()
    }

    pub fn clear(&mut self) {
        self.tuples.clear();
    }

    pub fn into_vec(self) -> Vec<Tuple> {
        self.tuples
    }
}

impl From<Vec<Tuple>> for TupleList {
    fn from(tuples: Vec<Tuple>) -> Self {
        Self { tuples }
    }
}

impl FromIterator<Tuple> for TupleList {
    fn from_iter<I: IntoIterator<Item = Tuple>>(iter: I) -> Self {
        Self {
            tuples: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for TupleList {
    type Item = Tuple;
    type IntoIter = std::vec::IntoIter<Tuple>;

    fn into_iter(self) -> Self::IntoIter {
        self.tuples.into_iter()
    }
}

impl<'a> IntoIterator for &'a TupleList {
    type Item = &'a Tuple;
    type IntoIter = std::slice::Iter<'a, Tuple>;

    fn into_iter(self) -> Self::IntoIter {
        self.tuples.iter()
    }
}
