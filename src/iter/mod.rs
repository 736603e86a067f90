//! Iterator Module
//!
//! One cursor abstraction over four kinds of sequence:
//!
//! ```text
//!   Field    fields of one tuple           rewindable
//!   Tuple    tuples of one TupleList       rewindable
//!   Reply    replies pulled from a source  forward only
//!   Request  requests pulled from a source forward only
//! ```
//!
//! `advance` returns false both at the clean end of data and when an error
//! stops iteration early. The two are told apart by `status`.
//!
//! Every variant also implements `std::iter::Iterator`, so plain `for` loops
//! work when the caller does not need the status distinction.

mod field;
mod list;
mod stream;

pub use field::FieldIter;
pub use list::TupleIter;
pub use stream::{FrameStream, ReplyStream, RequestStream};

pub(crate) use stream::read_frame;

use crate::protocol::{Reply, Request};
use crate::tuple::Tuple;

/// Whether a cursor stopped cleanly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IterStatus {
    #[default]
    Ok,
    Fail,
}

/// A position in a sequence that moves forward one element at a time
pub trait Cursor {
    /// Move to the next element; false when there is none
    fn advance(&mut self) -> bool;

    /// Return to the position before the first element
    ///
    /// Returns false if the sequence cannot be rewound.
    fn rewind(&mut self) -> bool;

    fn status(&self) -> IterStatus;

    fn failed(&self) -> bool {
        self.status() == IterStatus::Fail
    }
}

/// Cursor of any kind
pub enum Iter<'a, S> {
    Field(FieldIter<'a>),
    Tuple(TupleIter<'a>),
    Reply(ReplyStream<S>),
    Request(RequestStream<S>),
}

impl<'a, S> Iter<'a, S> {
    /// Current field, for a field cursor
    pub fn field(&self) -> Option<&'a [u8]> {
        match self {
            Iter::Field(it) => it.current(),
            _ => None,
        }
    }

    /// Current tuple, for a tuple cursor
    pub fn tuple(&self) -> Option<&'a Tuple> {
        match self {
            Iter::Tuple(it) => it.current(),
            _ => None,
        }
    }

    /// Current reply, for a reply stream
    pub fn reply(&self) -> Option<&Reply> {
        match self {
            Iter::Reply(it) => it.current(),
            _ => None,
        }
    }

    /// Current request, for a request stream
    pub fn request(&self) -> Option<&Request> {
        match self {
            Iter::Request(it) => it.current(),
            _ => None,
        }
    }
}

impl<'a, S: crate::network::ByteSource> Cursor for Iter<'a, S> {
    fn advance(&mut self) -> bool {
        match self {
            Iter::Field(it) => it.advance(),
            Iter::Tuple(it) => it.advance(),
            Iter::Reply(it) => it.advance(),
            Iter::Request(it) => it.advance(),
        }
    }

    fn rewind(&mut self) -> bool {
        match self {
            Iter::Field(it) => it.rewind(),
            Iter::Tuple(it) => it.rewind(),
            Iter::Reply(it) => it.rewind(),
            Iter::Request(it) => it.rewind(),
        }
    }

    fn status(&self) -> IterStatus {
        match self {
            Iter::Field(it) => it.status(),
            Iter::Tuple(it) => it.status(),
            Iter::Reply(it) => it.status(),
            Iter::Request(it) => it.status(),
        }
    }
}

impl<'a, S> From<FieldIter<'a>> for Iter<'a, S> {
    fn from(it: FieldIter<'a>) -> Self {
        Iter::Field(it)
    }
}

impl<'a, S> From<TupleIter<'a>> for Iter<'a, S> {
    fn from(it: TupleIter<'a>) -> Self {
        Iter::Tuple(it)
    }
}

impl<'a, S> From<ReplyStream<S>> for Iter<'a, S> {
    fn from(it: ReplyStream<S>) -> Self {
        Iter::Reply(it)
    }
}

impl<'a, S> From<RequestStream<S>> for Iter<'a, S> {
    fn from(it: RequestStream<S>) -> Self {
        Iter::Request(it)
    }
}
