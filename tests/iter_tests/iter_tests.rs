//! Cursor Tests
//!
//! Tests for field and tuple cursors and the polymorphic `Iter`.

use std::io::Cursor as IoCursor;

use bytes::BytesMut;
use tntproto::iter::{Cursor, FieldIter, Iter, IterStatus, ReplyStream};
use tntproto::protocol::{encode_reply, OpType, Reply};
use tntproto::{Tuple, TupleList};

// =============================================================================
// Field Cursor Tests
// =============================================================================

#[test]
fn test_field_cursor_walks_and_rewinds() {
    let tuple = Tuple::from_fields(["a", "bb", "ccc"]);
    let mut it = tuple.fields();

    let mut seen = Vec::new();
    while it.advance() {
        seen.push((it.index().unwrap(), it.current().unwrap().to_vec()));
    }
    assert_eq!(it.status(), IterStatus::Ok);
    assert_eq!(
        seen,
        vec![(0, b"a".to_vec()), (1, b"bb".to_vec()), (2, b"ccc".to_vec())]
    );

    assert!(it.rewind());
    assert!(it.advance());
    assert_eq!(it.current(), Some(&b"a"[..]));
}

#[test]
fn test_field_cursor_empty_tuple() {
    let tuple = Tuple::new();
    let mut it = tuple.fields();
    assert!(!it.has_next());
    assert!(!it.advance());
    assert_eq!(it.status(), IterStatus::Ok);
}

#[test]
fn test_field_cursor_has_next() {
    let tuple = Tuple::from_fields(["a", "b"]);
    let mut it = tuple.fields();
    assert!(it.has_next());
    it.advance();
    assert!(it.has_next());
    it.advance();
    assert!(!it.has_next());
}

#[test]
fn test_field_cursor_overrun_fails() {
    // second field declares 9 bytes, 1 remains
    let wire = [2, 0, 0, 0, 1, b'a', 9, b'b'];
    let mut it = FieldIter::over_wire(&wire);
    assert!(it.advance());
    assert!(!it.advance());
    assert_eq!(it.status(), IterStatus::Fail);
    assert!(it.current().is_none());
    assert!(it.error().is_some());
    // stays failed
    assert!(!it.advance());
}

#[test]
fn test_field_cursor_missing_header() {
    let mut it = FieldIter::over_wire(&[1, 0]);
    assert!(!it.advance());
    assert!(it.failed());
}

#[test]
fn test_field_cursor_zero_length_field() {
    // cardinality 2: "ab", ""
    let wire = [2, 0, 0, 0, 2, b'a', b'b', 0];
    let mut it = FieldIter::over_wire(&wire);
    assert!(it.advance());
    assert_eq!(it.current(), Some(&b"ab"[..]));
    assert!(it.advance());
    assert_eq!(it.current(), Some(&b""[..]));
    assert_eq!(it.index(), Some(1));
    assert!(!it.advance());
    assert_eq!(it.status(), IterStatus::Ok);
}

#[test]
fn test_field_cursor_trailing_bytes_fail_until_rewind() {
    // one field "z", then a stray byte
    let wire = [1, 0, 0, 0, 1, b'z', 9];
    let mut it = FieldIter::over_wire(&wire);
    assert!(it.advance());
    assert!(!it.advance());
    assert!(it.failed());

    assert!(it.rewind());
    assert_eq!(it.status(), IterStatus::Ok);
    assert!(it.error().is_none());
    assert!(it.advance());
    assert_eq!(it.current(), Some(&b"z"[..]));
}

#[test]
fn test_field_cursor_as_iterator() {
    let tuple = Tuple::from_fields(["x", "y"]);
    let joined: Vec<u8> = tuple.fields().flatten().copied().collect();
    assert_eq!(joined, b"xy");
}

// =============================================================================
// Tuple Cursor Tests
// =============================================================================

#[test]
fn test_tuple_cursor_rewind() {
    let list: TupleList = vec![Tuple::from_fields(["1"]), Tuple::from_fields(["2"])].into();
    let mut it = list.cursor();

    assert!(it.advance());
    assert_eq!(it.index(), Some(0));
    assert!(it.advance());
    assert_eq!(it.current().unwrap().get(0), Some(&b"2"[..]));
    assert!(!it.advance());
    assert!(it.current().is_none());

    assert!(it.rewind());
    assert!(it.advance());
    assert_eq!(it.current().unwrap().get(0), Some(&b"1"[..]));
    assert_eq!(it.status(), IterStatus::Ok);
}

#[test]
fn test_tuple_cursor_size_hint() {
    let list: TupleList = vec![Tuple::new(), Tuple::new(), Tuple::new()].into();
    let mut it = list.cursor();
    assert_eq!(it.size_hint(), (3, Some(3)));
    it.next();
    assert_eq!(it.len(), 2);
}

// =============================================================================
// Polymorphic Iter Tests
// =============================================================================

type Source = IoCursor<Vec<u8>>;

#[test]
fn test_iter_dispatch_field_and_tuple() {
    let tuple = Tuple::from_fields(["f"]);
    let mut field: Iter<'_, Source> = Iter::from(tuple.fields());
    assert!(field.advance());
    assert_eq!(field.field(), Some(&b"f"[..]));
    assert!(field.tuple().is_none());
    assert!(field.rewind());

    let list: TupleList = vec![tuple.clone()].into();
    let mut tuples: Iter<'_, Source> = Iter::from(list.cursor());
    assert!(tuples.advance());
    assert_eq!(tuples.tuple(), Some(&tuple));
    assert!(!tuples.advance());
    assert_eq!(tuples.status(), IterStatus::Ok);
}

#[test]
fn test_iter_dispatch_reply_stream() {
    let mut bytes = BytesMut::new();
    encode_reply(&Reply::ping(1), &mut bytes).unwrap();
    encode_reply(&Reply::quiet(OpType::Insert, 2), &mut bytes).unwrap();

    let stream = ReplyStream::new(IoCursor::new(bytes.to_vec()));
    let mut it: Iter<'_, Source> = Iter::from(stream);
    assert!(!it.rewind());

    let mut ids = Vec::new();
    while it.advance() {
        ids.push(it.reply().unwrap().request_id);
    }
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(it.status(), IterStatus::Ok);
    assert!(it.request().is_none());
}
