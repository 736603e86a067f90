//! Update Operation Tests
//!
//! Tests for building, packing and decoding update op lists.

use bytes::Bytes;
use tntproto::protocol::{UpdateOp, UpdateOpKind, UpdateOpList};
use tntproto::TntError;

// =============================================================================
// Construction Tests
// =============================================================================

#[test]
fn test_empty_list_packs_count_only() {
    let ops = UpdateOpList::new();
    assert_eq!(ops.encoded_size(), 4);
    assert_eq!(&ops.pack().unwrap()[..], &[0, 0, 0, 0]);
}

#[test]
fn test_assign_layout() {
    let mut ops = UpdateOpList::new();
    ops.add_assign(2, b"abc").unwrap();

    let packed = ops.pack().unwrap();
    assert_eq!(
        &packed[..],
        &[1, 0, 0, 0, 2, 0, 0, 0, 0, 3, b'a', b'b', b'c']
    );
    assert_eq!(packed.len(), ops.encoded_size());
}

#[test]
fn test_arith_widths() {
    let mut ops = UpdateOpList::new();
    ops.add_arith(1, UpdateOpKind::Add, 5u32).unwrap();
    ops.add_arith(1, UpdateOpKind::Xor, 5u64).unwrap();

    assert_eq!(ops.get(0).unwrap().arg.len(), 4);
    assert_eq!(ops.get(1).unwrap().arg.len(), 8);
    assert_eq!(ops.get(0).unwrap().arith_value(), Some(5));
    assert_eq!(ops.get(1).unwrap().arith_value(), Some(5));
}

#[test]
fn test_arith_rejects_non_arith_kind() {
    let mut ops = UpdateOpList::new();
    let err = ops.add_arith(1, UpdateOpKind::Splice, 5u32).unwrap_err();
    assert!(matches!(err, TntError::BadValue(_)));
    assert!(ops.is_empty());
    assert_eq!(ops.encoded_size(), 4);
}

#[test]
fn test_splice_layout() {
    let mut ops = UpdateOpList::new();
    ops.add_splice(1, 2, 3, b"xy").unwrap();

    let op = ops.get(0).unwrap();
    assert_eq!(op.kind, UpdateOpKind::Splice);
    assert_eq!(
        &op.arg[..],
        &[4, 2, 0, 0, 0, 4, 3, 0, 0, 0, 2, b'x', b'y']
    );
    assert_eq!(ops.encoded_size(), 4 + 4 + 1 + 1 + 13);
}

#[test]
fn test_delete_has_empty_argument() {
    let mut ops = UpdateOpList::new();
    ops.add_delete(3).unwrap();
    let packed = ops.pack().unwrap();
    assert_eq!(&packed[..], &[1, 0, 0, 0, 3, 0, 0, 0, 6, 0]);
}

#[test]
fn test_chained_adds_keep_order() {
    let mut ops = UpdateOpList::new();
    ops.add_assign(0, b"a")
        .unwrap()
        .add_insert(1, b"b")
        .unwrap()
        .add_delete(2)
        .unwrap();

    let kinds: Vec<_> = ops.iter().map(|op| op.kind).collect();
    assert_eq!(
        kinds,
        vec![UpdateOpKind::Set, UpdateOpKind::Insert, UpdateOpKind::Delete]
    );
}

#[test]
fn test_op_new_validates_shape() {
    assert!(matches!(
        UpdateOp::new(0, UpdateOpKind::Add, Bytes::from_static(b"abc")),
        Err(TntError::BadValue(_))
    ));
    assert!(matches!(
        UpdateOp::new(0, UpdateOpKind::Delete, Bytes::from_static(b"x")),
        Err(TntError::BadValue(_))
    ));
    assert!(matches!(
        UpdateOp::new(0, UpdateOpKind::Splice, Bytes::from_static(b"\x01\x00")),
        Err(TntError::BadValue(_))
    ));
    assert!(UpdateOp::new(0, UpdateOpKind::Set, Bytes::new()).is_ok());
}

#[test]
fn test_push_validates_hand_built_ops() {
    let mut ops = UpdateOpList::new();

    let short_add = UpdateOp {
        field_no: 0,
        kind: UpdateOpKind::Add,
        arg: Bytes::from_static(b"abc"),
    };
    assert!(matches!(ops.push(short_add), Err(TntError::BadValue(_))));

    let delete_with_arg = UpdateOp {
        field_no: 1,
        kind: UpdateOpKind::Delete,
        arg: Bytes::from_static(b"x"),
    };
    assert!(matches!(ops.push(delete_with_arg), Err(TntError::BadValue(_))));

    // Rejected ops leave the list and its size untouched
    assert!(ops.is_empty());
    assert_eq!(ops.encoded_size(), 4);

    let add = UpdateOp {
        field_no: 2,
        kind: UpdateOpKind::Add,
        arg: Bytes::from_static(&[1, 0, 0, 0]),
    };
    ops.push(add).unwrap();
    assert_eq!(ops.len(), 1);
    assert_eq!(UpdateOpList::from_wire(&ops.pack().unwrap()).unwrap(), ops);
}

// =============================================================================
// Decoding Tests
// =============================================================================

#[test]
fn test_from_wire_recovers_ops() {
    let mut ops = UpdateOpList::new();
    ops.add_assign(0, b"value")
        .unwrap()
        .add_arith(1, UpdateOpKind::Or, 0x0fu32)
        .unwrap()
        .add_splice(2, 0, 1, b"zz")
        .unwrap();

    let decoded = UpdateOpList::from_wire(&ops.pack().unwrap()).unwrap();
    assert_eq!(decoded, ops);

    let splice = decoded.get(2).unwrap().splice().unwrap();
    assert_eq!(splice.offset, 0);
    assert_eq!(splice.length, 1);
    assert_eq!(&splice.replacement[..], b"zz");
}

#[test]
fn test_from_wire_unknown_code() {
    let wire = [1, 0, 0, 0, 0, 0, 0, 0, 9, 0];
    assert!(matches!(
        UpdateOpList::from_wire(&wire),
        Err(TntError::Malformed(_))
    ));
}

#[test]
fn test_from_wire_truncated_argument() {
    let wire = [1, 0, 0, 0, 0, 0, 0, 0, 0, 5, b'a'];
    assert!(matches!(
        UpdateOpList::from_wire(&wire),
        Err(TntError::Malformed(_))
    ));
}

#[test]
fn test_from_wire_bad_argument_shape_is_malformed() {
    // one ADD on field 0 with a 3-byte argument
    let wire = [1, 0, 0, 0, 0, 0, 0, 0, 1, 3, b'a', b'b', b'c'];
    assert!(matches!(
        UpdateOpList::from_wire(&wire),
        Err(TntError::Malformed(_))
    ));
}

#[test]
fn test_from_wire_trailing_bytes() {
    let wire = [0, 0, 0, 0, 7];
    assert!(matches!(
        UpdateOpList::from_wire(&wire),
        Err(TntError::Malformed(_))
    ));
}

#[test]
fn test_splice_accessor_on_other_kinds() {
    let mut ops = UpdateOpList::new();
    ops.add_assign(0, b"x").unwrap();
    assert!(ops.get(0).unwrap().splice().is_none());
    assert!(ops.get(0).unwrap().arith_value().is_none());
}
