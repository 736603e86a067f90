//! Connection Tests
//!
//! Tests for request/reply pairing over in-memory and TCP transports.

use std::io::{self, Cursor, Read, Write};
use std::net::TcpListener;
use std::thread;

use bytes::BytesMut;
use tntproto::protocol::{
    decode_request, encode_reply, OpType, Reply, Request, RequestBody, RequestDecoder,
};
use tntproto::{Config, Connection, Decoded, Flags, TntError, Tuple, TupleList};

fn replies(list: &[Reply]) -> Cursor<Vec<u8>> {
    let mut buf = BytesMut::new();
    for reply in list {
        encode_reply(reply, &mut buf).unwrap();
    }
    Cursor::new(buf.to_vec())
}

fn sent_requests(bytes: &[u8]) -> Vec<Request> {
    let mut out = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        match decode_request(&bytes[pos..]).unwrap() {
            Decoded::Complete { value, consumed } => {
                out.push(value);
                pos += consumed;
            }
            Decoded::NeedBytes(_) => panic!("Expected whole request frames"),
        }
    }
    out
}

// =============================================================================
// In-Memory Tests
// =============================================================================

#[test]
fn test_request_reply_pairing() {
    let rows: TupleList = vec![Tuple::from_fields(["key1", "val1"])].into();
    let source = replies(&[Reply::ping(0), Reply::ok(OpType::Insert, 1, rows.clone())]);
    let mut conn = Connection::new(source, Vec::new(), &Config::default());

    assert!(conn.ping().unwrap().is_ok());
    let insert = Request::insert(10, Flags::RETURN_TUPLE, Tuple::from_fields(["key1", "val1"]));
    let reply = conn.request(&insert).unwrap();
    assert_eq!(reply.request_id, 1);
    assert_eq!(reply.tuples(), &rows);
    assert_eq!(conn.pending(), 0);

    let (_, tx) = conn.into_channel().into_parts();
    let sent = sent_requests(&tx.into_inner());
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].op_type(), OpType::Ping);
    match &sent[1].body {
        RequestBody::Insert(i) => assert_eq!(i.space, 10),
        _ => panic!("Expected INSERT request"),
    }
}

#[test]
fn test_pipelined_sends() {
    let source = replies(&[
        Reply::affected(OpType::Delete, 0, 1),
        Reply::affected(OpType::Delete, 1, 0),
    ]);
    let mut conn = Connection::new(source, Vec::new(), &Config::default());

    assert_eq!(conn.send(&Request::delete(1, Flags::NONE, Tuple::from_fields(["a"]))).unwrap(), 0);
    assert_eq!(conn.send(&Request::delete(1, Flags::NONE, Tuple::from_fields(["b"]))).unwrap(), 1);
    assert_eq!(conn.pending(), 2);

    assert_eq!(conn.recv().unwrap().row_count, Some(1));
    assert_eq!(conn.pending(), 1);
    assert_eq!(conn.recv().unwrap().row_count, Some(0));
    assert_eq!(conn.pending(), 0);
}

#[test]
fn test_recv_without_request() {
    let mut conn = Connection::new(replies(&[]), Vec::new(), &Config::default());
    assert!(matches!(conn.recv(), Err(TntError::BadValue(_))));
}

#[test]
fn test_reply_id_mismatch() {
    let source = replies(&[Reply::ping(42), Reply::ping(1)]);
    let mut conn = Connection::new(source, Vec::new(), &Config::default());
    assert_eq!(conn.send(&Request::ping()).unwrap(), 0);
    assert_eq!(conn.send(&Request::ping()).unwrap(), 1);

    assert!(matches!(conn.recv(), Err(TntError::Malformed(_))));
    assert_eq!(conn.pending(), 1);

    // The unanswered id is gone, so the next reply pairs with request 1
    assert_eq!(conn.recv().unwrap().request_id, 1);
    assert_eq!(conn.pending(), 0);
}

#[test]
fn test_server_closed() {
    let mut conn = Connection::new(replies(&[]), Vec::new(), &Config::default());
    match conn.ping() {
        Err(TntError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
        other => panic!("Expected UnexpectedEof, got {:?}", other),
    }
}

#[test]
fn test_error_reply_is_not_an_error() {
    let source = replies(&[Reply::error(OpType::Call, 0, 0x2002, "no such proc")]);
    let mut conn = Connection::new(source, Vec::new(), &Config::default());
    let reply = conn
        .request(&Request::call(Flags::NONE, "missing", Tuple::new()))
        .unwrap();
    assert!(!reply.is_ok());
    assert_eq!(reply.error_code(), 0x20);
    assert_eq!(reply.error.as_deref(), Some("no such proc"));
}

// =============================================================================
// TCP Tests
// =============================================================================

/// Answer each request with a reply echoing its tuple
fn serve_one_client(listener: TcpListener, requests: usize) {
    let (mut stream, _) = listener.accept().unwrap();
    let mut decoder = RequestDecoder::new();
    let mut chunk = [0u8; 7];
    let mut answered = 0;
    while answered < requests {
        let n = stream.read(&mut chunk).unwrap();
        assert!(n > 0, "client closed early");
        decoder.feed(&chunk[..n]);
        while let Decoded::Complete { value, .. } = decoder.decode().unwrap() {
            let (id, op) = (value.request_id, value.op_type());
            let reply = match value.body {
                RequestBody::Ping => Reply::ping(id),
                RequestBody::Insert(i) => Reply::ok(op, id, vec![i.tuple].into()),
                _ => Reply::error(op, id, 0x0202, "unsupported"),
            };
            let mut buf = BytesMut::new();
            encode_reply(&reply, &mut buf).unwrap();
            stream.write_all(&buf).unwrap();
            answered += 1;
        }
    }
}

#[test]
fn test_tcp_round_trip() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let server = thread::spawn(move || serve_one_client(listener, 3));

    let config = Config::builder().server_addr(addr.to_string()).build();
    let mut conn = Connection::connect(&config).unwrap();
    assert_eq!(conn.peer_addr(), addr.to_string());

    assert!(conn.ping().unwrap().is_ok());

    let tuple = Tuple::from_fields(["k", "v"]);
    let reply = conn
        .request(&Request::insert(0, Flags::RETURN_TUPLE, tuple.clone()))
        .unwrap();
    assert_eq!(reply.tuples().get(0), Some(&tuple));

    let reply = conn
        .request(&Request::select(0, 0, 0, 1, TupleList::new()))
        .unwrap();
    assert_eq!(reply.error.as_deref(), Some("unsupported"));

    server.join().unwrap();
}

#[test]
fn test_connect_rejects_invalid_config() {
    let config = Config::builder().recv_buffer_size(0).build();
    assert!(matches!(
        Connection::connect(&config),
        Err(TntError::Config(_))
    ));
}
