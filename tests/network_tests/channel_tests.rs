//! Buffered Channel Tests
//!
//! Tests for the send and receive buffer disciplines.

use std::io::{self, Read, Write};

use tntproto::network::{BufferedChannel, RecvBuffer, SendBuffer};
use tntproto::{Config, TntError};

/// Sink that records every write call
#[derive(Default)]
struct RecordingSink {
    sent: Vec<u8>,
    calls: usize,
    /// Most bytes taken per call
    max_per_call: Option<usize>,
    /// Fail once this many bytes have been taken
    fail_after: Option<usize>,
    interrupt_once: bool,
}

impl Write for RecordingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.calls += 1;
        if self.interrupt_once {
            self.interrupt_once = false;
            return Err(io::Error::new(io::ErrorKind::Interrupted, "signal"));
        }
        let mut n = buf.len();
        if let Some(limit) = self.fail_after {
            if self.sent.len() >= limit {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "peer gone"));
            }
            n = n.min(limit - self.sent.len());
        }
        if let Some(max) = self.max_per_call {
            n = n.min(max);
        }
        self.sent.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Source that records the size of every read request
struct RecordingSource {
    data: Vec<u8>,
    pos: usize,
    requested: Vec<usize>,
}

impl RecordingSource {
    fn new(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
            pos: 0,
            requested: Vec::new(),
        }
    }
}

impl Read for RecordingSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.requested.push(buf.len());
        let n = buf.len().min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

// =============================================================================
// Send Buffer Tests
// =============================================================================

#[test]
fn test_write_does_not_touch_sink() {
    let mut sink = RecordingSink::default();
    let mut tx = SendBuffer::with_capacity(&mut sink, 64);
    tx.write(b"hello").unwrap();
    tx.write(b" world").unwrap();
    assert_eq!(tx.pending(), 11);
    assert_eq!(tx.get_ref().calls, 0);
}

#[test]
fn test_flush_sends_once_and_empties() {
    let mut sink = RecordingSink::default();
    let mut tx = SendBuffer::with_capacity(&mut sink, 64);
    tx.write(b"abc").unwrap();
    tx.write(b"def").unwrap();

    assert_eq!(tx.flush().unwrap(), 6);
    assert_eq!(tx.pending(), 0);
    assert_eq!(tx.flush().unwrap(), 0);
    drop(tx);

    assert_eq!(sink.calls, 1);
    assert_eq!(sink.sent, b"abcdef");
}

#[test]
fn test_flush_loops_over_short_writes() {
    let mut sink = RecordingSink {
        max_per_call: Some(2),
        ..Default::default()
    };
    let mut tx = SendBuffer::with_capacity(&mut sink, 64);
    tx.write(b"12345").unwrap();
    assert_eq!(tx.flush().unwrap(), 5);
    drop(tx);

    assert_eq!(sink.calls, 3);
    assert_eq!(sink.sent, b"12345");
}

#[test]
fn test_flush_retries_interrupted() {
    let mut sink = RecordingSink {
        interrupt_once: true,
        ..Default::default()
    };
    let mut tx = SendBuffer::with_capacity(&mut sink, 64);
    tx.write(b"xy").unwrap();
    assert_eq!(tx.flush().unwrap(), 2);
    drop(tx);
    assert_eq!(sink.sent, b"xy");
}

#[test]
fn test_small_write_that_does_not_fit_doubles() {
    let mut sink = RecordingSink::default();
    let mut tx = SendBuffer::with_capacity(&mut sink, 8);
    tx.write(&[1; 6]).unwrap();
    tx.write(&[2; 6]).unwrap();

    assert_eq!(tx.capacity(), 16);
    assert_eq!(tx.pending(), 12);
    assert_eq!(tx.get_ref().calls, 0);
}

#[test]
fn test_oversized_write_goes_direct() {
    let mut sink = RecordingSink::default();
    let mut tx = SendBuffer::with_capacity(&mut sink, 4);
    tx.write(b"ab").unwrap();
    tx.write(b"0123456789").unwrap();

    assert_eq!(tx.pending(), 0);
    assert_eq!(tx.capacity(), 4);
    drop(tx);
    assert_eq!(sink.calls, 2);
    assert_eq!(sink.sent, b"ab0123456789");
}

#[test]
fn test_failed_flush_reports_written_and_keeps_rest() {
    let mut sink = RecordingSink {
        fail_after: Some(3),
        ..Default::default()
    };
    let mut tx = SendBuffer::with_capacity(&mut sink, 64);
    tx.write(b"abcdefgh").unwrap();

    match tx.flush() {
        Err(TntError::Transport { written, source }) => {
            assert_eq!(written, 3);
            assert_eq!(source.kind(), io::ErrorKind::BrokenPipe);
        }
        other => panic!("Expected Transport error, got {:?}", other),
    }
    assert_eq!(tx.pending(), 5);
    assert!(TntError::Transport {
        written: 0,
        source: io::Error::new(io::ErrorKind::Other, "x")
    }
    .is_connection_fatal());
}

#[test]
fn test_zero_length_write_is_an_error() {
    let mut sink = RecordingSink {
        max_per_call: Some(0),
        ..Default::default()
    };
    let mut tx = SendBuffer::with_capacity(&mut sink, 64);
    tx.write(b"a").unwrap();
    match tx.flush() {
        Err(TntError::Transport { written: 0, source }) => {
            assert_eq!(source.kind(), io::ErrorKind::WriteZero)
        }
        other => panic!("Expected WriteZero, got {:?}", other),
    }
}

// =============================================================================
// Receive Buffer Tests
// =============================================================================

#[test]
fn test_refill_reads_whole_capacity() {
    let mut rx = RecvBuffer::with_capacity(RecordingSource::new(b"0123456789"), 8);

    assert_eq!(&rx.read(2).unwrap()[..], b"01");
    assert_eq!(&rx.read(3).unwrap()[..], b"234");
    assert_eq!(rx.get_ref().requested, vec![8]);
    assert_eq!(rx.buffered(), b"567");
}

#[test]
fn test_read_spans_refills() {
    let mut rx = RecvBuffer::with_capacity(RecordingSource::new(b"0123456789"), 4);
    assert_eq!(&rx.read(6).unwrap()[..], b"012345");
    // grown to fit the request
    assert_eq!(rx.capacity(), 8);
    assert_eq!(&rx.read(10).unwrap()[..], b"6789");
}

#[test]
fn test_fill_stops_at_eof() {
    let mut rx = RecvBuffer::with_capacity(RecordingSource::new(b"abc"), 16);
    assert_eq!(rx.fill(10).unwrap(), 3);
    assert_eq!(rx.fill(10).unwrap(), 3);
    rx.consume(1);
    assert_eq!(rx.buffered(), b"bc");
}

#[test]
fn test_read_exact_short_is_eof() {
    let mut rx = RecvBuffer::with_capacity(RecordingSource::new(b"abc"), 16);
    match rx.read_exact(4) {
        Err(TntError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
        other => panic!("Expected UnexpectedEof, got {:?}", other),
    }
    assert_eq!(&rx.read_exact(3).unwrap()[..], b"abc");
}

#[test]
fn test_source_error_propagates() {
    struct Broken;
    impl Read for Broken {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
        }
    }

    let mut rx = RecvBuffer::with_capacity(Broken, 16);
    let err = rx.fill(1).unwrap_err();
    assert!(err.is_connection_fatal());
    assert!(rx.buffered().is_empty());
}

// =============================================================================
// Channel Tests
// =============================================================================

#[test]
fn test_channel_halves_are_independent() {
    let config = Config::builder()
        .send_buffer_size(32)
        .recv_buffer_size(32)
        .build();
    let mut sink = RecordingSink::default();
    let mut channel = BufferedChannel::new(RecordingSource::new(b"reply"), &mut sink, &config);

    channel.write(b"request").unwrap();
    assert_eq!(&channel.read(5).unwrap()[..], b"reply");
    assert_eq!(channel.tx().pending(), 7);
    assert_eq!(channel.flush().unwrap(), 7);

    let (rx, tx) = channel.into_parts();
    assert_eq!(rx.get_ref().requested, vec![32]);
    drop(tx);
    assert_eq!(sink.sent, b"request");
}
