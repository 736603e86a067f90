//! Transport boundary
//!
//! The byte sink and byte source the buffered channel sits on. Anything
//! implementing `Write` is a sink and anything implementing `Read` is a
//! source: a `TcpStream`, a capture `File`, or an in-memory buffer.

use std::io::{self, Read, Write};

/// Where encoded frames go
pub trait ByteSink {
    /// Send some prefix of `buf`, returning how many bytes were taken
    fn send(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Push out anything the sink itself holds back
    fn sync(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Where received frames come from
pub trait ByteSource {
    /// Read up to `buf.len()` bytes; 0 means end of stream
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

impl<W: Write> ByteSink for W {
    fn send(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write(buf)
    }

    fn sync(&mut self) -> io::Result<()> {
        self.flush()
    }
}

impl<R: Read> ByteSource for R {
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read(buf)
    }
}

/// Send all of `buf`, retrying on interruption
///
/// On failure, reports how many bytes the sink accepted first.
pub(crate) fn send_all<W: ByteSink + ?Sized>(
    sink: &mut W,
    buf: &[u8],
) -> std::result::Result<(), (usize, io::Error)> {
    let mut written = 0;
    while written < buf.len() {
        match sink.send(&buf[written..]) {
            Ok(0) => {
                return Err((
                    written,
                    io::Error::new(io::ErrorKind::WriteZero, "sink accepted no bytes"),
                ))
            }
            Ok(n) => written += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err((written, e)),
        }
    }
    Ok(())
}
