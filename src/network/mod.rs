//! Network Module
//!
//! Byte transport, buffering and the client connection.
//!
//! ## Layers
//! ```text
//!   Connection         request ids, reply pairing
//!       │
//!   BufferedChannel    SendBuffer (flush) / RecvBuffer (fill)
//!       │
//!   ByteSink/Source    TcpStream, File, in-memory
//! ```
//!
//! Blocking happens only in `SendBuffer::flush` and `RecvBuffer::fill`.

mod channel;
mod connection;
mod transport;

pub use channel::{BufferedChannel, RecvBuffer, SendBuffer};
pub use connection::Connection;
pub use transport::{ByteSink, ByteSource};
