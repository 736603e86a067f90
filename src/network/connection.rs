//! Client Connection
//!
//! Pairs requests with replies over one buffered channel. Requests are
//! numbered as they are sent; replies must come back in the same order.

use std::collections::VecDeque;
use std::io;
use std::net::TcpStream;
use std::time::Duration;

use crate::config::Config;
use crate::error::{Result, TntError};
use crate::iter::read_frame;
use crate::protocol::{Reply, Request, RequestEncoder};

use super::channel::BufferedChannel;
use super::transport::{ByteSink, ByteSource};

/// A client connection to a server
pub struct Connection<R, W> {
    channel: BufferedChannel<R, W>,

    /// Frames are staged here to get their request ids
    encoder: RequestEncoder,

    /// Ids sent and not yet answered, oldest first
    pending: VecDeque<u32>,

    max_body_len: usize,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection<TcpStream, TcpStream> {
    /// Connect to `config.server_addr`
    pub fn connect(config: &Config) -> Result<Self> {
        config.validate()?;
        let stream = TcpStream::connect(&config.server_addr)?;
        Self::from_tcp(stream, config)
    }

    /// Wrap an established stream, applying the socket options in `config`
    pub fn from_tcp(stream: TcpStream, config: &Config) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        stream.set_nodelay(config.tcp_nodelay)?;
        if config.read_timeout_ms > 0 {
            stream.set_read_timeout(Some(Duration::from_millis(config.read_timeout_ms)))?;
        }
        if config.write_timeout_ms > 0 {
            stream.set_write_timeout(Some(Duration::from_millis(config.write_timeout_ms)))?;
        }

        let read_stream = stream.try_clone()?;
        let mut conn = Self::new(read_stream, stream, config);
        conn.peer_addr = peer_addr;
        tracing::debug!("Connected to {}", conn.peer_addr);
        Ok(conn)
    }
}

impl<R: ByteSource, W: ByteSink> Connection<R, W> {
    /// Connection over any reader/writer pair
    pub fn new(reader: R, writer: W, config: &Config) -> Self {
        Self {
            channel: BufferedChannel::new(reader, writer, config),
            encoder: RequestEncoder::new(),
            pending: VecDeque::new(),
            max_body_len: config.max_body_len,
            peer_addr: "unknown".to_string(),
        }
    }

    /// Buffer `request` for sending and return the id it was given
    ///
    /// Nothing reaches the transport until `flush` (or `recv`).
    pub fn send(&mut self, request: &Request) -> Result<u32> {
        let id = self.encoder.encode(request)?;
        let frame = self.encoder.take();
        self.channel.write(&frame)?;
        self.pending.push_back(id);
        tracing::trace!("Queued {} request {} to {}", request.op_type(), id, self.peer_addr);
        Ok(id)
    }

    /// Send every buffered request
    pub fn flush(&mut self) -> Result<usize> {
        let sent = self.channel.flush()?;
        if sent > 0 {
            tracing::debug!("Sent {} bytes to {}", sent, self.peer_addr);
        }
        Ok(sent)
    }

    /// Receive the reply to the oldest unanswered request
    ///
    /// A reply whose id differs from that request is `Malformed`. Both the
    /// reply and the request it should have answered are dropped; the
    /// server is out of step with this client, so the connection should be
    /// discarded.
    pub fn recv(&mut self) -> Result<Reply> {
        let Some(&expected) = self.pending.front() else {
            return Err(TntError::BadValue("no request is awaiting a reply".into()));
        };
        self.flush()?;

        let reply = match read_frame::<R, Reply>(self.channel.rx(), self.max_body_len)? {
            Some(reply) => reply,
            None => {
                return Err(TntError::Io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("{} closed the connection", self.peer_addr),
                )))
            }
        };
        self.pending.pop_front();
        if reply.request_id != expected {
            tracing::warn!(
                "Reply id {} from {} does not match request {}",
                reply.request_id,
                self.peer_addr,
                expected
            );
            return Err(TntError::Malformed(format!(
                "reply id {} does not match request id {}",
                reply.request_id, expected
            )));
        }

        if reply.is_ok() {
            tracing::trace!("Reply {} from {}: ok", reply.request_id, self.peer_addr);
        } else {
            tracing::debug!(
                "Reply {} from {}: code {} ({})",
                reply.request_id,
                self.peer_addr,
                reply.code,
                reply.error.as_deref().unwrap_or("")
            );
        }
        Ok(reply)
    }

    /// Send one request and wait for its reply
    pub fn request(&mut self, request: &Request) -> Result<Reply> {
        self.send(request)?;
        self.recv()
    }

    pub fn ping(&mut self) -> Result<Reply> {
        self.request(&Request::ping())
    }

    /// Requests sent and not yet answered
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    pub fn into_channel(self) -> BufferedChannel<R, W> {
        self.channel
    }
}
