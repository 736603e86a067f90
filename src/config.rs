//! Configuration for tntproto
//!
//! Centralized configuration with sensible defaults.

use crate::error::{Result, TntError};

/// Main configuration for a client connection and its buffers
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// Server address (host:port)
    pub server_addr: String,

    /// Disable Nagle's algorithm on connect
    pub tcp_nodelay: bool,

    /// Connection read timeout (milliseconds, 0 = blocking)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = blocking)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Buffer Configuration
    // -------------------------------------------------------------------------
    /// Initial send buffer capacity (in bytes), doubled on demand
    pub send_buffer_size: usize,

    /// Initial receive buffer capacity (in bytes), also the refill chunk size
    pub recv_buffer_size: usize,

    // -------------------------------------------------------------------------
    // Framing Configuration
    // -------------------------------------------------------------------------
    /// Largest frame body a stream will buffer before giving up
    pub max_body_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:33013".to_string(),
            tcp_nodelay: true,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
            send_buffer_size: 16 * 1024,
            recv_buffer_size: 16 * 1024,
            max_body_len: 16 * 1024 * 1024, // 16 MB
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings the buffers cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.send_buffer_size == 0 {
            return Err(TntError::Config("send_buffer_size must be non-zero".to_string()));
        }
        if self.recv_buffer_size == 0 {
            return Err(TntError::Config("recv_buffer_size must be non-zero".to_string()));
        }
        if self.max_body_len == 0 {
            return Err(TntError::Config("max_body_len must be non-zero".to_string()));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the server address
    pub fn server_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.server_addr = addr.into();
        self
    }

    /// Enable or disable TCP_NODELAY
    pub fn tcp_nodelay(mut self, enabled: bool) -> Self {
        self.config.tcp_nodelay = enabled;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the initial send buffer capacity (in bytes)
    pub fn send_buffer_size(mut self, size: usize) -> Self {
        self.config.send_buffer_size = size;
        self
    }

    /// Set the initial receive buffer capacity (in bytes)
    pub fn recv_buffer_size(mut self, size: usize) -> Self {
        self.config.recv_buffer_size = size;
        self
    }

    /// Set the maximum frame body length (in bytes)
    pub fn max_body_len(mut self, len: usize) -> Self {
        self.config.max_body_len = len;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
