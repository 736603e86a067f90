//! Config Tests
//!
//! Tests for defaults, builder overrides and validation.

use tntproto::{Config, TntError};

#[test]
fn test_defaults_are_valid() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.server_addr, "127.0.0.1:33013");
    assert!(config.tcp_nodelay);
}

#[test]
fn test_builder_overrides() {
    let config = Config::builder()
        .server_addr("10.0.0.1:3301")
        .tcp_nodelay(false)
        .read_timeout_ms(0)
        .max_body_len(1024)
        .build();
    assert_eq!(config.server_addr, "10.0.0.1:3301");
    assert!(!config.tcp_nodelay);
    assert_eq!(config.read_timeout_ms, 0);
    assert_eq!(config.max_body_len, 1024);
    // untouched fields keep their defaults
    assert_eq!(config.send_buffer_size, 16 * 1024);
    assert_eq!(config.write_timeout_ms, 5000);
}

#[test]
fn test_zero_sizes_rejected() {
    let config = Config::builder().send_buffer_size(0).build();
    assert!(matches!(config.validate(), Err(TntError::Config(_))));

    let config = Config::builder().recv_buffer_size(0).build();
    assert!(matches!(config.validate(), Err(TntError::Config(_))));

    let config = Config::builder().max_body_len(0).build();
    assert!(matches!(config.validate(), Err(TntError::Config(_))));
}
