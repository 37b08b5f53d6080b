//! webrelay - Forwarding HTTP Proxy
//!
//! Core library for request parsing, forwarding and access logging.

pub mod access_log;
pub mod config;
pub mod error;
pub mod http;
pub mod proxy;
pub mod server;

pub use error::{Malformed, ProxyError, ProxyResult};
