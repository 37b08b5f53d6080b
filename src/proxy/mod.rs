//! Forwarding proxy functionality
//!
//! This module connects to origin servers, forwards the rewritten request
//! and streams the response back to the client.

pub mod relay;
pub mod upstream;

pub use relay::relay_response;
pub use upstream::{build_http_request, connect, forward, send_request};
