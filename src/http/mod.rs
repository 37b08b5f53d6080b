//! HTTP/1 request handling for the forwarding proxy.
//!
//! # Architecture
//!
//! - **`transport`**: line and chunk reads that downgrade failures to end-of-stream
//! - **`parser`**: accumulates the request head and validates the request line
//! - **`request`**: raw and parsed request representations
//! - **`uri`**: splits an absolute `http://` URI into host, port and path
//! - **`connection`**: the per-connection pipeline
//!
//! # Connection State Machine
//!
//! Each client connection carries exactly one request:
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Accumulate request head, validate request line
//!        └──────┬──────┘
//!               │ GET <absolute-uri> HTTP/1.x
//!               ▼
//!        ┌──────────────────┐
//!        │   Forwarding     │ ← Resolve URI, connect to origin
//!        └──────┬───────────┘
//!               │ Origin connected
//!               ▼
//!        ┌──────────────────┐
//!        │    Relaying      │ ← Send rewritten request, stream response
//!        └──────┬───────────┘
//!               │ Origin closed
//!               ▼
//!        ┌──────────────────┐
//!        │    Logging       │ ← Append access-log line
//!        └──────┬───────────┘
//!               ▼
//!             Closed
//! ```
//!
//! Any parse, URI or connect error closes the connection straight away
//! without a log entry.

pub mod connection;
pub mod parser;
pub mod request;
pub mod transport;
pub mod uri;
