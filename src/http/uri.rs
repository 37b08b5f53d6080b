//! Absolute-URI decomposition for proxy requests.
//!
//! A proxy receives the full URL on the request line
//! (`http://host[:port][/path]`). This module splits it into the origin's
//! host, port and path. The path is kept as raw bytes so whatever the client
//! sent reaches the origin unchanged.

use std::fmt;

use bytes::Bytes;

use crate::error::{ProxyError, ProxyResult};

const SCHEME: &[u8] = b"http://";
const DEFAULT_PORT: u32 = 80;
const HOST_TERMINATORS: [u8; 6] = [b' ', b':', b'/', b'\r', b'\n', b'\0'];

/// Where a request is forwarded to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    /// Port as written in the URI; not range-checked here.
    pub port: u32,
    /// Path without its leading slash. Empty for a root request.
    pub path: Bytes,
}

impl Target {
    /// Decomposes an absolute `http://` URI.
    ///
    /// # Example
    ///
    /// ```
    /// # use webrelay::http::uri::Target;
    /// let target = Target::from_uri("http://example.com:8080/index.html").unwrap();
    /// assert_eq!(target.host, "example.com");
    /// assert_eq!(target.port, 8080);
    /// assert_eq!(target.path, "index.html");
    /// ```
    pub fn from_uri(uri: impl AsRef<[u8]>) -> ProxyResult<Self> {
        let uri = uri.as_ref();
        let invalid = || ProxyError::InvalidUri {
            uri: String::from_utf8_lossy(uri).into_owned(),
        };

        let has_scheme = uri
            .get(..SCHEME.len())
            .is_some_and(|s| s.eq_ignore_ascii_case(SCHEME));
        if !has_scheme {
            return Err(invalid());
        }

        let rest = &uri[SCHEME.len()..];
        let host_end = rest
            .iter()
            .position(|b| HOST_TERMINATORS.contains(b))
            .unwrap_or(rest.len());
        let host = &rest[..host_end];
        if host.is_empty() {
            return Err(invalid());
        }

        let port = match rest.get(host_end) {
            Some(b':') => parse_leading_digits(&rest[host_end + 1..]),
            _ => DEFAULT_PORT,
        };

        let path = match rest.iter().position(|&b| b == b'/') {
            Some(slash) => Bytes::copy_from_slice(&rest[slash + 1..]),
            None => Bytes::new(),
        };

        Ok(Self {
            // Resolved by name; a non-UTF-8 host can only fail to resolve.
            host: String::from_utf8_lossy(host).into_owned(),
            port,
            path,
        })
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Parses the leading decimal digits of `s`, like C's `atoi` but without
/// sign handling. No digits gives 0; overflow saturates.
fn parse_leading_digits(s: &[u8]) -> u32 {
    s.iter()
        .take_while(|b| b.is_ascii_digit())
        .fold(0u32, |acc, d| {
            acc.saturating_mul(10).saturating_add(u32::from(d - b'0'))
        })
}
