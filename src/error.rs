//! Errors that end a single proxied connection.

use thiserror::Error;

/// Why a request could not be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Malformed {
    /// The stream ended (or a read failed) before the blank line.
    Truncated,
    /// No space follows the URI.
    MissingUriTerminator,
    /// The URI is not followed by `HTTP/1.0\r\n` or `HTTP/1.1\r\n`.
    BadVersion,
}

impl std::fmt::Display for Malformed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Malformed::Truncated => "stream ended before end of headers",
            Malformed::MissingUriTerminator => "couldn't find the end of the URI",
            Malformed::BadVersion => "missing or unsupported HTTP version",
        };
        f.write_str(reason)
    }
}

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("malformed request: {0}")]
    MalformedRequest(Malformed),

    #[error("unsupported method {method:?}")]
    UnsupportedMethod { method: String },

    #[error("invalid uri {uri:?}")]
    InvalidUri { uri: String },

    #[error("unable to connect to origin {host}:{port}")]
    OriginUnreachable {
        host: String,
        port: u32,
        #[source]
        source: std::io::Error,
    },
}

pub type ProxyResult<T> = Result<T, ProxyError>;
