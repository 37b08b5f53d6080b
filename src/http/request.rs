use bytes::{Bytes, BytesMut};

/// HTTP versions a client may state on the request line.
///
/// The outbound request is always HTTP/1.0 regardless of which one the
/// client used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    Http10,
    Http11,
}

impl Version {
    /// Length of `HTTP/1.x\r\n`.
    pub const TOKEN_LEN: usize = 10;

    /// Matches the version token (including CRLF) at the start of `buf`.
    pub fn from_prefix(buf: &[u8]) -> Option<Self> {
        if buf.starts_with(b"HTTP/1.0\r\n") {
            Some(Version::Http10)
        } else if buf.starts_with(b"HTTP/1.1\r\n") {
            Some(Version::Http11)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Version::Http10 => "HTTP/1.0",
            Version::Http11 => "HTTP/1.1",
        }
    }
}

/// A request head accumulated line by line from the client.
///
/// Holds everything up to and including the terminating blank line.
#[derive(Debug, Default)]
pub struct RawRequest {
    buf: BytesMut,
}

impl RawRequest {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(1024),
        }
    }

    /// Appends one line; the buffer grows as needed.
    pub fn push_line(&mut self, line: &[u8]) {
        self.buf.extend_from_slice(line);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_inner(self) -> BytesMut {
        self.buf
    }
}

impl From<&[u8]> for RawRequest {
    fn from(data: &[u8]) -> Self {
        Self {
            buf: BytesMut::from(data),
        }
    }
}

/// A validated `GET` request.
#[derive(Debug, Clone)]
pub struct ParsedRequest {
    /// The absolute URI exactly as the client sent it, byte for byte.
    pub uri: Bytes,
    pub version: Version,
    /// Header lines after the request line, including the final blank
    /// line. Forwarded without modification.
    pub trailing_headers: Bytes,
}
