use tokio::io::AsyncBufRead;

use crate::error::{Malformed, ProxyError, ProxyResult};
use crate::http::request::{ParsedRequest, RawRequest, Version};
use crate::http::transport::{ReadOutcome, read_line};

const METHOD_PREFIX: &[u8] = b"GET ";

/// Reads request lines from the client until the blank line that ends the
/// header block.
pub async fn read_request<R>(reader: &mut R) -> ProxyResult<RawRequest>
where
    R: AsyncBufRead + Unpin,
{
    let mut request = RawRequest::new();
    let mut line = Vec::with_capacity(256);

    loop {
        line.clear();
        if let ReadOutcome::Closed = read_line(reader, &mut line).await {
            return Err(ProxyError::MalformedRequest(Malformed::Truncated));
        }

        request.push_line(&line);

        if line == b"\r\n" {
            return Ok(request);
        }
    }
}

/// Validates the request line of a complete request head.
///
/// Only `GET <uri> HTTP/1.0` and `GET <uri> HTTP/1.1` are accepted. The
/// header lines are left untouched.
pub fn parse_http_request(raw: RawRequest) -> ProxyResult<ParsedRequest> {
    let mut buf = raw.into_inner();

    if !buf.starts_with(METHOD_PREFIX) {
        let method = buf[..]
            .split(|&b| b == b' ' || b == b'\r' || b == b'\n')
            .next()
            .unwrap_or_default();
        return Err(ProxyError::UnsupportedMethod {
            method: String::from_utf8_lossy(method).into_owned(),
        });
    }

    let uri_start = METHOD_PREFIX.len();
    let uri_end = buf[uri_start..]
        .iter()
        .position(|&b| b == b' ')
        .map(|i| uri_start + i)
        .ok_or(ProxyError::MalformedRequest(Malformed::MissingUriTerminator))?;

    let version_start = uri_end + 1;
    let version = Version::from_prefix(&buf[version_start..])
        .ok_or(ProxyError::MalformedRequest(Malformed::BadVersion))?;

    let trailing_headers = buf.split_off(version_start + Version::TOKEN_LEN).freeze();
    let uri = buf.split_to(uri_end).split_off(uri_start).freeze();

    Ok(ParsedRequest {
        uri,
        version,
        trailing_headers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_get() {
        let raw = RawRequest::from(&b"GET http://example.com/ HTTP/1.1\r\nHost: example.com\r\n\r\n"[..]);

        let parsed = parse_http_request(raw).unwrap();

        assert_eq!(parsed.uri, "http://example.com/");
        assert_eq!(parsed.version, Version::Http11);
        assert_eq!(&parsed.trailing_headers[..], b"Host: example.com\r\n\r\n");
    }

    #[test]
    fn uri_keeps_raw_bytes() {
        let raw = RawRequest::from(&b"GET http://example.com/caf\xE9 HTTP/1.0\r\n\r\n"[..]);

        let parsed = parse_http_request(raw).unwrap();

        assert_eq!(&parsed.uri[..], b"http://example.com/caf\xE9");
    }

    #[test]
    fn method_is_case_sensitive() {
        let raw = RawRequest::from(&b"get http://example.com/ HTTP/1.1\r\n\r\n"[..]);

        let err = parse_http_request(raw).unwrap_err();
        assert!(matches!(err, ProxyError::UnsupportedMethod { method } if method == "get"));
    }
}
