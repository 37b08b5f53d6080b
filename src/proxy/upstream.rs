//! Origin connection and request forwarding
//!
//! Opens the outbound connection named by the request URI and writes the
//! rewritten request to it.

use std::io;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

use crate::error::{ProxyError, ProxyResult};
use crate::http::transport;
use crate::http::uri::Target;
use crate::proxy::relay::relay_response;

/// Connect to the origin server named by `target`.
pub async fn connect(target: &Target) -> ProxyResult<TcpStream> {
    let origin_err = |source| ProxyError::OriginUnreachable {
        host: target.host.clone(),
        port: target.port,
        source,
    };

    let port = u16::try_from(target.port)
        .map_err(|_| origin_err(io::Error::new(io::ErrorKind::InvalidInput, "port out of range")))?;

    let stream = TcpStream::connect((target.host.as_str(), port))
        .await
        .map_err(origin_err)?;

    tracing::trace!(origin = %target, "Connected to origin");
    Ok(stream)
}

/// Build the request bytes sent to the origin.
///
/// The request line is always `GET /<path> HTTP/1.0`; the client's header
/// lines follow unmodified.
pub fn build_http_request(target: &Target, trailing_headers: &[u8]) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(16 + target.path.len() + trailing_headers.len());

    buffer.extend_from_slice(b"GET /");
    buffer.extend_from_slice(&target.path);
    buffer.extend_from_slice(b" HTTP/1.0\r\n");
    buffer.extend_from_slice(trailing_headers);

    buffer
}

/// Write the rewritten request to the origin.
///
/// A failed write is logged but not returned; the caller still relays
/// whatever the origin sends back.
pub async fn send_request<W>(origin: &mut W, target: &Target, trailing_headers: &[u8]) -> bool
where
    W: AsyncWrite + Unpin,
{
    let request = build_http_request(target, trailing_headers);
    let sent = transport::write_all(origin, &request).await;

    if sent {
        tracing::debug!(origin = %target, path = ?target.path, "Request forwarded to origin");
    } else {
        tracing::warn!(origin = %target, "Failed to forward request to origin");
    }

    sent
}

/// Send the rewritten request, then relay the origin's response to the
/// client.
///
/// Relaying happens even when the request write fails, so a response the
/// origin already produced still reaches the client. Returns the bytes
/// relayed.
pub async fn forward<O, C>(
    origin: &mut O,
    client: &mut C,
    target: &Target,
    trailing_headers: &[u8],
    chunk_size: usize,
) -> u64
where
    O: AsyncRead + AsyncWrite + Unpin,
    C: AsyncWrite + Unpin,
{
    send_request(origin, target, trailing_headers).await;
    relay_response(origin, client, chunk_size).await
}
