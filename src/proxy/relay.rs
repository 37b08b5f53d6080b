//! Response streaming from origin to client.

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::http::transport::{self, ReadOutcome};

/// Default chunk size for streaming.
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// Copy the origin's response to the client, chunk by chunk, until the
/// origin closes.
///
/// Returns the number of bytes written to the client. A failed read ends
/// the stream; a failed client write ends it too and the unwritten chunk is
/// not counted.
pub async fn relay_response<R, W>(origin: &mut R, client: &mut W, chunk_size: usize) -> u64
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut total: u64 = 0;

    while let ReadOutcome::Data(n) = transport::read_chunk(origin, &mut buf).await {
        if !transport::write_all(client, &buf[..n]).await {
            break;
        }
        total += n as u64;
        tracing::debug!(bytes = n, total, "Forwarded chunk from origin to client");
    }

    if let Err(e) = client.flush().await {
        tracing::warn!(error = %e, "flush to client failed");
    }

    total
}
