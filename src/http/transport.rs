//! Blocking-style byte transport helpers shared by the client and origin sides.
//!
//! Read failures after a connection is established are not fatal: they are
//! logged and reported as [`ReadOutcome::Closed`] so callers treat them the
//! same way as an orderly end of stream.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Result of a single read from a peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// `n` bytes were read (always > 0).
    Data(usize),
    /// The peer closed the stream or the read failed.
    Closed,
}

/// Reads one LF-terminated line and appends it to `line`.
///
/// A final line without LF is still returned as `Data`; the next call
/// reports `Closed`.
pub async fn read_line<R>(reader: &mut R, line: &mut Vec<u8>) -> ReadOutcome
where
    R: AsyncBufRead + Unpin,
{
    match reader.read_until(b'\n', line).await {
        Ok(0) => ReadOutcome::Closed,
        Ok(n) => ReadOutcome::Data(n),
        Err(e) => {
            tracing::warn!(error = %e, "line read failed");
            ReadOutcome::Closed
        }
    }
}

/// Reads at most `buf.len()` bytes.
pub async fn read_chunk<R>(reader: &mut R, buf: &mut [u8]) -> ReadOutcome
where
    R: AsyncRead + Unpin,
{
    match reader.read(buf).await {
        Ok(0) => ReadOutcome::Closed,
        Ok(n) => ReadOutcome::Data(n),
        Err(e) => {
            tracing::warn!(error = %e, "read failed");
            ReadOutcome::Closed
        }
    }
}

/// Writes all of `data`, logging instead of propagating a failure.
///
/// Returns whether the write succeeded.
pub async fn write_all<W>(writer: &mut W, data: &[u8]) -> bool
where
    W: AsyncWrite + Unpin,
{
    match writer.write_all(data).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, len = data.len(), "write failed");
            false
        }
    }
}
