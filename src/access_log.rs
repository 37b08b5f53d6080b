//! Append-only access log shared by every connection task.
//!
//! One line per forwarded request:
//!
//! ```text
//! Fri 16 Oct 2026 09:12:44 +0200: 10.0.0.7 http://example.com/ 512
//! ```
//!
//! The file handle sits behind an exclusive async mutex. Formatting,
//! appending and flushing a line all happen while the lock is held, so
//! concurrent writers can never interleave partial lines.

use std::fmt;
use std::io;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// A single access-log entry.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub timestamp: OffsetDateTime,
    pub client: IpAddr,
    /// The request URI as received, before rewriting. Written to the log
    /// byte for byte.
    pub uri: Bytes,
    /// Bytes relayed from the origin to the client.
    pub bytes: u64,
}

impl LogRecord {
    pub fn new(timestamp: OffsetDateTime, client: IpAddr, uri: impl Into<Bytes>, bytes: u64) -> Self {
        Self {
            timestamp,
            client,
            uri: uri.into(),
            bytes,
        }
    }

    /// Renders the record as one newline-terminated log line.
    pub fn to_line(&self) -> io::Result<Vec<u8>> {
        let mut stamp = self
            .timestamp
            .format(format_description!(
                "[weekday repr:short] [day] [month repr:short] [year] [hour]:[minute]:[second]"
            ))
            .map_err(io::Error::other)?;
        stamp.push(' ');

        let offset = self.timestamp.offset();
        if offset.is_utc() {
            stamp.push_str("UTC");
        } else {
            let rendered = self
                .timestamp
                .format(format_description!("[offset_hour sign:mandatory][offset_minute]"))
                .map_err(io::Error::other)?;
            stamp.push_str(&rendered);
        }

        let mut line = format!("{}: {} ", stamp, ClientAddr(self.client)).into_bytes();
        line.extend_from_slice(&self.uri);
        line.extend_from_slice(format!(" {}\n", self.bytes).as_bytes());
        Ok(line)
    }
}

/// Dotted-decimal for IPv4 and IPv4-mapped peers; RFC 5952 text otherwise.
struct ClientAddr(IpAddr);

impl fmt::Display for ClientAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v4 = match self.0 {
            IpAddr::V4(v4) => v4,
            IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
                Some(v4) => v4,
                None => return write!(f, "{v6}"),
            },
        };

        let [a, b, c, d] = u32::from(v4).to_be_bytes();
        write!(f, "{a}.{b}.{c}.{d}")
    }
}

/// Cloneable handle to the shared log file.
#[derive(Debug, Clone)]
pub struct AccessLog {
    file: Arc<Mutex<File>>,
    offset: UtcOffset,
    path: PathBuf,
}

impl AccessLog {
    /// Opens `path` for appending, creating it if missing.
    ///
    /// Timestamps are rendered in `offset`, which the binary captures once
    /// at startup. The offset is fixed for the life of the handle: a
    /// daylight-saving change is only picked up after a restart, since the
    /// local offset can only be read soundly while the process is still
    /// single-threaded.
    pub async fn open(path: impl AsRef<Path>, offset: UtcOffset) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path).await?;

        Ok(Self {
            file: Arc::new(Mutex::new(file)),
            offset,
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn offset(&self) -> UtcOffset {
        self.offset
    }

    /// Builds a record stamped with the current time.
    pub fn record(&self, client: IpAddr, uri: impl Into<Bytes>, bytes: u64) -> LogRecord {
        let now = OffsetDateTime::now_utc().to_offset(self.offset);
        LogRecord::new(now, client, uri, bytes)
    }

    /// Appends one record and flushes it to the file.
    pub async fn append(&self, record: &LogRecord) -> io::Result<()> {
        let mut file = self.file.lock().await;

        let line = record.to_line()?;
        file.write_all(&line).await?;
        file.flush().await
    }

    /// Flushes pending writes and syncs the file to disk.
    pub async fn flush(&self) -> io::Result<()> {
        let mut file = self.file.lock().await;
        file.flush().await?;
        file.sync_data().await
    }
}
