//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;

use time::UtcOffset;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use webrelay::access_log::AccessLog;

/// Start a mock origin that answers every connection with `response` and
/// closes. Each received request head is sent on the returned channel.
pub async fn start_origin(response: &'static [u8]) -> (SocketAddr, mpsc::UnboundedReceiver<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let tx = tx.clone();
            tokio::spawn(async move {
                let head = read_head(&mut socket).await;
                let _ = tx.send(head);
                let _ = socket.write_all(response).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (addr, rx)
}

/// Read until the blank line that ends a request head (or EOF).
pub async fn read_head<R: AsyncReadExt + Unpin>(reader: &mut R) -> Vec<u8> {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match reader.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
    head
}

/// A fresh, empty log file path unique to this test.
pub fn temp_log_path(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("webrelay-{}-{}.log", name, std::process::id()));
    let _ = std::fs::remove_file(&path);
    path
}

pub async fn open_log(name: &str) -> AccessLog {
    AccessLog::open(temp_log_path(name), UtcOffset::UTC).await.unwrap()
}

pub fn log_lines(log: &AccessLog) -> Vec<String> {
    std::fs::read_to_string(log.path())
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

pub fn log_bytes(log: &AccessLog) -> Vec<u8> {
    std::fs::read(log.path()).unwrap_or_default()
}

pub fn client_addr() -> SocketAddr {
    "10.0.0.7:51000".parse().unwrap()
}
