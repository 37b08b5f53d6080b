//! End-to-end tests of the per-connection pipeline over an in-memory client
//! transport and real local origins.

mod common;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::time::{Duration, timeout};

use webrelay::http::connection::Connection;
use webrelay::{Malformed, ProxyError};

const RESPONSE: &[u8] = b"HTTP/1.0 200 OK\r\nContent-Length: 5\r\n\r\nhello";

/// Sends `request` through a fresh connection and returns what the client
/// received plus the pipeline result.
async fn exchange(
    request: Vec<u8>,
    log: webrelay::access_log::AccessLog,
) -> (Vec<u8>, Result<u64, ProxyError>) {
    let (mut client, server) = tokio::io::duplex(64 * 1024);
    let conn = Connection::new(server, common::client_addr(), log, 1024);
    let handle = tokio::spawn(conn.run());

    client.write_all(&request).await.unwrap();
    let mut received = Vec::new();
    client.read_to_end(&mut received).await.unwrap();

    (received, handle.await.unwrap())
}

#[tokio::test]
async fn test_get_is_rewritten_relayed_and_logged() {
    let (origin, mut requests) = common::start_origin(RESPONSE).await;
    let log = common::open_log("pipeline-get").await;
    let uri = format!("http://127.0.0.1:{}/index.html", origin.port());
    let request = format!("GET {} HTTP/1.1\r\nHost: example.com\r\n\r\n", uri);

    let (received, result) = exchange(request.into_bytes(), log.clone()).await;

    assert_eq!(result.unwrap(), RESPONSE.len() as u64);
    assert_eq!(received, RESPONSE);
    assert_eq!(
        requests.recv().await.unwrap(),
        b"GET /index.html HTTP/1.0\r\nHost: example.com\r\n\r\n".to_vec()
    );

    let lines = common::log_lines(&log);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with(&format!(" UTC: 10.0.0.7 {} {}", uri, RESPONSE.len())), "{}", lines[0]);
}

#[tokio::test]
async fn test_non_utf8_uri_bytes_pass_through_unchanged() {
    let (origin, mut requests) = common::start_origin(RESPONSE).await;
    let log = common::open_log("pipeline-latin1").await;
    let mut request = format!("GET http://127.0.0.1:{}/caf", origin.port()).into_bytes();
    request.extend_from_slice(b"\xE9 HTTP/1.0\r\n\r\n");

    let (received, result) = exchange(request, log.clone()).await;

    assert_eq!(result.unwrap(), RESPONSE.len() as u64);
    assert_eq!(received, RESPONSE);
    assert_eq!(requests.recv().await.unwrap(), b"GET /caf\xE9 HTTP/1.0\r\n\r\n".to_vec());

    let mut expected = format!(" UTC: 10.0.0.7 http://127.0.0.1:{}/caf", origin.port()).into_bytes();
    expected.push(0xE9);
    expected.extend_from_slice(format!(" {}\n", RESPONSE.len()).as_bytes());
    let written = common::log_bytes(&log);
    assert!(written.ends_with(&expected), "{:?}", String::from_utf8_lossy(&written));
}

#[tokio::test]
async fn test_uri_without_path_requests_root() {
    let (origin, mut requests) = common::start_origin(RESPONSE).await;
    let log = common::open_log("pipeline-root").await;
    let request = format!("GET http://127.0.0.1:{} HTTP/1.0\r\n\r\n", origin.port());

    let (_, result) = exchange(request.into_bytes(), log).await;

    assert!(result.is_ok());
    assert_eq!(requests.recv().await.unwrap(), b"GET / HTTP/1.0\r\n\r\n".to_vec());
}

#[tokio::test]
async fn test_empty_origin_response_logs_zero() {
    let (origin, _requests) = common::start_origin(b"").await;
    let log = common::open_log("pipeline-empty").await;
    let uri = format!("http://127.0.0.1:{}/", origin.port());

    let (received, result) = exchange(format!("GET {} HTTP/1.0\r\n\r\n", uri).into_bytes(), log.clone()).await;

    assert_eq!(result.unwrap(), 0);
    assert!(received.is_empty());
    let lines = common::log_lines(&log);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with(&format!("{} 0", uri)));
}

#[tokio::test]
async fn test_post_is_closed_without_contacting_origin() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let log = common::open_log("pipeline-post").await;
    let request = format!("POST http://127.0.0.1:{}/ HTTP/1.0\r\n\r\n", port);

    let (received, result) = exchange(request.into_bytes(), log.clone()).await;

    assert!(received.is_empty());
    assert!(matches!(result, Err(ProxyError::UnsupportedMethod { .. })));
    assert!(timeout(Duration::from_millis(100), listener.accept()).await.is_err());
    assert!(common::log_lines(&log).is_empty());
}

#[tokio::test]
async fn test_relative_uri_is_rejected() {
    let log = common::open_log("pipeline-relative").await;

    let (received, result) = exchange(b"GET /index.html HTTP/1.1\r\nHost: a\r\n\r\n".to_vec(), log.clone()).await;

    assert!(received.is_empty());
    assert!(matches!(result, Err(ProxyError::InvalidUri { .. })));
    assert!(common::log_lines(&log).is_empty());
}

#[tokio::test]
async fn test_bad_version_is_rejected() {
    let log = common::open_log("pipeline-version").await;

    let (_, result) = exchange(b"GET http://example.com/ HTTP/2\r\n\r\n".to_vec(), log.clone()).await;

    assert!(matches!(result, Err(ProxyError::MalformedRequest(Malformed::BadVersion))));
    assert!(common::log_lines(&log).is_empty());
}

#[tokio::test]
async fn test_truncated_request_is_rejected() {
    let log = common::open_log("pipeline-truncated").await;
    let (mut client, server) = tokio::io::duplex(1024);
    let conn = Connection::new(server, common::client_addr(), log.clone(), 1024);
    let handle = tokio::spawn(conn.run());

    client.write_all(b"GET http://example.com/ HTTP/1.1\r\nHost: a\r\n").await.unwrap();
    client.shutdown().await.unwrap();

    let result = timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
    assert!(matches!(result, Err(ProxyError::MalformedRequest(Malformed::Truncated))));
    assert!(common::log_lines(&log).is_empty());
}

#[tokio::test]
async fn test_unreachable_origin_gets_no_response_or_log() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };
    let log = common::open_log("pipeline-unreachable").await;
    let request = format!("GET http://127.0.0.1:{}/ HTTP/1.0\r\n\r\n", port);

    let (received, result) = exchange(request.into_bytes(), log.clone()).await;

    assert!(received.is_empty());
    assert!(matches!(result, Err(ProxyError::OriginUnreachable { .. })));
    assert!(common::log_lines(&log).is_empty());
}
