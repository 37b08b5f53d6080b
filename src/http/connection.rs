use std::net::SocketAddr;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::access_log::AccessLog;
use crate::error::ProxyResult;
use crate::http::parser::{parse_http_request, read_request};
use crate::http::request::ParsedRequest;
use crate::http::uri::Target;
use crate::proxy::upstream;

/// One client connection, carrying exactly one proxied request.
pub struct Connection<S> {
    stream: BufReader<S>,
    peer: SocketAddr,
    access_log: AccessLog,
    chunk_size: usize,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Forwarding(ParsedRequest),
    Relaying(TcpStream, Target, ParsedRequest),
    Logging(Bytes, u64), // original uri, bytes relayed
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, peer: SocketAddr, access_log: AccessLog, chunk_size: usize) -> Self {
        Self {
            stream: BufReader::new(stream),
            peer,
            access_log,
            chunk_size,
            state: ConnectionState::Reading,
        }
    }

    /// Drives the connection to completion and closes it.
    ///
    /// Returns the number of response bytes relayed to the client. An error
    /// means the request was rejected or its origin unreachable; nothing is
    /// logged in that case.
    pub async fn run(mut self) -> ProxyResult<u64> {
        let result = self.process().await;

        if let Err(e) = self.stream.get_mut().shutdown().await {
            tracing::debug!(peer = %self.peer, error = %e, "client shutdown failed");
        }

        result
    }

    async fn process(&mut self) -> ProxyResult<u64> {
        let mut relayed = 0;

        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => {
                    let raw = read_request(&mut self.stream).await?;
                    let request = parse_http_request(raw)?;
                    tracing::debug!(
                        peer = %self.peer,
                        uri = %String::from_utf8_lossy(&request.uri),
                        version = request.version.as_str(),
                        "Request received"
                    );
                    self.state = ConnectionState::Forwarding(request);
                }

                ConnectionState::Forwarding(request) => {
                    let target = Target::from_uri(&request.uri)?;
                    let mut origin = upstream::connect(&target).await?;
                    tracing::info!(peer = %self.peer, origin = %target, "Forwarding request");

                    self.state = ConnectionState::Relaying(origin, target, request);
                }

                ConnectionState::Relaying(mut origin, target, request) => {
                    relayed = upstream::forward(
                        &mut origin,
                        self.stream.get_mut(),
                        &target,
                        &request.trailing_headers,
                        self.chunk_size,
                    )
                    .await;
                    self.state = ConnectionState::Logging(request.uri, relayed);
                }

                ConnectionState::Logging(uri, bytes) => {
                    let record = self.access_log.record(self.peer.ip(), uri, bytes);
                    if let Err(e) = self.access_log.append(&record).await {
                        tracing::warn!(
                            path = %self.access_log.path().display(),
                            error = %e,
                            "Failed to write access log entry"
                        );
                    }
                    tracing::info!(
                        peer = %self.peer,
                        uri = %String::from_utf8_lossy(&record.uri),
                        bytes,
                        "Request complete"
                    );
                }

                ConnectionState::Closed => break,
            }
        }

        Ok(relayed)
    }
}
