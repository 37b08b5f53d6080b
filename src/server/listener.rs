use tokio::net::TcpListener;
use tracing::info;

use crate::access_log::AccessLog;
use crate::config::Config;
use crate::http::connection::Connection;

pub async fn run(cfg: &Config, access_log: AccessLog) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&cfg.listen_addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    serve(listener, access_log, cfg.chunk_size).await
}

/// Accept loop: one task per connection, each handling a single request.
pub async fn serve(listener: TcpListener, access_log: AccessLog, chunk_size: usize) -> anyhow::Result<()> {
    loop {
        let (socket, peer) = listener.accept().await?;
        info!("Accepted connection from {}", peer);

        let access_log = access_log.clone();
        tokio::spawn(async move {
            let conn = Connection::new(socket, peer, access_log, chunk_size);
            if let Err(e) = conn.run().await {
                tracing::warn!("Request from {} dropped: {}", peer, e);
            }
        });
    }
}
