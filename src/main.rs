use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use time::UtcOffset;
use tracing_subscriber::EnvFilter;

use webrelay::access_log::AccessLog;
use webrelay::config::Config;
use webrelay::server;

#[derive(Parser)]
#[command(name = "webrelay", about = "Forwarding HTTP proxy with an access log")]
struct Cli {
    /// Port to listen on (all interfaces). Overrides the configured address.
    port: Option<u16>,

    /// YAML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Must run before the runtime spawns worker threads.
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);

    let cli = Cli::parse();
    let mut cfg = match &cli.config {
        Some(path) => Config::from_file(path)?.with_overrides(|key| std::env::var(key).ok()),
        None => Config::load(),
    };
    if let Some(port) = cli.port {
        cfg = cfg.with_port(port);
    }

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?
        .block_on(serve(cfg, offset))
}

async fn serve(cfg: Config, offset: UtcOffset) -> anyhow::Result<()> {
    let access_log = AccessLog::open(&cfg.log_path, offset)
        .await
        .with_context(|| format!("failed to open access log {}", cfg.log_path.display()))?;

    tokio::select! {
        res = server::listener::run(&cfg, access_log.clone()) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    access_log.flush().await.context("failed to flush access log")?;
    Ok(())
}
