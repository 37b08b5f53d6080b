use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::proxy::relay::DEFAULT_CHUNK_SIZE;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub listen_addr: String,
    /// Access log file, opened in append mode.
    pub log_path: PathBuf,
    /// Bytes read from the origin per relay step.
    pub chunk_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            log_path: PathBuf::from("proxy.log"),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl Config {
    /// Defaults overridden by the `LISTEN` and `PROXY_LOG` environment
    /// variables.
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::default().with_overrides(lookup)
    }

    /// Applies `LISTEN` and `PROXY_LOG` on top of `self`, whether it came
    /// from defaults or a config file.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("LISTEN") {
            self.listen_addr = addr;
        }
        if let Some(path) = lookup("PROXY_LOG") {
            self.log_path = PathBuf::from(path);
        }
        self
    }

    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let cfg: Self = serde_yaml::from_str(yaml).context("invalid config")?;
        if cfg.chunk_size == 0 {
            anyhow::bail!("chunk_size must be greater than zero");
        }
        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&yaml).with_context(|| format!("in {}", path.display()))
    }

    /// Listen on all interfaces at `port`.
    pub fn with_port(mut self, port: u16) -> Self {
        self.listen_addr = format!("0.0.0.0:{port}");
        self
    }
}
