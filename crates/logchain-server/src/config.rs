use std::net::SocketAddr;
use std::path::Path;

use logchain_ledger::LedgerConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Page size for `GET /batches` when the caller gives no limit.
    pub default_page_size: usize,
    /// Upper bound on any requested page size.
    pub max_page_size: usize,
    /// Answer verify requests from an incremental fingerprint index instead
    /// of rescanning the ledger.
    pub indexed_verification: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            default_page_size: 50,
            max_page_size: 500,
            indexed_verification: false,
        }
    }
}

impl ServerConfig {
    pub fn page_size(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size.max(1))
    }
}

/// Everything a node needs: the `[server]` and `[ledger]` sections.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub server: ServerConfig,
    pub ledger: LedgerConfig,
}

impl NodeConfig {
    /// Load from a TOML file. A missing file means defaults.
    pub fn load(path: &Path) -> ServerResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> ServerResult<Self> {
        toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Apply environment overrides and reject unusable settings.
    pub fn finalize(mut self) -> ServerResult<Self> {
        self.ledger = self.ledger.with_env_overrides()?;
        self.ledger.validate()?;
        if self.server.default_page_size == 0 || self.server.max_page_size == 0 {
            return Err(ServerError::Config("page sizes must be positive".into()));
        }
        Ok(self)
    }
}
