use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use attest_ledger::{LedgerConfig, SyncMode, WalConfig};

use crate::error::{GatewayError, GatewayResult};
use crate::retry::RetryPolicy;

/// Gateway configuration, usually read from a TOML file.
///
/// Every field has a default, so an empty file is a valid configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Commit log file.
    pub log_path: PathBuf,
    pub sync_mode: SyncMode,
    pub commit_timeout_ms: u64,
    pub event_capacity: usize,
    /// Only accept fingerprints that are 64 hex characters (SHA-256).
    pub require_sha256: bool,
    pub retry: RetryPolicy,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("attest.log"),
            sync_mode: SyncMode::EveryWrite,
            commit_timeout_ms: 5_000,
            event_capacity: 1024,
            require_sha256: true,
            retry: RetryPolicy::default(),
        }
    }
}

impl GatewayConfig {
    pub fn load(path: &Path) -> GatewayResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| GatewayError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> GatewayResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| GatewayError::Config(e.to_string()))?;
        if config.commit_timeout_ms == 0 {
            return Err(GatewayError::Config("commit_timeout_ms must be positive".into()));
        }
        Ok(config)
    }

    pub fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig {
            commit_timeout: Duration::from_millis(self.commit_timeout_ms),
            event_capacity: self.event_capacity,
        }
    }

    pub fn wal_config(&self) -> WalConfig {
        WalConfig {
            sync_mode: self.sync_mode,
        }
    }
}
