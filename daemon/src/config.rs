//! Daemon configuration with TOML file support.
//!
//! ```toml
//! [logging]
//! level = "info"
//! format = "human"
//!
//! [client]
//! rpc_url = "http://127.0.0.1:7077"
//! wallet_address = "0x..."
//!
//! [ledger]
//! port = 7077
//! data_file = "./ballot.snapshot"
//! operators = ["0x..."]
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use ballot_client::ClientConfig;
use ballot_ledger::LedgerConfig;
use ballot_utils::LogFormat;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DaemonConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub ledger: LedgerNodeConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

/// Settings for `ballot ledger run`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerNodeConfig {
    #[serde(default = "default_bind")]
    pub bind: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Snapshot file loaded on start and written on shutdown.
    #[serde(default)]
    pub data_file: Option<PathBuf>,

    #[serde(flatten)]
    pub policy: LedgerConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    7077
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl Default for LedgerNodeConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            data_file: None,
            policy: LedgerConfig::default(),
        }
    }
}

impl DaemonConfig {
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }
}
