//! Client configuration with TOML file support.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// How the client reaches the ledger and who it acts as.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// JSON-RPC endpoint of the ledger node.
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Account used to sign writes. Without one, only reads are possible.
    #[serde(default)]
    pub wallet_address: Option<String>,

    /// When set, only this identity may start or close proposals.
    #[serde(default)]
    pub admin_address: Option<String>,

    /// Endpoint of the configuration-string assistant. The offline template
    /// is used when unset.
    #[serde(default)]
    pub assistant_url: Option<String>,

    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

fn default_rpc_url() -> String {
    "http://127.0.0.1:7077".to_string()
}

fn default_poll_interval_secs() -> u64 {
    5
}

impl ClientConfig {
    pub fn from_toml_file(path: &str) -> ClientResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ClientError::Config(format!("{path}: {e}")))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> ClientResult<Self> {
        toml::from_str(s).map_err(|e| ClientError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> ClientResult<String> {
        toml::to_string_pretty(self).map_err(|e| ClientError::Config(e.to_string()))
    }

    /// Polling interval, never shorter than one second.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            wallet_address: None,
            admin_address: None,
            assistant_url: None,
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = ClientConfig::from_toml_str("").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
    }

    #[test]
    fn partial_toml_overrides_fields() {
        let config = ClientConfig::from_toml_str(
            r#"
            rpc_url = "http://ledger.local:9000"
            wallet_address = "0x00000000000000000000000000000000000000aa"
            poll_interval_secs = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.rpc_url, "http://ledger.local:9000");
        assert!(config.wallet_address.is_some());
        assert!(config.admin_address.is_none());
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
    }

    #[test]
    fn round_trips_through_toml() {
        let config = ClientConfig {
            admin_address: Some("0x00000000000000000000000000000000000000ad".into()),
            ..ClientConfig::default()
        };
        let parsed = ClientConfig::from_toml_str(&config.to_toml_string().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        assert!(matches!(
            ClientConfig::from_toml_str("poll_interval_secs = \"soon\""),
            Err(ClientError::Config(_))
        ));
    }
}
