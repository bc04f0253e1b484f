//! Client configuration with TOML file support.

use factfund_types::{E8s, FundError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration for a FactFund client.
///
/// Can be loaded from a TOML file via [`ClientConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the backend actor gateway.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Base URL of the ledger index gateway.
    #[serde(default = "default_ledger_url")]
    pub ledger_url: String,

    /// Whole-request timeout applied by the HTTP transports.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Connection timeout applied by the HTTP transports.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Wait after a transfer before re-querying the ledger.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// `max_results` for transaction history queries.
    #[serde(default = "default_history_limit")]
    pub history_limit: u64,

    /// Available balance required to create a proposal.
    #[serde(default = "default_proposal_fee")]
    pub proposal_fee_e8s: E8s,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_backend_url() -> String {
    "http://127.0.0.1:4943/backend".to_string()
}

fn default_ledger_url() -> String {
    "http://127.0.0.1:4943/index".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_settle_delay_ms() -> u64 {
    2_000
}

fn default_history_limit() -> u64 {
    100
}

fn default_proposal_fee() -> E8s {
    E8s::from_tokens(1)
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "human".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ClientConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, FundError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| FundError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, FundError> {
        toml::from_str(s).map_err(|e| FundError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, FundError> {
        toml::to_string_pretty(self).map_err(|e| FundError::Config(e.to_string()))
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            ledger_url: default_ledger_url(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            settle_delay_ms: default_settle_delay_ms(),
            history_limit: default_history_limit(),
            proposal_fee_e8s: default_proposal_fee(),
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = ClientConfig::default();
        let toml_str = config.to_toml_string().expect("serializable");
        let parsed = ClientConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = ClientConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.settle_delay(), Duration::from_secs(2));
        assert_eq!(config.history_limit, 100);
        assert_eq!(config.proposal_fee_e8s, E8s::new(100_000_000));
        assert_eq!(config.log_format, "human");
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            backend_url = "https://gateway.example/backend"
            settle_delay_ms = 0
            proposal_fee_e8s = 25000000
        "#;
        let config = ClientConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.backend_url, "https://gateway.example/backend");
        assert_eq!(config.settle_delay(), Duration::ZERO);
        assert_eq!(config.proposal_fee_e8s, E8s::new(25_000_000));
        assert_eq!(config.request_timeout(), Duration::from_secs(30)); // default
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("factfund.toml");
        std::fs::write(&path, "history_limit = 25\nlog_format = \"json\"\n").unwrap();

        let config = ClientConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.history_limit, 25);
        assert_eq!(config.log_format, "json");
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = ClientConfig::from_toml_file(Path::new("/nonexistent/factfund.toml"));
        assert!(matches!(result, Err(FundError::Config(_))));
    }

    #[test]
    fn malformed_toml_returns_config_error() {
        let result = ClientConfig::from_toml_str("settle_delay_ms = \"soon\"");
        assert!(matches!(result, Err(FundError::Config(_))));
    }
}
