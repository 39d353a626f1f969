//! Client configuration.

use serde::{Deserialize, Serialize};

use crate::endpoint::DEFAULT_SOCKET_PATH;
use crate::rpc::DEFAULT_TIMEOUT_MS;

/// Configuration for a [`TappdClient`](crate::TappdClient).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Daemon address: a socket path, `unix:<path>`, or `http://host:port`.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Per-call deadline in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl ClientConfig {
    /// Configuration from the environment, falling back to defaults.
    ///
    /// Honors `TAPPD_ENDPOINT` and `TAPPD_TIMEOUT_MS` (ignored if not a
    /// valid integer).
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(endpoint) = std::env::var("TAPPD_ENDPOINT") {
            if !endpoint.is_empty() {
                config.endpoint = endpoint;
            }
        }
        if let Some(timeout_ms) = std::env::var("TAPPD_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.timeout_ms = timeout_ms;
        }
        config
    }
}

fn default_endpoint() -> String {
    DEFAULT_SOCKET_PATH.to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.endpoint, "/var/run/tappd.sock");
        assert_eq!(config.timeout_ms, 30_000);
    }

    #[test]
    fn test_config_deserialization_fills_defaults() {
        let config: ClientConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.endpoint, "/var/run/tappd.sock");
        assert_eq!(config.timeout_ms, 30_000);

        let config: ClientConfig =
            serde_json::from_str(r#"{"endpoint":"http://localhost:8090"}"#).unwrap();
        assert_eq!(config.endpoint, "http://localhost:8090");
        assert_eq!(config.timeout_ms, 30_000);
    }

    #[test]
    fn test_config_round_trip() {
        let config = ClientConfig {
            endpoint: "unix:/tmp/tappd.sock".to_string(),
            timeout_ms: 5_000,
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: ClientConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.endpoint, config.endpoint);
        assert_eq!(back.timeout_ms, config.timeout_ms);
    }
}
