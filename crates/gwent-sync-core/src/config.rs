//! Relay endpoint configuration.

use serde::{Deserialize, Serialize};

use crate::SessionId;

/// Environment variable overriding the URL scheme.
pub const SCHEME_ENV: &str = "GWENT_RELAY_SCHEME";
/// Environment variable overriding `host[:port]`.
pub const HOST_ENV: &str = "GWENT_RELAY_HOST";

/// Where the relay lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// `ws` or `wss`.
    pub scheme: String,
    /// `host[:port]`.
    pub host: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            scheme: "ws".to_string(),
            host: "localhost:8080".to_string(),
        }
    }
}

impl RelayConfig {
    /// Create a config for the given scheme and host.
    #[must_use]
    pub fn new(scheme: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
        }
    }

    /// Defaults overridden by `GWENT_RELAY_SCHEME` / `GWENT_RELAY_HOST`.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(scheme) = std::env::var(SCHEME_ENV) {
            config.scheme = scheme;
        }
        if let Ok(host) = std::env::var(HOST_ENV) {
            config.host = host;
        }
        config
    }

    /// Game socket URL: `<scheme>://<host>/ws/game/<session>?token=<token>`.
    #[must_use]
    pub fn game_url(&self, session_id: SessionId, token: &str) -> String {
        format!(
            "{}://{}/ws/game/{}?token={}",
            self.scheme, self.host, session_id, token
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_game_url() {
        let url = RelayConfig::default().game_url(SessionId(12), "abc.def");
        assert_eq!(url, "ws://localhost:8080/ws/game/12?token=abc.def");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: RelayConfig = serde_json::from_str(r#"{"host":"relay.example:9000"}"#).unwrap();
        assert_eq!(config.scheme, "ws");
        assert_eq!(config.host, "relay.example:9000");
    }
}
