//! Bootstrap configuration.
//!
//! Loaded from TOML, then overridden from the environment:
//!
//! ```toml
//! rpc_server = "wss://crab-rpc.darwinia.network"
//! keyring = ""                  # empty = dev account "alice"
//! retry_delay_secs = 20
//! handshake_timeout_secs = 30
//! expected_spec_name = "Crab"
//! ```

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Environment variable overriding `rpc_server`.
pub const RPC_SERVER_ENV: &str = "DARWINIA_RPC_SERVER";
/// Environment variable overriding `keyring`.
pub const KEYRING_ENV: &str = "KEYRING";

pub const DEFAULT_RPC_SERVER: &str = "ws://127.0.0.1:9944";
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 20;
pub const DEFAULT_HANDSHAKE_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid rpc_server '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("rpc_server '{url}' must use ws:// or wss://, got {scheme}://")]
    UnsupportedScheme { url: String, scheme: String },

    #[error("{key} must be greater than zero")]
    ZeroDuration { key: &'static str },
}

/// Keyring secret URI. Never printed.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// True only for the empty string. A whitespace-only value is a
    /// configured (and invalid) secret, not a request for the dev account.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("Secret(<empty>)")
        } else {
            f.write_str("Secret(<redacted>)")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Node WebSocket endpoint.
    #[serde(default = "default_rpc_server")]
    pub rpc_server: String,
    /// Secret URI for the primary identity (mnemonic with optional
    /// `//hard`, `/soft` junctions and `///password`).
    #[serde(default)]
    pub keyring: Secret,
    /// Fixed pause between failed attempts.
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
    /// Upper bound on opening the transport, and separately on the handshake.
    #[serde(default = "default_handshake_timeout_secs")]
    pub handshake_timeout_secs: u64,
    /// When set, the node's runtime `specName` must match.
    #[serde(default)]
    pub expected_spec_name: Option<String>,
}

fn default_rpc_server() -> String {
    DEFAULT_RPC_SERVER.to_string()
}
fn default_retry_delay_secs() -> u64 {
    DEFAULT_RETRY_DELAY_SECS
}
fn default_handshake_timeout_secs() -> u64 {
    DEFAULT_HANDSHAKE_TIMEOUT_SECS
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            rpc_server: default_rpc_server(),
            keyring: Secret::default(),
            retry_delay_secs: DEFAULT_RETRY_DELAY_SECS,
            handshake_timeout_secs: DEFAULT_HANDSHAKE_TIMEOUT_SECS,
            expected_spec_name: None,
        }
    }
}

impl BootstrapConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Apply `DARWINIA_RPC_SERVER` and `KEYRING` from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`. A variable that is present wins over the
    /// file, even when empty for `KEYRING`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(RPC_SERVER_ENV).filter(|u| !u.trim().is_empty()) {
            self.rpc_server = url.trim().to_string();
        }
        if let Some(secret) = lookup(KEYRING_ENV) {
            self.keyring = Secret::new(secret);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.rpc_server).map_err(|e| ConfigError::InvalidUrl {
            url: self.rpc_server.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(ConfigError::UnsupportedScheme {
                url: self.rpc_server.clone(),
                scheme: url.scheme().to_string(),
            });
        }
        if self.retry_delay_secs == 0 {
            return Err(ConfigError::ZeroDuration {
                key: "retry_delay_secs",
            });
        }
        if self.handshake_timeout_secs == 0 {
            return Err(ConfigError::ZeroDuration {
                key: "handshake_timeout_secs",
            });
        }
        Ok(())
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_secs(self.handshake_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = BootstrapConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, BootstrapConfig::default());
        assert_eq!(cfg.retry_delay(), Duration::from_secs(20));
        assert_eq!(cfg.handshake_timeout(), Duration::from_secs(30));
        assert!(cfg.keyring.is_empty());
        cfg.validate().unwrap();
    }

    #[test]
    fn file_values_are_read() {
        let cfg = BootstrapConfig::from_toml_str(
            r#"
            rpc_server = "wss://crab-rpc.darwinia.network"
            keyring = "//Charlie"
            retry_delay_secs = 5
            expected_spec_name = "Crab"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.rpc_server, "wss://crab-rpc.darwinia.network");
        assert_eq!(cfg.keyring.expose(), "//Charlie");
        assert_eq!(cfg.retry_delay_secs, 5);
        assert_eq!(cfg.handshake_timeout_secs, 30);
        assert_eq!(cfg.expected_spec_name.as_deref(), Some("Crab"));
    }

    #[test]
    fn env_overrides_file() {
        let mut cfg = BootstrapConfig::from_toml_str(r#"keyring = "//Dave""#).unwrap();
        cfg.apply_overrides(|key| match key {
            RPC_SERVER_ENV => Some("wss://node.example:443".into()),
            KEYRING_ENV => Some(String::new()),
            _ => None,
        });
        assert_eq!(cfg.rpc_server, "wss://node.example:443");
        assert!(cfg.keyring.is_empty());
    }

    #[test]
    fn absent_env_keeps_file_values() {
        let mut cfg = BootstrapConfig::from_toml_str(r#"keyring = "//Dave""#).unwrap();
        cfg.apply_overrides(|_| None);
        assert_eq!(cfg.keyring.expose(), "//Dave");
        assert_eq!(cfg.rpc_server, DEFAULT_RPC_SERVER);
    }

    #[test]
    fn secret_is_redacted() {
        let cfg = BootstrapConfig {
            keyring: Secret::new("bottom drive obey lake curtain smoke basket hold race lonely fit walk"),
            ..Default::default()
        };
        let printed = format!("{cfg:?}");
        assert!(printed.contains("<redacted>"));
        assert!(!printed.contains("bottom"));
    }

    #[test]
    fn whitespace_keyring_is_not_empty() {
        let secret = Secret::new("  \t");
        assert!(!secret.is_empty());
        assert!(secret.is_blank());
        assert_eq!(format!("{secret:?}"), "Secret(<redacted>)");
    }

    #[test]
    fn rejects_http_endpoint_and_zero_delay() {
        let cfg = BootstrapConfig {
            rpc_server: "https://crab-rpc.darwinia.network".into(),
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::UnsupportedScheme { .. })
        ));

        let cfg = BootstrapConfig {
            retry_delay_secs: 0,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::ZeroDuration {
                key: "retry_delay_secs"
            })
        ));

        let cfg = BootstrapConfig {
            rpc_server: "not a url".into(),
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidUrl { .. })));
    }
}
