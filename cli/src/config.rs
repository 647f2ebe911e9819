//! Config file loading for the CLI.
//!
//! The file is the bootstrap config with an optional `[log]` table:
//!
//! ```toml
//! rpc_server = "wss://crab-rpc.darwinia.network"
//! keyring = ""            # or set KEYRING; empty = dev account alice
//!
//! [log]
//! level = "info"
//! json = false
//! components = { chainrelay-rpc = "debug" }
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use chainrelay_bootstrap::BootstrapConfig;
use serde::Deserialize;

use crate::logging::LogConfig;

/// Environment variable overriding `[log] level`.
pub const LOG_ENV: &str = "CHAINRELAY_LOG";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(flatten)]
    pub bootstrap: BootstrapConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl AppConfig {
    /// Load `path` (if any) and `.env`, apply environment overrides and validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        // a missing .env is normal
        let _ = dotenvy::dotenv();

        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file '{}'", path.display()))?;
                Self::from_toml_str(&content)
                    .with_context(|| format!("failed to parse config file '{}'", path.display()))?
            }
            None => Self::default(),
        };

        config.bootstrap.apply_env();
        if let Ok(level) = std::env::var(LOG_ENV) {
            config.log.level = level;
        }
        config.bootstrap.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }
}
