//! `chainrelay run` — bootstrap a session and hold it until a shutdown signal.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chainrelay_bootstrap::ConnectionSupervisor;
use chainrelay_rpc::{WsConfig, WsConnector};
use chainrelay_types::darwinia;

use crate::config::AppConfig;
use crate::logging;
use crate::signal;

pub async fn run(config: Option<&Path>) -> Result<()> {
    let config = AppConfig::load(config)?;
    logging::init_tracing(&config.log)?;

    // A broken table is a programming error: fail before any connection attempt.
    let registry = Arc::new(darwinia::registry().context("type registry failed validation")?);
    tracing::info!(types = registry.len(), "type registry built");

    let timeout = config.bootstrap.handshake_timeout();
    let connector = WsConnector::new(WsConfig {
        connect_timeout: timeout,
        request_timeout: timeout,
    });
    let supervisor = ConnectionSupervisor::new(config.bootstrap, registry, connector);
    let cancel = signal::shutdown_token().context("failed to install signal handlers")?;

    let ready = match supervisor.run(cancel.clone()).await {
        Ok(ready) => ready,
        Err(_) => return Ok(()),
    };

    println!("✓ Connected to {} ({})", ready.client.chain(), ready.client.url());
    println!(
        "  Runtime:   {} v{}",
        ready.client.runtime_version().spec_name,
        ready.client.runtime_version().spec_version
    );
    println!("  Genesis:   {}", ready.client.genesis_hash());
    println!("  Metadata:  V{}", ready.client.metadata_version());
    println!(
        "  Primary:   {} ({})",
        ready.identity.public_key_hex(),
        ready.identity.source()
    );
    println!(
        "  Secondary: {} ({})",
        ready.secondary_identity.public_key_hex(),
        ready.secondary_identity.source()
    );

    cancel.cancelled().await;
    tracing::info!("shutting down");
    Ok(())
}
