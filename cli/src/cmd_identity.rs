//! `chainrelay identity` — show the identities a session would sign with.

use std::path::Path;

use anyhow::Result;
use chainrelay_bootstrap::identity;

use crate::config::AppConfig;

pub fn run(config: Option<&Path>) -> Result<()> {
    let config = AppConfig::load(config)?;

    let primary = identity::derive_primary(&config.bootstrap.keyring)?;
    let secondary = identity::secondary();

    println!("Primary:   {} ({})", primary.public_key_hex(), primary.source());
    println!("Secondary: {} ({})", secondary.public_key_hex(), secondary.source());
    if primary.source().is_dev() {
        println!("\n⚠ KEYRING is empty: the primary identity is the public dev account alice");
    }
    Ok(())
}
