//! `chainrelay types` — print the Darwinia type table.

use anyhow::{Context, Result};
use chainrelay_types::darwinia;

pub fn run(json: bool) -> Result<()> {
    let registry = darwinia::registry().context("type registry failed validation")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&registry.to_type_definitions())?);
        return Ok(());
    }

    let width = registry.iter().map(|d| d.name.len()).max().unwrap_or(0);
    for desc in registry.iter() {
        println!(
            "{:<width$}  {:<11}  {}",
            desc.name,
            desc.shape.kind(),
            desc.shape
        );
    }
    println!("\n{} types", registry.len());
    Ok(())
}
