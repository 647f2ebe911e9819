//! ChainRelay CLI.
//!
//! # Commands
//! ```text
//! chainrelay run      [--config <path>]   connect, retrying every 20s until ready
//! chainrelay types    [--json]            print the Darwinia type table
//! chainrelay identity [--config <path>]   show which identities would be used
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd_identity;
mod cmd_run;
mod cmd_types;
mod config;
mod logging;
mod signal;

#[derive(Parser)]
#[command(
    name = "chainrelay",
    about = "Darwinia relay client bootstrap",
    long_about = "
Connects to a Darwinia node over WebSocket, registers the chain's custom
types, derives the relay signing identities, and keeps retrying until all
of that succeeds.

ENVIRONMENT VARIABLES:
  DARWINIA_RPC_SERVER   Node WebSocket endpoint (overrides rpc_server)
  KEYRING               Secret URI of the relay account; empty = dev alice
  CHAINRELAY_LOG        Log level (overrides [log] level)
",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bootstrap a relay session and hold it until interrupted
    Run {
        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the registered type table
    Types {
        /// Output as JSON in the polkadot-js `types` layout
        #[arg(long)]
        json: bool,
    },

    /// Show the primary and secondary identities without connecting
    Identity {
        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config } => cmd_run::run(config.as_deref()).await,
        Commands::Types { json } => cmd_types::run(json),
        Commands::Identity { config } => cmd_identity::run(config.as_deref()),
    }
}
