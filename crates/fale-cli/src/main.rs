//! # fale
//!
//! Terminal front end for Fale Com Jesus. Every subcommand runs against the
//! same persisted session, so `fale login` once and the rest of the commands
//! pick the tokens up from the local settings database.

mod cli;
mod commands;
mod repl;

use clap::Parser;
use tracing::info;

use fale_client::{AppContext, ClientConfig};

use crate::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    fale_client::init_tracing();

    let cli = Cli::parse();

    // -----------------------------------------------------------------------
    // 2. Load configuration, flags over environment
    // -----------------------------------------------------------------------
    let mut config = ClientConfig::from_env();
    if let Some(url) = cli.api_url.as_deref() {
        config = config.with_api_url(url);
    }
    if let Some(dir) = cli.data_dir.clone() {
        config = config.with_data_dir(dir);
    }
    info!(api_url = %config.api_url, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Open local state and restore the session
    // -----------------------------------------------------------------------
    let ctx = AppContext::initialize(config).await?;

    // -----------------------------------------------------------------------
    // 4. Run the command
    // -----------------------------------------------------------------------
    commands::run(&ctx, cli.command).await
}
