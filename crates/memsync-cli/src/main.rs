//! memsync CLI
//!
//! Watches an agent's memory files and forwards change summaries, bulk
//! imports, and session transcripts to a knowledge-graph ingestion endpoint.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;
use memsync_core::{ImportScope, MemsyncConfig};

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    let Some(command) = cli.command else {
        println!("{} Memory file sync", "memsync".green().bold());
        println!();
        println!("Run {} for available commands.", "memsync --help".cyan());
        return Ok(());
    };

    let mut config = MemsyncConfig::load(cli.config.as_deref())?;
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }
    tracing::debug!(endpoint = %config.endpoint, group_id = %config.group_id, "configuration resolved");

    match command {
        Commands::Sync { dry_run, json } => commands::run_sync(&config, dry_run, json),
        Commands::Status { json } => commands::run_status(&config, json),
        Commands::Import { only } => {
            commands::run_import(&config, only.map(ImportScope::from).unwrap_or_default())
        }
        Commands::Sessions => commands::run_sessions(&config),
    }
}
