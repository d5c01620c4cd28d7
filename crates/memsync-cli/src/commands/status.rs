//! Status command implementation

use colored::Colorize;
use serde_json::json;

use memsync_core::sync::status;
use memsync_core::{FileState, MemsyncConfig};

use super::sync::display_path;
use crate::error::Result;

/// Run the status command
///
/// Reads the ledger only; the endpoint is never contacted.
pub fn run_status(config: &MemsyncConfig, json: bool) -> Result<()> {
    let report = status(config);

    if json {
        let output = json!({
            "clean": report.is_clean(),
            "new": report.count(FileState::New),
            "changed": report.count(FileState::Changed),
            "unchanged": report.count(FileState::Unchanged),
            "files": report.entries,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", "Memory Sync Status".bold());
    println!();
    println!("{}:  {}", "Workspace".dimmed(), config.workspace_dir.display());
    println!("{}:   {}", "Endpoint".dimmed(), config.endpoint.cyan());
    println!("{}:      {}", "Group".dimmed(), config.group_id);
    println!();

    if report.entries.is_empty() {
        println!("  {} (no watched files found)", "None".dimmed());
        return Ok(());
    }

    for entry in &report.entries {
        let state = match entry.state {
            FileState::Unchanged => "unchanged".green(),
            FileState::Changed => "changed".yellow(),
            FileState::New => "new".cyan(),
        };
        println!("  {} ({})", display_path(config, &entry.path), state);
        if let Some(summary) = &entry.last_summary {
            let headline = summary.lines().next().unwrap_or_default();
            println!("      {}", headline.dimmed());
        }
    }

    println!();
    if report.is_clean() {
        println!("{} Everything is synced.", "OK".green().bold());
    } else {
        println!(
            "{} {} new, {} changed. Run {} to send them.",
            "PENDING".yellow().bold(),
            report.count(FileState::New),
            report.count(FileState::Changed),
            "memsync sync".cyan()
        );
    }

    Ok(())
}
