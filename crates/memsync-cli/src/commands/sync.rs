//! Sync command implementation
//!
//! Sends a summary of every changed memory file to the ingestion endpoint.

use std::path::Path;

use colored::Colorize;
use serde_json::json;

use memsync_core::{HttpIngestor, MemsyncConfig, SyncEngine, SyncOptions, SyncReport};

use crate::error::Result;

/// Path shown to the user: relative to the workspace when possible
pub(crate) fn display_path<'a>(config: &MemsyncConfig, path: &'a Path) -> std::borrow::Cow<'a, str> {
    path.strip_prefix(&config.workspace_dir)
        .unwrap_or(path)
        .to_string_lossy()
}

/// Run the sync command
pub fn run_sync(config: &MemsyncConfig, dry_run: bool, json: bool) -> Result<()> {
    let ingestor = HttpIngestor::new(config)?;
    let engine = SyncEngine::new(config, &ingestor);

    if !json {
        let verb = if dry_run { "Checking" } else { "Syncing" };
        println!(
            "{} {} memory files to {}...",
            "=>".blue().bold(),
            verb,
            ingestor.base_url().cyan()
        );
    }

    let report = engine.run(&SyncOptions { dry_run })?;

    if json {
        let output = json!({
            "dry_run": report.dry_run,
            "synced": report.synced,
            "failed": report.failed,
            "unchanged": report.unchanged,
            "skipped": report.skipped,
            "success": report.success(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_report(config, &report);
    }

    Ok(())
}

fn print_report(config: &MemsyncConfig, report: &SyncReport) {
    if report.synced.is_empty() && report.failed.is_empty() {
        println!("{} No changes since last sync.", "OK".green().bold());
        return;
    }

    for file in &report.synced {
        let headline = file.summary.lines().next().unwrap_or_default();
        println!(
            "   {} {}: {}",
            "✓".green(),
            display_path(config, &file.path).cyan(),
            headline
        );
    }
    for file in &report.failed {
        println!(
            "   {} {}: {}",
            "✗".red(),
            display_path(config, &file.path).cyan(),
            file.error.red()
        );
    }

    println!();
    if report.dry_run {
        println!(
            "{} {} files would be synced (dry run).",
            "DRY-RUN".yellow().bold(),
            report.synced.len()
        );
    } else if report.success() {
        println!("{} Synced {} files.", "OK".green().bold(), report.synced.len());
    } else {
        println!(
            "{} Synced {} files, {} failed; failed files are retried on the next run.",
            "WARN".yellow().bold(),
            report.synced.len(),
            report.failed.len()
        );
    }
}
