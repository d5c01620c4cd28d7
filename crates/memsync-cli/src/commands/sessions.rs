//! Sessions command implementation

use colored::Colorize;

use memsync_core::{HttpIngestor, MemsyncConfig, SessionSyncer};

use crate::error::Result;

/// Forward new session transcript messages
pub fn run_sessions(config: &MemsyncConfig) -> Result<()> {
    let ingestor = HttpIngestor::new(config)?;
    let report = SessionSyncer::new(config, &ingestor).run()?;

    if report.sent == 0 && report.failed == 0 {
        println!("{} No new session messages.", "OK".green().bold());
        return Ok(());
    }

    println!(
        "{} Sent {} messages from {} transcripts.",
        "✓".green(),
        report.sent,
        report.files_scanned
    );
    if report.failed > 0 {
        println!("{} {} messages failed; retried next run.", "✗".red(), report.failed);
    }
    if report.capped {
        println!(
            "{} Reached the limit of {} messages; run again to continue.",
            "!".yellow(),
            config.max_messages_per_run
        );
    }

    Ok(())
}
