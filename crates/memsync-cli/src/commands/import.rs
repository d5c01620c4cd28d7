//! Import command implementation

use colored::Colorize;

use memsync_core::{HttpIngestor, ImportScope, Importer, MemsyncConfig};

use crate::error::Result;

/// Run the bulk import
pub fn run_import(config: &MemsyncConfig, scope: ImportScope) -> Result<()> {
    let ingestor = HttpIngestor::new(config)?;

    println!(
        "{} Importing memory into {} (group {})...",
        "=>".blue().bold(),
        ingestor.base_url().cyan(),
        config.group_id
    );

    let report = Importer::new(config, &ingestor).run(scope)?;

    for item in &report.items {
        match &item.error {
            None => println!("   {} {}", "✓".green(), item.source),
            Some(error) => println!("   {} {}: {}", "✗".red(), item.source, error.red()),
        }
    }

    println!();
    println!(
        "{} Imported {}, failed {}.",
        if report.success() {
            "OK".green().bold()
        } else {
            "WARN".yellow().bold()
        },
        report.imported,
        report.failed
    );

    Ok(())
}
