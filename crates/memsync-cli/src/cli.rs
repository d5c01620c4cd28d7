//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use memsync_core::ImportScope;

/// memsync - Summarize memory file changes into a knowledge graph
#[derive(Parser, Debug)]
#[command(name = "memsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: <config_dir>/memsync/config.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Ingestion endpoint base URL, overriding config and GRAPHITI_URL
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Summarize changed memory files and send them to the endpoint
    Sync {
        /// Show what would be sent without sending or recording anything
        #[arg(long)]
        dry_run: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show which memory files have changed since the last sync
    Status {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Bulk import daily logs, project docs, and identity files
    ///
    /// Examples:
    ///   memsync import                 # Everything
    ///   memsync import --only logs     # Daily logs only
    Import {
        /// Restrict the import to one source
        #[arg(long, value_enum)]
        only: Option<ImportSource>,
    },

    /// Forward new messages from recent agent session transcripts
    Sessions,
}

/// Sources selectable with `import --only`
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportSource {
    Logs,
    Projects,
    Identity,
}

impl From<ImportSource> for ImportScope {
    fn from(source: ImportSource) -> Self {
        match source {
            ImportSource::Logs => ImportScope::Logs,
            ImportSource::Projects => ImportScope::Projects,
            ImportSource::Identity => ImportScope::Identity,
        }
    }
}
