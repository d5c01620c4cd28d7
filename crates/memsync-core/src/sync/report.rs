//! Reports produced by the sync engine

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A file whose change was delivered (or would be, in a dry run)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncedFile {
    pub path: PathBuf,
    pub summary: String,
}

/// A file whose change could not be delivered this run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedFile {
    pub path: PathBuf,
    pub error: String,
}

/// Outcome of one sync run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    /// True when nothing was sent or committed
    pub dry_run: bool,
    pub synced: Vec<SyncedFile>,
    pub failed: Vec<FailedFile>,
    /// Files whose content matched the ledger
    pub unchanged: usize,
    /// Files that vanished or could not be read
    pub skipped: usize,
}

impl SyncReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    /// True when every changed file was delivered
    pub fn success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Sync state of one candidate file relative to the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileState {
    /// Content matches the last committed digest
    Unchanged,
    /// Content differs from the last committed digest
    Changed,
    /// Never committed
    New,
}

/// One row of a status report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub path: PathBuf,
    pub state: FileState,
    pub last_summary: Option<String>,
}

/// Read-only view of every candidate file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    pub entries: Vec<StatusEntry>,
}

impl StatusReport {
    /// Entries in `state`
    pub fn count(&self, state: FileState) -> usize {
        self.entries.iter().filter(|e| e.state == state).count()
    }

    /// True when a sync would send nothing
    pub fn is_clean(&self) -> bool {
        self.entries.iter().all(|e| e.state == FileState::Unchanged)
    }
}
