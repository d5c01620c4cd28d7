//! Change-driven file sync
//!
//! This module provides:
//! - **engine**: detect changed files, summarize, deliver, and commit
//! - **report**: per-run outcome and read-only status types

mod engine;
mod report;

pub use engine::{ChangeEvent, SyncEngine, SyncOptions, candidate_files, status};
pub use report::{FailedFile, FileState, StatusEntry, StatusReport, SyncReport, SyncedFile};
