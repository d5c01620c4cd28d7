//! Core orchestration layer for memsync
//!
//! This crate ties the content and filesystem layers to the ingestion
//! endpoint, implementing:
//!
//! - **Configuration**: a single explicit [`MemsyncConfig`] resolved from defaults, file, and environment
//! - **Ledgers**: content digests, cached baselines, and forwarded session message ids
//! - **SyncEngine**: detect, summarize, deliver, and commit changed memory files
//! - **Importer**: one-shot bulk import of logs, project docs, and identity files
//! - **SessionSyncer**: incremental forwarding of agent session transcripts
//!
//! # Architecture
//!
//! ```text
//!                 memsync-cli
//!                      |
//!                 memsync-core
//!                      |
//!          +-----------+-----------+
//!          |                       |
//!     memsync-fs            memsync-content
//! ```
//!
//! # Example
//!
//! ```ignore
//! use memsync_core::{HttpIngestor, MemsyncConfig, SyncEngine, SyncOptions};
//!
//! let config = MemsyncConfig::load(None)?;
//! let ingestor = HttpIngestor::new(&config)?;
//! let report = SyncEngine::new(&config, &ingestor).run(&SyncOptions::default())?;
//! println!("{} files synced", report.synced.len());
//! ```

pub mod config;
pub mod error;
pub mod import;
pub mod ingest;
pub mod ledger;
mod scan;
pub mod sessions;
pub mod sync;

pub use config::{MemsyncConfig, WatchedFile};
pub use error::{Error, Result};
pub use import::{ImportItem, ImportReport, ImportScope, Importer};
pub use ingest::{Episode, EpisodeBatch, HttpIngestor, Ingestor, MemoryIngestor, RoleType};
pub use ledger::{ContentStore, HashLedger, SessionLedger};
pub use sessions::{SessionReport, SessionSyncer};
pub use sync::{
    ChangeEvent, FailedFile, FileState, StatusEntry, StatusReport, SyncEngine, SyncOptions,
    SyncReport, SyncedFile,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn endpoint_unavailable_displays_url() {
        let error = Error::EndpointUnavailable {
            url: "http://localhost:8001/healthcheck".to_string(),
            reason: "connection refused".to_string(),
        };
        let display = error.to_string();
        assert!(display.contains("http://localhost:8001/healthcheck"));
        assert!(display.contains("connection refused"));
    }

    #[test]
    fn state_parse_displays_path() {
        let error = Error::StateParse {
            path: PathBuf::from("/state/file-hashes.json"),
            message: "expected value".to_string(),
        };
        assert!(error.to_string().contains("/state/file-hashes.json"));
    }

    #[test]
    fn fs_error_converts() {
        let fs_error = memsync_fs::Error::LockFailed {
            path: PathBuf::from("/state/file-hashes.json"),
        };
        let error: Error = fs_error.into();
        assert!(matches!(error, Error::Fs(_)));
    }
}
