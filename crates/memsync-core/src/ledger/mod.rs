//! Persisted sync state
//!
//! - [`HashLedger`]: content digest and last summary per watched path
//! - [`ContentStore`]: last-synced content per watched path, the diff baseline
//! - [`SessionLedger`]: ids of session messages already forwarded
//!
//! State files are JSON, written atomically under an exclusive lock. Loading
//! distinguishes "absent" (an empty default) from "present but unreadable"
//! (`Error::StateParse`); callers that must not fail use `load_or_default`,
//! which logs the fallback.

mod content_store;
mod session;

pub use content_store::ContentStore;
pub use session::SessionLedger;

use std::collections::BTreeMap;
use std::path::Path;

use memsync_content::truncate_chars;
use memsync_fs::compute_content_checksum;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Characters of a summary kept in the ledger
pub const PERSISTED_SUMMARY_CHARS: usize = 200;

const LEDGER_VERSION: &str = "1.0";

/// Read a JSON state file; a missing file yields `T::default()`.
pub(crate) fn read_state<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    let content = match memsync_fs::io::read_text(path) {
        Ok(content) => content,
        Err(e) if e.is_not_found() => return Ok(T::default()),
        Err(e) => return Err(e.into()),
    };
    serde_json::from_str(&content).map_err(|e| Error::StateParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Read a JSON state file, falling back to `T::default()` with a warning.
pub(crate) fn read_state_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    match read_state(path) {
        Ok(state) => state,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "state unreadable, starting fresh");
            T::default()
        }
    }
}

/// Write a JSON state file atomically.
pub(crate) fn write_state<T: Serialize>(path: &Path, state: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(state)?;
    memsync_fs::io::write_atomic(path, content.as_bytes())?;
    Ok(())
}

fn default_version() -> String {
    LEDGER_VERSION.to_string()
}

fn ledger_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Digest of the last successfully synced content of every watched path
///
/// Entries are only written through [`HashLedger::commit`], which the sync
/// driver calls after the ingestion endpoint accepted the change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HashLedger {
    /// Ledger format version for forward compatibility
    #[serde(default = "default_version")]
    version: String,
    #[serde(default)]
    file_hashes: BTreeMap<String, String>,
    #[serde(default)]
    last_summaries: BTreeMap<String, String>,
}

impl Default for HashLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl HashLedger {
    /// Create a new empty ledger
    pub fn new() -> Self {
        Self {
            version: default_version(),
            file_hashes: BTreeMap::new(),
            last_summaries: BTreeMap::new(),
        }
    }

    /// Load a ledger; a missing file is an empty ledger.
    ///
    /// # Errors
    ///
    /// Returns `Error::StateParse` if the file exists but is not a ledger.
    pub fn load(path: &Path) -> Result<Self> {
        read_state(path)
    }

    /// Load a ledger, treating any failure as an empty ledger.
    pub fn load_or_default(path: &Path) -> Self {
        read_state_or_default(path)
    }

    /// Save the ledger atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        write_state(path, self)
    }

    /// Whether `current` differs from the last committed content of `path`.
    ///
    /// True when `path` was never committed. Does not modify the ledger.
    pub fn has_changed(&self, path: &Path, current: &[u8]) -> bool {
        let digest = compute_content_checksum(current);
        self.file_hashes.get(&ledger_key(path)) != Some(&digest)
    }

    /// Digest recorded for `path`, if any
    pub fn digest_for(&self, path: &Path) -> Option<&str> {
        self.file_hashes.get(&ledger_key(path)).map(String::as_str)
    }

    /// Last summary sent for `path`, if any
    pub fn last_summary(&self, path: &Path) -> Option<&str> {
        self.last_summaries.get(&ledger_key(path)).map(String::as_str)
    }

    /// Record that `digest` was delivered for `path` with `summary`.
    pub fn commit(&mut self, path: &Path, digest: impl Into<String>, summary: &str) {
        let key = ledger_key(path);
        self.file_hashes.insert(key.clone(), digest.into());
        self.last_summaries.insert(
            key,
            truncate_chars(summary, PERSISTED_SUMMARY_CHARS).to_string(),
        );
    }

    /// Number of tracked paths
    pub fn len(&self) -> usize {
        self.file_hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.file_hashes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ledger_new_has_correct_version() {
        let ledger = HashLedger::new();
        assert_eq!(ledger.version, "1.0");
        assert!(ledger.is_empty());
    }

    #[test]
    fn unknown_path_has_changed() {
        let ledger = HashLedger::new();
        assert!(ledger.has_changed(Path::new("/w/MEMORY.md"), b"anything"));
    }

    #[test]
    fn has_changed_does_not_commit() {
        let ledger = HashLedger::new();
        let path = Path::new("/w/MEMORY.md");
        assert!(ledger.has_changed(path, b"v1"));
        assert!(ledger.has_changed(path, b"v1"));
        assert_eq!(ledger.digest_for(path), None);
    }

    #[test]
    fn committed_content_is_unchanged() {
        let mut ledger = HashLedger::new();
        let path = Path::new("/w/MEMORY.md");
        ledger.commit(path, compute_content_checksum(b"v1"), "File updated: MEMORY.md");

        assert!(!ledger.has_changed(path, b"v1"));
        assert!(ledger.has_changed(path, b"v2"));
        assert_eq!(ledger.last_summary(path), Some("File updated: MEMORY.md"));
    }

    #[test]
    fn persisted_summary_is_truncated() {
        let mut ledger = HashLedger::new();
        let path = Path::new("/w/USER.md");
        let long = "é".repeat(500);
        ledger.commit(path, "sha256:00", &long);
        assert_eq!(ledger.last_summary(path).unwrap().chars().count(), 200);
    }

    #[test]
    fn ledger_save_is_atomic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file-hashes.json");

        let mut ledger = HashLedger::new();
        ledger.commit(Path::new("/w/MEMORY.md"), "sha256:abc", "summary");
        ledger.save(&path).unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty(), "Temporary file should be cleaned up");

        let loaded = HashLedger::load(&path).unwrap();
        assert_eq!(loaded, ledger);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"version\": \"1.0\""));
        assert!(raw.contains("file_hashes"));
    }

    #[test]
    fn unversioned_ledger_still_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file-hashes.json");
        std::fs::write(
            &path,
            r#"{"file_hashes": {"/w/MEMORY.md": "sha256:01"}, "last_summaries": {}}"#,
        )
        .unwrap();

        let ledger = HashLedger::load(&path).unwrap();
        assert_eq!(ledger.version, "1.0");
        assert_eq!(ledger.digest_for(Path::new("/w/MEMORY.md")), Some("sha256:01"));
    }

    #[test]
    fn missing_ledger_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = HashLedger::load(&dir.path().join("absent.json")).unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn corrupt_ledger_is_parse_error_and_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file-hashes.json");
        std::fs::write(&path, "{ this is not json").unwrap();

        assert!(matches!(HashLedger::load(&path), Err(Error::StateParse { .. })));
        assert!(HashLedger::load_or_default(&path).is_empty());
    }
}
