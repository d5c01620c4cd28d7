//! SyncEngine implementation
//!
//! Each candidate file moves through
//! `UNCHANGED -> CHANGED -> SUMMARIZED -> COMMITTED`. The ledger digest and
//! the cached baseline are only updated once the ingestion endpoint accepted
//! the summary; a failed send leaves the file `SUMMARIZED` so the next run
//! retries the same change.

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use memsync_content::summarize_change;
use memsync_fs::{compute_content_checksum, io};
use serde_json::json;

use crate::Result;
use crate::config::MemsyncConfig;
use crate::ingest::{Episode, EpisodeBatch, Ingestor, format_timestamp};
use crate::ledger::{ContentStore, HashLedger};
use crate::scan;

use super::report::{FailedFile, FileState, StatusEntry, StatusReport, SyncReport, SyncedFile};

/// Speaker name for file-change episodes
const FILE_UPDATE_ROLE: &str = "FileUpdate";

/// Options for a sync run
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// If true, summarize changes without sending or committing anything.
    pub dry_run: bool,
}

/// A detected change, consumed immediately by the summarizer
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub path: PathBuf,
    /// Digest of `new_content`, committed on successful delivery
    pub digest: String,
    /// Cached baseline; empty on first observation
    pub old_content: String,
    pub new_content: String,
    /// File modification time, the semantic timestamp of the change
    pub detected_at: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn file_name(&self) -> String {
        display_name(&self.path)
    }

    /// Summary text for this change
    pub fn summary(&self) -> String {
        summarize_change(&self.old_content, &self.new_content, &self.file_name())
    }

    /// Episode carrying `summary`
    pub fn episode(&self, summary: &str) -> Episode {
        let name = self.file_name();
        Episode::system(FILE_UPDATE_ROLE, summary, format_timestamp(self.detected_at))
            .with_source(format!("file-update:{}", name))
            .with_metadata(json!({
                "file": name,
                "type": "file-change-summary",
                "lines": self.new_content.lines().count(),
            }))
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Engine for syncing watched files into the ingestion endpoint
///
/// The SyncEngine provides two operations:
/// - **run**: detect, summarize, deliver, and commit every changed file
/// - **status**: report which files would be sent, without contacting the endpoint
pub struct SyncEngine<'a> {
    config: &'a MemsyncConfig,
    ingestor: &'a dyn Ingestor,
    contents: ContentStore,
}

impl<'a> SyncEngine<'a> {
    pub fn new(config: &'a MemsyncConfig, ingestor: &'a dyn Ingestor) -> Self {
        Self {
            config,
            ingestor,
            contents: ContentStore::new(config.content_cache_dir()),
        }
    }

    /// Every file a run considers, in processing order.
    pub fn candidates(&self) -> Vec<PathBuf> {
        candidate_files(self.config)
    }

    /// Compare `path` against the ledger.
    ///
    /// Returns `Ok(None)` when unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn detect_change(&self, path: &Path, ledger: &HashLedger) -> Result<Option<ChangeEvent>> {
        let bytes = io::read_bytes(path)?;
        if !ledger.has_changed(path, &bytes) {
            return Ok(None);
        }

        let detected_at = io::modified_utc(path).unwrap_or_else(|_| Utc::now());
        Ok(Some(ChangeEvent {
            path: path.to_path_buf(),
            digest: compute_content_checksum(&bytes),
            old_content: self.contents.get_previous(path),
            new_content: String::from_utf8_lossy(&bytes).into_owned(),
            detected_at,
        }))
    }

    /// Run one sync pass.
    ///
    /// # Errors
    ///
    /// Returns `Error::EndpointUnavailable` if the health check fails (not
    /// checked in a dry run), or an error if the ledger cannot be saved at the
    /// end of the run.
    /// Individual file failures are recorded in the report instead.
    pub fn run(&self, options: &SyncOptions) -> Result<SyncReport> {
        if !options.dry_run {
            self.ingestor.health_check()?;
        }

        let ledger_path = self.config.ledger_path();
        let mut ledger = HashLedger::load_or_default(&ledger_path);
        let mut report = SyncReport::new(options.dry_run);
        let delay = Duration::from_millis(self.config.send_delay_ms);
        let mut sent_any = false;

        for path in self.candidates() {
            let change = match self.detect_change(&path, &ledger) {
                Ok(Some(change)) => change,
                Ok(None) => {
                    report.unchanged += 1;
                    continue;
                }
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "skipping unreadable file");
                    report.skipped += 1;
                    continue;
                }
            };

            if options.dry_run {
                report.synced.push(SyncedFile {
                    path,
                    summary: change.summary(),
                });
                continue;
            }

            if sent_any && !delay.is_zero() {
                thread::sleep(delay);
            }
            sent_any = true;

            match self.deliver(&change, &mut ledger) {
                Ok(summary) => {
                    if let Err(e) = ledger.save(&ledger_path) {
                        tracing::warn!(error = %e, "failed to persist ledger after commit");
                    }
                    report.synced.push(SyncedFile { path, summary });
                }
                Err(e) => report.failed.push(FailedFile {
                    path,
                    error: e.to_string(),
                }),
            }
        }

        if !options.dry_run {
            ledger.save(&ledger_path)?;
        }

        tracing::info!(
            synced = report.synced.len(),
            failed = report.failed.len(),
            unchanged = report.unchanged,
            dry_run = options.dry_run,
            "file sync finished"
        );
        Ok(report)
    }

    /// Summarize and send one change; commit on success.
    ///
    /// Returns the summary that was delivered.
    fn deliver(&self, change: &ChangeEvent, ledger: &mut HashLedger) -> Result<String> {
        let summary = change.summary();
        let batch = EpisodeBatch::single(&self.config.group_id, change.episode(&summary));

        match self.ingestor.send(&batch) {
            Ok(()) => {
                ledger.commit(&change.path, change.digest.clone(), &summary);
                if let Err(e) = self.contents.set_previous(&change.path, &change.new_content) {
                    tracing::warn!(
                        path = %change.path.display(),
                        error = %e,
                        "failed to cache synced content; next diff uses a stale baseline"
                    );
                }
                tracing::info!(path = %change.path.display(), summary = %summary, "synced");
                Ok(summary)
            }
            Err(e) => {
                tracing::warn!(path = %change.path.display(), error = %e, "send failed, will retry next run");
                Err(e)
            }
        }
    }

    /// Report the ledger state of every candidate file.
    pub fn status(&self) -> StatusReport {
        status(self.config)
    }
}

/// Every file a sync run considers, in processing order.
///
/// Configured watched files that exist, in configuration order, then the
/// daily-log and project-doc markdown files, each sorted by path. A source
/// directory that cannot be listed contributes nothing.
pub fn candidate_files(config: &MemsyncConfig) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = config
        .resolved_watched_files()
        .into_iter()
        .map(|w| w.path)
        .filter(|p| p.is_file())
        .collect();

    files.extend(scan::files_with_extension(&config.logs_dir(), "md"));
    files.extend(scan::files_with_extension(&config.projects_dir(), "md"));
    files
}

/// Report the ledger state of every candidate file.
///
/// Reads the ledger only; no ingestor is involved.
pub fn status(config: &MemsyncConfig) -> StatusReport {
    let ledger = HashLedger::load_or_default(&config.ledger_path());
    let mut report = StatusReport::default();

    for path in candidate_files(config) {
        let bytes = match io::read_bytes(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "skipping unreadable file");
                continue;
            }
        };

        let state = if ledger.digest_for(&path).is_none() {
            FileState::New
        } else if ledger.has_changed(&path, &bytes) {
            FileState::Changed
        } else {
            FileState::Unchanged
        };

        report.entries.push(StatusEntry {
            last_summary: ledger.last_summary(&path).map(str::to_string),
            path,
            state,
        });
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::MemoryIngestor;
    use std::fs;

    fn setup() -> (tempfile::TempDir, MemsyncConfig) {
        let dir = tempfile::tempdir().unwrap();
        let config = MemsyncConfig::rooted_at(dir.path());
        fs::create_dir_all(&config.workspace_dir).unwrap();
        (dir, config)
    }

    #[test]
    fn candidates_order_watched_then_logs_then_projects() {
        let (_dir, config) = setup();
        fs::write(config.workspace_dir.join("USER.md"), "u").unwrap();
        fs::write(config.workspace_dir.join("MEMORY.md"), "m").unwrap();
        fs::create_dir_all(config.logs_dir()).unwrap();
        fs::create_dir_all(config.projects_dir()).unwrap();
        fs::write(config.logs_dir().join("2024-03-06.md"), "b").unwrap();
        fs::write(config.logs_dir().join("2024-03-05.md"), "a").unwrap();
        fs::write(config.projects_dir().join("atlas.md"), "p").unwrap();

        let ingestor = MemoryIngestor::new();
        let engine = SyncEngine::new(&config, &ingestor);
        let names: Vec<String> = engine
            .candidates()
            .iter()
            .map(|p| display_name(p))
            .collect();

        assert_eq!(
            names,
            vec!["MEMORY.md", "USER.md", "2024-03-05.md", "2024-03-06.md", "atlas.md"]
        );
    }

    #[test]
    fn change_event_episode_shape() {
        let (_dir, config) = setup();
        let path = config.workspace_dir.join("MEMORY.md");
        fs::write(&path, "# Memory\nline two\n").unwrap();

        let ingestor = MemoryIngestor::new();
        let engine = SyncEngine::new(&config, &ingestor);
        let change = engine
            .detect_change(&path, &HashLedger::new())
            .unwrap()
            .unwrap();

        assert_eq!(change.old_content, "");
        let episode = change.episode("summary");
        assert_eq!(episode.role, "FileUpdate");
        assert_eq!(episode.source_description.as_deref(), Some("file-update:MEMORY.md"));
        let metadata = episode.metadata.unwrap();
        assert_eq!(metadata["lines"], 2);
        assert_eq!(metadata["type"], "file-change-summary");
    }

    #[test]
    fn detect_change_none_when_committed() {
        let (_dir, config) = setup();
        let path = config.workspace_dir.join("MEMORY.md");
        fs::write(&path, "same").unwrap();

        let mut ledger = HashLedger::new();
        ledger.commit(&path, compute_content_checksum("same"), "s");

        let ingestor = MemoryIngestor::new();
        let engine = SyncEngine::new(&config, &ingestor);
        assert!(engine.detect_change(&path, &ledger).unwrap().is_none());
    }
}
