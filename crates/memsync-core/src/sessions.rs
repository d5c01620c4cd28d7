//! Incremental session transcript sync
//!
//! Forwards substantive user and assistant messages from recent session
//! transcripts (`*.jsonl`), remembering each delivered message id in the
//! [`SessionLedger`] so later runs only send what is new.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use memsync_content::message::is_substantive;
use memsync_content::{SessionEntry, truncate_chars};
use memsync_fs::io;
use serde::Serialize;

use crate::Result;
use crate::config::MemsyncConfig;
use crate::ingest::{Episode, EpisodeBatch, Ingestor, RoleType, format_timestamp};
use crate::ledger::SessionLedger;
use crate::scan;

/// Cap applied to every forwarded message
pub const MAX_SESSION_MESSAGE_CHARS: usize = 2000;

/// A transcript message ready to send
#[derive(Debug, Clone)]
pub struct PendingMessage {
    pub id: String,
    pub episode: Episode,
}

/// Map a transcript entry to an episode, or `None` if it should not be sent.
///
/// Only `message` entries with an id, a `user` or `assistant` role and
/// substantive text qualify.
pub fn episode_for_entry(entry: &SessionEntry) -> Option<PendingMessage> {
    if !entry.is_message() {
        return None;
    }
    let id = entry.id.clone()?;

    let (role_type, role) = match entry.role() {
        "user" => (RoleType::User, "User"),
        "assistant" => (RoleType::Assistant, "Agent"),
        _ => return None,
    };

    let text = entry.text();
    if !is_substantive(&text) {
        return None;
    }

    let timestamp = entry
        .timestamp
        .clone()
        .unwrap_or_else(|| format_timestamp(Utc::now()));

    Some(PendingMessage {
        id,
        episode: Episode::new(
            role_type,
            role,
            truncate_chars(&text, MAX_SESSION_MESSAGE_CHARS),
            timestamp,
        ),
    })
}

/// Result of a session sync run
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionReport {
    pub files_scanned: usize,
    pub sent: usize,
    pub failed: usize,
    /// True when the per-run message cap stopped the run early
    pub capped: bool,
}

/// Driver for session transcript sync
pub struct SessionSyncer<'a> {
    config: &'a MemsyncConfig,
    ingestor: &'a dyn Ingestor,
}

impl<'a> SessionSyncer<'a> {
    pub fn new(config: &'a MemsyncConfig, ingestor: &'a dyn Ingestor) -> Self {
        Self { config, ingestor }
    }

    /// Transcripts modified after `now - session_window_hours`, oldest first.
    pub fn recent_transcripts(&self, now: DateTime<Utc>) -> Vec<PathBuf> {
        let cutoff = now - chrono::Duration::hours(self.config.session_window_hours);

        let mut recent: Vec<(DateTime<Utc>, PathBuf)> = Vec::new();
        for path in scan::files_with_extension(&self.config.sessions_dir(), "jsonl") {
            match io::modified_utc(&path) {
                Ok(modified) if modified >= cutoff => recent.push((modified, path)),
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "cannot stat transcript");
                }
            }
        }

        recent.sort();
        recent.into_iter().map(|(_, path)| path).collect()
    }

    /// Messages in `path` not yet recorded in `ledger`.
    ///
    /// An id that appears on more than one line is returned once, for its
    /// first occurrence.
    pub fn pending_in(&self, path: &Path, ledger: &SessionLedger) -> Result<Vec<PendingMessage>> {
        let content = io::read_text(path)?;
        let mut seen = HashSet::new();

        Ok(content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match SessionEntry::parse_line(line) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "skipping malformed line");
                    None
                }
            })
            .filter_map(|entry| episode_for_entry(&entry))
            .filter(|pending| !ledger.contains(&pending.id))
            .filter(|pending| seen.insert(pending.id.clone()))
            .collect())
    }

    /// Run one session sync pass.
    ///
    /// # Errors
    ///
    /// Returns `Error::EndpointUnavailable` if the health check fails, or an
    /// error if the ledger cannot be saved. An unlistable sessions directory
    /// is treated as empty.
    pub fn run(&self) -> Result<SessionReport> {
        self.ingestor.health_check()?;

        let state_path = self.config.session_state_path();
        let mut ledger = SessionLedger::load_or_default(&state_path);
        let delay = Duration::from_millis(self.config.session_delay_ms);
        let limit = self.config.max_messages_per_run;
        let mut report = SessionReport::default();

        'files: for path in self.recent_transcripts(Utc::now()) {
            report.files_scanned += 1;
            let pending = match self.pending_in(&path, &ledger) {
                Ok(pending) => pending,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "cannot read transcript");
                    continue;
                }
            };

            for message in pending {
                // Ids are global; another transcript may already have delivered this one.
                if ledger.contains(&message.id) {
                    continue;
                }
                if report.sent >= limit {
                    report.capped = true;
                    break 'files;
                }

                let batch = EpisodeBatch::single(&self.config.group_id, message.episode);
                match self.ingestor.send(&batch) {
                    Ok(()) => {
                        ledger.record(message.id, format_timestamp(Utc::now()));
                        report.sent += 1;
                        if !delay.is_zero() {
                            thread::sleep(delay);
                        }
                    }
                    Err(e) => {
                        tracing::warn!(id = %message.id, error = %e, "session message send failed");
                        report.failed += 1;
                    }
                }
            }
        }

        ledger.set_last_sync(format_timestamp(Utc::now()));
        ledger.save(&state_path)?;

        tracing::info!(
            sent = report.sent,
            failed = report.failed,
            files = report.files_scanned,
            "session sync finished"
        );
        Ok(report)
    }
}
