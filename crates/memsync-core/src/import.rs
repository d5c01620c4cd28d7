//! One-shot bulk import
//!
//! Seeds the knowledge graph with everything currently on disk: daily-log
//! sections, project docs, and the identity files. Nothing is recorded in a
//! ledger, so running the import twice sends everything twice.

use std::path::Path;
use std::thread;
use std::time::Duration;

use chrono::Utc;
use memsync_content::markdown::document_title;
use memsync_content::{log_date_from_file_name, parse_daily_log, truncate_with_suffix};
use memsync_fs::io;
use serde::Serialize;

use crate::Result;
use crate::config::MemsyncConfig;
use crate::ingest::{Episode, EpisodeBatch, Ingestor, format_timestamp};
use crate::scan;

/// Cap applied to every imported message
pub const MAX_IMPORT_CHARS: usize = 3000;

/// Cap applied to a project doc body before framing
const PROJECT_DOC_CHARS: usize = 2000;

const TRUNCATED_SUFFIX: &str = "\n[...truncated]";
const SEE_FULL_FILE_SUFFIX: &str = "\n[...see full file]";

/// Which sources an import run covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportScope {
    #[default]
    All,
    Logs,
    Projects,
    Identity,
}

impl ImportScope {
    fn includes(self, other: ImportScope) -> bool {
        self == ImportScope::All || self == other
    }
}

/// Outcome of one imported message
#[derive(Debug, Clone, Serialize)]
pub struct ImportItem {
    /// `source_description` of the message
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of an import run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub failed: usize,
    pub items: Vec<ImportItem>,
}

impl ImportReport {
    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Frame a project doc for import.
pub fn project_doc_content(title: &str, updated: &str, body: &str) -> String {
    format!(
        "Project doc '{}' (last updated {}):\n{}",
        title,
        updated,
        truncate_with_suffix(body, PROJECT_DOC_CHARS, SEE_FULL_FILE_SUFFIX)
    )
}

/// Frame an identity file for import.
pub fn identity_content(name: &str, body: &str) -> String {
    format!(
        "Core file {}:\n{}",
        name,
        memsync_content::truncate_chars(body, MAX_IMPORT_CHARS)
    )
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Bulk importer over the configured memory layout
pub struct Importer<'a> {
    config: &'a MemsyncConfig,
    ingestor: &'a dyn Ingestor,
}

impl<'a> Importer<'a> {
    pub fn new(config: &'a MemsyncConfig, ingestor: &'a dyn Ingestor) -> Self {
        Self { config, ingestor }
    }

    /// Episodes for every daily-log section, in file then section order.
    pub fn daily_log_episodes(&self) -> Vec<Episode> {
        let mut episodes = Vec::new();

        for path in scan::files_with_extension(&self.config.logs_dir(), "md") {
            let name = file_name(&path);
            let Some(date) = log_date_from_file_name(&name) else {
                tracing::debug!(path = %path.display(), "daily log without a date, skipping");
                continue;
            };
            let content = match io::read_text(&path) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "cannot read daily log");
                    continue;
                }
            };

            for section in parse_daily_log(date, &content) {
                episodes.push(
                    Episode::system("DailyLog", section.render(date), section.timestamp.clone())
                        .with_source(format!("daily-log:{}", name)),
                );
            }
        }

        episodes
    }

    /// Episodes for every project doc, timestamped by mtime.
    pub fn project_doc_episodes(&self) -> Vec<Episode> {
        let mut episodes = Vec::new();

        for path in scan::files_with_extension(&self.config.projects_dir(), "md") {
            let name = file_name(&path);
            let content = match io::read_text(&path) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "cannot read project doc");
                    continue;
                }
            };
            let modified = io::modified_utc(&path).unwrap_or_else(|_| Utc::now());
            let title = document_title(&content).unwrap_or_else(|| {
                path.file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| name.clone())
            });

            let text = project_doc_content(&title, &modified.format("%Y-%m-%d").to_string(), &content);
            episodes.push(
                Episode::system("ProjectDoc", text, format_timestamp(modified))
                    .with_source(format!("project-doc:{}", name)),
            );
        }

        episodes
    }

    /// Episodes for each existing watched file, under its configured role.
    pub fn identity_episodes(&self) -> Vec<Episode> {
        let mut episodes = Vec::new();

        for watched in self.config.resolved_watched_files() {
            let content = match io::read_text(&watched.path) {
                Ok(content) => content,
                Err(e) => {
                    tracing::debug!(path = %watched.path.display(), error = %e, "skipping identity file");
                    continue;
                }
            };
            let name = file_name(&watched.path);
            let modified = io::modified_utc(&watched.path).unwrap_or_else(|_| Utc::now());
            episodes.push(
                Episode::system(
                    watched.role.clone(),
                    identity_content(&name, &content),
                    format_timestamp(modified),
                )
                .with_source(format!("core:{}", name)),
            );
        }

        episodes
    }

    /// Collect the episodes covered by `scope`, in import order.
    pub fn collect(&self, scope: ImportScope) -> Vec<Episode> {
        let mut episodes = Vec::new();
        if scope.includes(ImportScope::Logs) {
            episodes.extend(self.daily_log_episodes());
        }
        if scope.includes(ImportScope::Projects) {
            episodes.extend(self.project_doc_episodes());
        }
        if scope.includes(ImportScope::Identity) {
            episodes.extend(self.identity_episodes());
        }
        episodes
    }

    /// Send every episode in `scope`.
    ///
    /// # Errors
    ///
    /// Returns `Error::EndpointUnavailable` if the health check fails.
    /// Individual send failures are counted in the report.
    pub fn run(&self, scope: ImportScope) -> Result<ImportReport> {
        self.ingestor.health_check()?;

        let episodes = self.collect(scope);
        let delay = Duration::from_millis(self.config.import_delay_ms);
        let mut report = ImportReport::default();

        for (i, mut episode) in episodes.into_iter().enumerate() {
            if i > 0 && !delay.is_zero() {
                thread::sleep(delay);
            }

            episode.content = truncate_with_suffix(&episode.content, MAX_IMPORT_CHARS, TRUNCATED_SUFFIX);
            let source = episode.source_description.clone().unwrap_or_default();
            let batch = EpisodeBatch::single(&self.config.group_id, episode);

            match self.ingestor.send(&batch) {
                Ok(()) => {
                    tracing::info!(source = %source, "imported");
                    report.imported += 1;
                    report.items.push(ImportItem { source, error: None });
                }
                Err(e) => {
                    tracing::warn!(source = %source, error = %e, "import failed");
                    report.failed += 1;
                    report.items.push(ImportItem {
                        source,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn project_doc_body_is_capped() {
        let body = "x".repeat(2500);
        let text = project_doc_content("Atlas", "2024-03-05", &body);
        assert!(text.starts_with("Project doc 'Atlas' (last updated 2024-03-05):\n"));
        assert!(text.ends_with("\n[...see full file]"));
    }

    #[test]
    fn short_project_doc_has_no_marker() {
        let text = project_doc_content("Atlas", "2024-03-05", "short body");
        assert_eq!(text, "Project doc 'Atlas' (last updated 2024-03-05):\nshort body");
    }

    #[test]
    fn identity_content_framing() {
        assert_eq!(identity_content("USER.md", "Name: Sam"), "Core file USER.md:\nName: Sam");
    }

    #[test]
    fn scope_inclusion() {
        assert!(ImportScope::All.includes(ImportScope::Logs));
        assert!(ImportScope::Projects.includes(ImportScope::Projects));
        assert!(!ImportScope::Identity.includes(ImportScope::Logs));
    }
}
