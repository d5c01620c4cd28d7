//! Ingestion endpoint boundary
//!
//! The knowledge-graph service is an external collaborator reached through
//! the [`Ingestor`] trait. [`HttpIngestor`] talks to a real endpoint;
//! [`MemoryIngestor`] records batches in memory for tests.

mod http;
mod memory;

pub use http::HttpIngestor;
pub use memory::MemoryIngestor;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Result;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Format an instant the way the endpoint expects: `YYYY-MM-DDTHH:MM:SSZ`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Destination for episodes
pub trait Ingestor {
    /// Succeeds only if the endpoint is reachable and healthy.
    ///
    /// # Errors
    ///
    /// Returns `Error::EndpointUnavailable` otherwise.
    fn health_check(&self) -> Result<()>;

    /// Deliver one batch. A single attempt with a bounded timeout.
    fn send(&self, batch: &EpisodeBatch) -> Result<()>;
}

/// Speaker class of an episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleType {
    System,
    User,
    Assistant,
}

/// One timestamped message for the knowledge graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub role_type: RoleType,
    /// Speaker name, e.g. `FileUpdate`, `DailyLog`, `User`
    pub role: String,
    pub content: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl Episode {
    pub fn new(
        role_type: RoleType,
        role: impl Into<String>,
        content: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            role_type,
            role: role.into(),
            content: content.into(),
            timestamp: timestamp.into(),
            source_description: None,
            metadata: None,
        }
    }

    /// A `system` episode
    pub fn system(
        role: impl Into<String>,
        content: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self::new(RoleType::System, role, content, timestamp)
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source_description = Some(source.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Request body of `POST /messages`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeBatch {
    pub group_id: String,
    pub messages: Vec<Episode>,
}

impl EpisodeBatch {
    /// A batch carrying exactly one episode
    pub fn single(group_id: impl Into<String>, episode: Episode) -> Self {
        Self {
            group_id: group_id.into(),
            messages: vec![episode],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn timestamp_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 10, 30, 0).unwrap();
        assert_eq!(format_timestamp(at), "2024-03-05T10:30:00Z");
    }

    #[test]
    fn batch_wire_format() {
        let episode = Episode::system("FileUpdate", "File updated: MEMORY.md", "2024-03-05T10:30:00Z")
            .with_source("file-update:MEMORY.md")
            .with_metadata(json!({"file": "MEMORY.md", "type": "file-change-summary", "lines": 3}));
        let batch = EpisodeBatch::single("clawdbot-main", episode);

        assert_eq!(
            serde_json::to_value(&batch).unwrap(),
            json!({
                "group_id": "clawdbot-main",
                "messages": [{
                    "role_type": "system",
                    "role": "FileUpdate",
                    "content": "File updated: MEMORY.md",
                    "timestamp": "2024-03-05T10:30:00Z",
                    "source_description": "file-update:MEMORY.md",
                    "metadata": {"file": "MEMORY.md", "type": "file-change-summary", "lines": 3}
                }]
            })
        );
    }

    #[test]
    fn optional_fields_omitted() {
        let episode = Episode::new(RoleType::User, "User", "hello world!", "2024-03-05T10:30:00Z");
        let value = serde_json::to_value(&episode).unwrap();
        assert_eq!(value["role_type"], "user");
        assert!(value.get("source_description").is_none());
        assert!(value.get("metadata").is_none());
    }
}
