//! Error types for memsync-core

use std::path::PathBuf;

/// Result type for memsync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in memsync-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The ingestion endpoint failed its health check; fatal for a run
    #[error("Ingestion endpoint unavailable at {url}: {reason}")]
    EndpointUnavailable { url: String, reason: String },

    /// The endpoint answered a send with a non-success status
    #[error("Ingestion rejected with HTTP {status}: {body}")]
    IngestRejected { status: u16, body: String },

    /// A send failed for any other reason
    #[error("Ingestion failed: {message}")]
    Ingest { message: String },

    /// A persisted state file exists but could not be parsed
    #[error("Failed to parse state file {path}: {message}")]
    StateParse { path: PathBuf, message: String },

    /// Configuration could not be loaded
    #[error("Invalid configuration at {path}: {message}")]
    Config { path: PathBuf, message: String },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from memsync-fs
    #[error(transparent)]
    Fs(#[from] memsync_fs::Error),

    /// Content error from memsync-content
    #[error(transparent)]
    Content(#[from] memsync_content::Error),

    /// HTTP transport error
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn ingest(message: impl Into<String>) -> Self {
        Self::Ingest {
            message: message.into(),
        }
    }
}
