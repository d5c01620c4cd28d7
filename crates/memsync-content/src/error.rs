//! Error types for memsync-content

/// Result type for memsync-content operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in memsync-content operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A transcript line is not a valid JSON record
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
