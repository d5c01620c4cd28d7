//! Run configuration
//!
//! A single [`MemsyncConfig`] value carries every path, endpoint, and timing
//! knob used by the drivers. It is resolved once, in order:
//!
//! 1. Built-in defaults rooted at the user's home directory
//! 2. A TOML file (`--config`, or `<config_dir>/memsync/config.toml` if present)
//! 3. Environment variables (`GRAPHITI_URL`, `MEMSYNC_GROUP_ID`)
//!
//! Later sources override earlier ones. Relative paths in the file are
//! resolved against `workspace_dir`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Environment variable overriding the ingestion endpoint
pub const ENV_ENDPOINT: &str = "GRAPHITI_URL";

/// Environment variable overriding the group id
pub const ENV_GROUP_ID: &str = "MEMSYNC_GROUP_ID";

const DEFAULT_ENDPOINT: &str = "http://localhost:8001";
const DEFAULT_GROUP_ID: &str = "clawdbot-main";

/// A named file whose changes are tracked, with the role it is imported under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchedFile {
    /// Absolute, or relative to `workspace_dir`
    pub path: PathBuf,
    /// Speaker label used by the bulk importer
    pub role: String,
}

impl WatchedFile {
    pub fn new(path: impl Into<PathBuf>, role: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            role: role.into(),
        }
    }
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

fn default_watched_files() -> Vec<WatchedFile> {
    vec![
        WatchedFile::new("MEMORY.md", "LongTermMemory"),
        WatchedFile::new("IDENTITY.md", "Identity"),
        WatchedFile::new("USER.md", "UserProfile"),
    ]
}

/// Resolved configuration for one memsync invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemsyncConfig {
    /// Base URL of the ingestion service
    pub endpoint: String,
    /// Graph partition every message is written to
    pub group_id: String,
    /// Agent workspace holding the identity files
    pub workspace_dir: PathBuf,
    /// Defaults to `<workspace_dir>/memory`
    pub memory_dir: Option<PathBuf>,
    /// Ledgers and the content cache live here
    pub state_dir: PathBuf,
    /// Defaults to `<state_dir>/agents/main/sessions`
    pub sessions_dir: Option<PathBuf>,
    pub watched_files: Vec<WatchedFile>,
    pub send_timeout_secs: u64,
    pub health_timeout_secs: u64,
    /// Pause between file-sync sends
    pub send_delay_ms: u64,
    /// Pause between bulk-import sends
    pub import_delay_ms: u64,
    /// Pause after each session message sent
    pub session_delay_ms: u64,
    pub max_messages_per_run: usize,
    /// Only session files modified within this window are scanned
    pub session_window_hours: i64,
}

impl Default for MemsyncConfig {
    fn default() -> Self {
        let home = home_dir();
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            group_id: DEFAULT_GROUP_ID.to_string(),
            workspace_dir: home.join("clawd"),
            memory_dir: None,
            state_dir: home.join(".clawdbot"),
            sessions_dir: None,
            watched_files: default_watched_files(),
            send_timeout_secs: 30,
            health_timeout_secs: 5,
            send_delay_ms: 0,
            import_delay_ms: 500,
            session_delay_ms: 300,
            max_messages_per_run: 50,
            session_window_hours: 24,
        }
    }
}

impl MemsyncConfig {
    /// Configuration rooted entirely under `root`: workspace at `root/workspace`,
    /// state at `root/state`, no delays.
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            workspace_dir: root.join("workspace"),
            state_dir: root.join("state"),
            send_delay_ms: 0,
            import_delay_ms: 0,
            session_delay_ms: 0,
            ..Self::default()
        }
    }

    /// Platform config file location: `<config_dir>/memsync/config.toml`
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("memsync").join("config.toml"))
    }

    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load defaults, then the config file, then environment overrides.
    ///
    /// An explicit `path` must exist. Without one, the platform default file
    /// is read only if present.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::default_config_path().filter(|p| p.exists()),
        };

        let mut config = match file {
            Some(file) => {
                let content = memsync_fs::io::read_text(&file)?;
                let config = Self::from_toml_str(&content).map_err(|e| Error::Config {
                    path: file.clone(),
                    message: e.to_string(),
                })?;
                tracing::debug!(path = %file.display(), "loaded config file");
                config
            }
            None => Self::default(),
        };

        config.apply_env_from(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(endpoint) = lookup(ENV_ENDPOINT).filter(|v| !v.trim().is_empty()) {
            self.endpoint = endpoint;
        }
        if let Some(group_id) = lookup(ENV_GROUP_ID).filter(|v| !v.trim().is_empty()) {
            self.group_id = group_id;
        }
    }

    /// Endpoint without a trailing slash
    pub fn endpoint_base(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }

    pub fn memory_dir(&self) -> PathBuf {
        self.memory_dir
            .clone()
            .unwrap_or_else(|| self.workspace_dir.join("memory"))
    }

    /// Daily logs: `<memory_dir>/logs`
    pub fn logs_dir(&self) -> PathBuf {
        self.memory_dir().join("logs")
    }

    /// Project docs: `<memory_dir>/projects`
    pub fn projects_dir(&self) -> PathBuf {
        self.memory_dir().join("projects")
    }

    pub fn sessions_dir(&self) -> PathBuf {
        self.sessions_dir
            .clone()
            .unwrap_or_else(|| self.state_dir.join("agents").join("main").join("sessions"))
    }

    /// Hash ledger file
    pub fn ledger_path(&self) -> PathBuf {
        self.state_dir.join("file-hashes.json")
    }

    /// Content store directory
    pub fn content_cache_dir(&self) -> PathBuf {
        self.state_dir.join("file-cache")
    }

    /// Session ledger file
    pub fn session_state_path(&self) -> PathBuf {
        self.state_dir.join("session-sync-state.json")
    }

    /// Watched files with paths resolved against `workspace_dir`
    pub fn resolved_watched_files(&self) -> Vec<WatchedFile> {
        self.watched_files
            .iter()
            .map(|w| WatchedFile {
                path: if w.path.is_absolute() {
                    w.path.clone()
                } else {
                    self.workspace_dir.join(&w.path)
                },
                role: w.role.clone(),
            })
            .collect()
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_secs)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_secs)
    }
}
