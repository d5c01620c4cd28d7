//! Ledger of forwarded session messages

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Message ids already delivered, with the time each was sent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionLedger {
    #[serde(default)]
    synced_messages: BTreeMap<String, String>,
    #[serde(default)]
    last_sync: Option<String>,
}

impl SessionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the ledger; a missing file is an empty ledger.
    pub fn load(path: &Path) -> Result<Self> {
        super::read_state(path)
    }

    /// Load the ledger, treating any failure as an empty ledger.
    pub fn load_or_default(path: &Path) -> Self {
        super::read_state_or_default(path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        super::write_state(path, self)
    }

    pub fn contains(&self, message_id: &str) -> bool {
        self.synced_messages.contains_key(message_id)
    }

    /// Mark `message_id` as delivered at `synced_at`.
    pub fn record(&mut self, message_id: impl Into<String>, synced_at: impl Into<String>) {
        self.synced_messages
            .insert(message_id.into(), synced_at.into());
    }

    pub fn last_sync(&self) -> Option<&str> {
        self.last_sync.as_deref()
    }

    pub fn set_last_sync(&mut self, at: impl Into<String>) {
        self.last_sync = Some(at.into());
    }

    pub fn len(&self) -> usize {
        self.synced_messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.synced_messages.is_empty()
    }
}
