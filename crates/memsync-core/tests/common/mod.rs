//! Shared helpers for memsync-core integration tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use memsync_core::MemsyncConfig;
use tempfile::TempDir;

/// Path to the test-fixtures directory (relative to the workspace root).
pub fn fixtures_dir() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    // crates/memsync-core -> ../../test-fixtures
    manifest_dir.join("../../test-fixtures/memory")
}

fn copy_tree(from: &Path, to: &Path) {
    fs::create_dir_all(to).unwrap();
    for entry in fs::read_dir(from).unwrap() {
        let entry = entry.unwrap();
        let target = to.join(entry.file_name());
        if entry.file_type().unwrap().is_dir() {
            copy_tree(&entry.path(), &target);
        } else {
            fs::copy(entry.path(), &target).unwrap();
        }
    }
}

/// A sandbox holding a copy of the fixture workspace and transcripts, with a
/// config rooted in it and all delays disabled.
pub struct Sandbox {
    pub dir: TempDir,
    pub config: MemsyncConfig,
}

impl Sandbox {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let mut config = MemsyncConfig::rooted_at(dir.path());
        copy_tree(&fixtures_dir().join("workspace"), &config.workspace_dir);

        let sessions = dir.path().join("sessions");
        copy_tree(&fixtures_dir().join("sessions"), &sessions);
        config.sessions_dir = Some(sessions);

        Self { dir, config }
    }

    /// An empty sandbox: no workspace files at all.
    pub fn empty() -> Self {
        let dir = TempDir::new().unwrap();
        let config = MemsyncConfig::rooted_at(dir.path());
        fs::create_dir_all(&config.workspace_dir).unwrap();
        Self { dir, config }
    }

    pub fn workspace_file(&self, relative: &str) -> PathBuf {
        self.config.workspace_dir.join(relative)
    }

    pub fn append(&self, relative: &str, text: &str) {
        let path = self.workspace_file(relative);
        let mut content = fs::read_to_string(&path).unwrap_or_default();
        content.push_str(text);
        fs::write(path, content).unwrap();
    }
}
