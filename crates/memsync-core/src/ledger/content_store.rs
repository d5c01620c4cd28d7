//! Last-synced content cache, used as the "before" side of each diff

use std::path::{Path, PathBuf};

use memsync_fs::checksum::short_digest;

use crate::Result;

/// Hex characters of the path digest embedded in cache file names
const PATH_DIGEST_LEN: usize = 12;

/// One cache file per watched path under a single directory
///
/// Cache file names combine the watched file's name with a digest of its
/// full path, so `logs/notes.md` and `projects/notes.md` never share an entry.
#[derive(Debug, Clone)]
pub struct ContentStore {
    dir: PathBuf,
}

impl ContentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cache file backing `path`
    pub fn cache_path(&self, path: &Path) -> PathBuf {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed".to_string());
        let digest = short_digest(&path.to_string_lossy(), PATH_DIGEST_LEN);
        self.dir.join(format!("{}.{}.cache", name, digest))
    }

    /// Previously synced content of `path`, or an empty string.
    ///
    /// An unreadable entry is logged and treated as absent, which makes the
    /// next diff treat the whole file as added.
    pub fn get_previous(&self, path: &Path) -> String {
        let cache = self.cache_path(path);
        match memsync_fs::io::read_text(&cache) {
            Ok(content) => content,
            Err(e) if e.is_not_found() => String::new(),
            Err(e) => {
                tracing::warn!(path = %cache.display(), error = %e, "content cache unreadable");
                String::new()
            }
        }
    }

    /// Replace the cached content of `path`.
    pub fn set_previous(&self, path: &Path, content: &str) -> Result<()> {
        memsync_fs::io::write_text(&self.cache_path(path), content)?;
        Ok(())
    }
}
