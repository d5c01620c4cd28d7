//! Directory scans that never abort a run

use std::path::{Path, PathBuf};

use memsync_fs::io;

/// Files in `dir` with `extension`, sorted by path.
///
/// A directory that cannot be listed (not a directory, permission denied)
/// is logged and treated as empty, so the other sources are still processed.
pub(crate) fn files_with_extension(dir: &Path, extension: &str) -> Vec<PathBuf> {
    match io::list_files_with_extension(dir, extension) {
        Ok(files) => files,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "cannot scan directory, skipping it");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn regular_file_in_place_of_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let not_a_dir = dir.path().join("projects");
        fs::write(&not_a_dir, "oops").unwrap();

        assert!(files_with_extension(&not_a_dir, "md").is_empty());
    }

    #[test]
    fn lists_matching_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.md"), "").unwrap();
        fs::write(dir.path().join("a.md"), "").unwrap();
        fs::write(dir.path().join("c.txt"), "").unwrap();

        let files = files_with_extension(dir.path(), "md");
        assert_eq!(files, vec![dir.path().join("a.md"), dir.path().join("b.md")]);
    }
}
