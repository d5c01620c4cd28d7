//! SHA-256 checksum utilities
//!
//! Provides a single canonical checksum format (`sha256:<hex>`) used by the
//! hash ledger to decide whether a watched file changed since its last sync.

use sha2::{Digest, Sha256};

/// Prefix for all checksums produced by this module
const PREFIX: &str = "sha256:";

/// Compute the SHA-256 checksum of raw bytes.
///
/// Returns a string in the canonical format `"sha256:<hex>"`.
pub fn compute_content_checksum(content: impl AsRef<[u8]>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_ref());
    format!("{}{:x}", PREFIX, hasher.finalize())
}

/// Short hex digest of a string, used to derive stable file names.
pub fn short_digest(value: &str, len: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let hex = format!("{:x}", hasher.finalize());
    hex[..len.min(hex.len())].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_and_read_bytes_digest_alike() {
        let text = "# Memory\nPrefers tea\n";
        let bytes: Vec<u8> = text.as_bytes().to_vec();
        assert_eq!(compute_content_checksum(text), compute_content_checksum(&bytes));
    }

    #[test]
    fn empty_file_digest() {
        assert_eq!(
            compute_content_checksum(""),
            "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn trailing_newline_is_a_different_digest() {
        assert_ne!(
            compute_content_checksum("Prefers tea"),
            compute_content_checksum("Prefers tea\n")
        );
    }

    #[test]
    fn same_file_name_in_different_dirs_gets_distinct_short_digest() {
        let logs = short_digest("/home/me/clawd/memory/logs/notes.md", 12);
        let projects = short_digest("/home/me/clawd/memory/projects/notes.md", 12);
        assert_ne!(logs, projects);
        assert_eq!(logs, short_digest("/home/me/clawd/memory/logs/notes.md", 12));
    }

    #[test]
    fn short_digest_is_head_of_full_digest() {
        let path = "/home/me/clawd/MEMORY.md";
        let full = compute_content_checksum(path);
        assert_eq!(short_digest(path, 12), &full[PREFIX.len()..PREFIX.len() + 12]);
    }

    #[test]
    fn short_digest_caps_at_full_length() {
        assert_eq!(short_digest("USER.md", 100).len(), 64);
    }
}
