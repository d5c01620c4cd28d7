//! Filesystem layer for memsync
//!
//! Provides the canonical content checksum and safe I/O helpers shared by
//! the ledger, content cache, and directory scanners.

pub mod checksum;
pub mod error;
pub mod io;

pub use checksum::compute_content_checksum;
pub use error::{Error, Result};
