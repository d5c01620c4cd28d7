//! Command implementations for memsync-cli

pub mod import;
pub mod sessions;
pub mod status;
pub mod sync;

pub use import::run_import;
pub use sessions::run_sessions;
pub use status::run_status;
pub use sync::run_sync;
