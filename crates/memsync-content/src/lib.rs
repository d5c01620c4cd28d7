//! Content parsing and diff summarization for memsync
//!
//! Turns pairs of markdown snapshots into short change summaries, splits
//! daily logs into timestamped sections, and models the message records
//! found in agent session transcripts.

pub mod error;
pub mod markdown;
pub mod message;
pub mod summary;
pub mod text;

pub use error::{Error, Result};
pub use markdown::{LogSection, extract_headings, log_date_from_file_name, parse_daily_log};
pub use message::{ContentBlock, MessageContent, SessionEntry};
pub use summary::{DiffSummary, KeywordCategory, KeywordFinding, summarize, summarize_change};
pub use text::{truncate_chars, truncate_with_suffix};
