//! Session transcript records
//!
//! Agent sessions are stored as JSON Lines. Message content arrives either as
//! a plain string or as a list of typed content blocks; both normalize to a
//! single string through [`MessageContent::to_text`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Result;

/// Markers identifying channel plumbing and housekeeping messages
const SKIP_MARKERS: &[&str] = &[
    "[Signal",
    "[Slack",
    "HEARTBEAT",
    "NO_REPLY",
    "✅ New session",
    "System:",
    "[message_id:",
];

/// Messages shorter than this carry no useful content
const MIN_MESSAGE_CHARS: usize = 10;

/// Message body as stored in a transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    PlainText(String),
    BlockList(Vec<ContentBlock>),
}

/// One element of a block-list message body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentBlock {
    /// `{"type": "...", "text": "..."}`; only `type == "text"` contributes
    Typed {
        #[serde(rename = "type", default)]
        kind: String,
        #[serde(default)]
        text: String,
    },
    /// A bare string inside the list
    Bare(String),
    /// Anything else (numbers, nested arrays) is carried but ignored
    Other(Value),
}

impl ContentBlock {
    fn text(&self) -> Option<&str> {
        match self {
            Self::Typed { kind, text } if kind == "text" => Some(text),
            Self::Bare(text) => Some(text),
            _ => None,
        }
    }
}

impl MessageContent {
    /// Normalize to one string; text blocks are joined with a single space.
    pub fn to_text(&self) -> String {
        match self {
            Self::PlainText(text) => text.clone(),
            Self::BlockList(blocks) => blocks
                .iter()
                .filter_map(ContentBlock::text)
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

/// Speaker of a transcript message
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: Option<MessageContent>,
}

/// One line of a session transcript
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionEntry {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub message: Option<SessionMessage>,
}

impl SessionEntry {
    /// Parse a single JSON line.
    pub fn parse_line(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line.trim())?)
    }

    /// True for `type == "message"` entries.
    pub fn is_message(&self) -> bool {
        self.kind == "message"
    }

    pub fn role(&self) -> &str {
        self.message.as_ref().map(|m| m.role.as_str()).unwrap_or("")
    }

    /// Normalized text of the message body, empty when absent.
    pub fn text(&self) -> String {
        self.message
            .as_ref()
            .and_then(|m| m.content.as_ref())
            .map(MessageContent::to_text)
            .unwrap_or_default()
    }
}

/// Whether a message body is worth forwarding.
///
/// Rejects short messages and channel/housekeeping traffic.
pub fn is_substantive(text: &str) -> bool {
    if text.chars().count() < MIN_MESSAGE_CHARS {
        return false;
    }
    !SKIP_MARKERS.iter().any(|marker| text.contains(marker))
}
