//! Transcript inspection for Claude Code JSONL transcripts.
//!
//! The stop hook only looks at the final entry, to notice when the agent
//! stopped because the account ran out of credit.

use crate::error::{Error, Result};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Text the API puts in the error entry when the account is out of credit.
pub const INSUFFICIENT_CREDIT: &str = "Insufficient credit";

/// A message in the transcript.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Message {
    /// The message content: a string or a list of content blocks.
    #[serde(default)]
    pub content: Value,
}

/// A transcript entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranscriptEntry {
    /// The type of entry (user, assistant, system, etc.).
    #[serde(rename = "type", default)]
    pub entry_type: Option<String>,
    /// The message content.
    #[serde(default)]
    pub message: Option<Message>,
    /// Whether this entry is an API error message.
    #[serde(rename = "isApiErrorMessage", default)]
    pub is_api_error_message: bool,
}

impl TranscriptEntry {
    /// Whether this entry reports that the account ran out of credit.
    #[must_use]
    pub fn is_credit_exhausted(&self) -> bool {
        self.is_api_error_message
            && self
                .message
                .as_ref()
                .is_some_and(|m| value_contains_text(&m.content, INSUFFICIENT_CREDIT))
    }
}

/// Check whether any string inside a JSON value contains `needle`.
fn value_contains_text(value: &Value, needle: &str) -> bool {
    match value {
        Value::String(s) => s.contains(needle),
        Value::Array(items) => items.iter().any(|v| value_contains_text(v, needle)),
        Value::Object(map) => map.values().any(|v| value_contains_text(v, needle)),
        Value::Null | Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Read and parse the last non-empty line of a transcript.
///
/// # Errors
///
/// Returns an error if the file is missing or unreadable, has no entries, or
/// its last line is not a JSON object.
pub fn read_last_entry(path: &Path) -> Result<TranscriptEntry> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path)?;
    let last_line = content
        .lines()
        .map(str::trim)
        .rfind(|line| !line.is_empty())
        .ok_or_else(|| Error::InvalidTranscript("transcript has no entries".to_string()))?;

    Ok(serde_json::from_str(last_line)?)
}
