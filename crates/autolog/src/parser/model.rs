use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use super::system::SystemConfigRecord;

/// Line-level parse failures. A line that fails is logged and skipped;
/// none of these abort an ingestion run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Line has no whitespace between timestamp and payload")]
    MissingSeparator,

    #[error("Invalid JSON payload: {0}")]
    InvalidPayload(String),

    #[error("JSON payload is not an object")]
    NotAnObject,

    #[error("Line too large: {0} bytes (max: {1} bytes)")]
    LineTooLarge(usize, usize),
}

/// A line split into its timestamp token and JSON object payload.
///
/// The payload already carries the timestamp under
/// [`TIMESTAMP_KEY`](super::TIMESTAMP_KEY), so the archived original is
/// self-describing when exported.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    pub timestamp: String,
    pub payload: Map<String, Value>,
}

impl ParsedLine {
    pub fn contains_key(&self, key: &str) -> bool {
        self.payload.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }
}

/// One executed workflow activity, normalized for display.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityRecord {
    /// Timestamp token copied verbatim from the line
    pub timestamp: String,

    /// Timestamp parsed as an instant, when it is in a recognised format
    pub occurred_at: Option<DateTime<Utc>>,

    /// Lowercased name, with the subprogram file name appended when present
    pub activity_name: String,

    /// Lowercased name without enrichment. Used for redaction adjacency
    /// and documentation lookup.
    pub activity_key: String,

    pub status: String,
    pub executed_branch: String,

    /// Output shown to the user. Holds the mask value when redacted.
    pub output_result: String,

    pub error_message: String,

    /// Full original payload, never redacted in place
    #[serde(skip)]
    pub payload: Arc<Map<String, Value>>,
}

impl ActivityRecord {
    pub fn is_error(&self) -> bool {
        self.status == super::activity::ERROR_STATUS
    }

    /// `fileName` carried by the original payload, if any.
    pub fn file_name(&self) -> Option<&str> {
        self.payload
            .get(super::activity::FILE_NAME_KEY)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// Result of classifying one parsed line. Skipped lines are represented by
/// the `Err(ParseError)` side of [`LineClassifier::classify`](super::LineClassifier::classify).
#[derive(Debug, Clone)]
pub enum Classified {
    SystemConfig(SystemConfigRecord),
    Activity(ActivityRecord),
    /// `start` / `end` markers: never stored, but still observed by redaction
    Excluded { activity_key: String },
}

impl Classified {
    pub fn kind(&self) -> &'static str {
        match self {
            Classified::SystemConfig(_) => "system_config",
            Classified::Activity(_) => "activity",
            Classified::Excluded { .. } => "excluded",
        }
    }
}
