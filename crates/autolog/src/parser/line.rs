use serde_json::Value;

use crate::parser::traits::*;
use crate::parser::{MAX_LINE_SIZE, TIMESTAMP_KEY};

/// Configuration for the line parser
#[derive(Debug, Clone)]
pub struct LineParserConfig {
    /// Maximum line size to prevent runaway allocations (default: 1MB)
    pub max_line_bytes: usize,
}

impl Default for LineParserConfig {
    fn default() -> Self {
        Self {
            max_line_bytes: MAX_LINE_SIZE,
        }
    }
}

/// Splits `<timestamp> <json object>` lines.
#[derive(Debug, Clone, Default)]
pub struct LineRecordParser {
    config: LineParserConfig,
}

impl LineRecordParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LineParserConfig) -> Self {
        Self { config }
    }

    pub fn max_line_bytes(&self) -> usize {
        self.config.max_line_bytes
    }

    /// Parse one raw line into its timestamp and payload.
    ///
    /// The split happens at the first whitespace character after trimming,
    /// so a trailing `\r` from CRLF files is harmless.
    pub fn parse(&self, raw: &str) -> Result<ParsedLine, ParseError> {
        if raw.len() > self.config.max_line_bytes {
            return Err(ParseError::LineTooLarge(raw.len(), self.config.max_line_bytes));
        }

        let line = raw.trim();
        let (timestamp, payload_str) = line
            .split_once(char::is_whitespace)
            .ok_or(ParseError::MissingSeparator)?;

        let value: Value = serde_json::from_str(payload_str)
            .map_err(|e| ParseError::InvalidPayload(e.to_string()))?;

        let Value::Object(mut payload) = value else {
            return Err(ParseError::NotAnObject);
        };

        payload.insert(TIMESTAMP_KEY.to_string(), Value::String(timestamp.to_string()));

        Ok(ParsedLine {
            timestamp: timestamp.to_string(),
            payload,
        })
    }
}
