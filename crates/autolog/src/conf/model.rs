//! Model — ParserConfig and its defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::parser::line::LineParserConfig;
use crate::parser::MAX_LINE_SIZE;

pub const DEFAULT_CHUNK_SIZE: usize = 8192;
pub const DEFAULT_PAGE_SIZE: usize = 1000;
pub const DEFAULT_SAMPLE_LINES: usize = 10;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;
pub const DEFAULT_DOCS_FILE: &str = "output.json";
pub const DEFAULT_DOC_URL: &str = "https://docs.example.com/default";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Bytes read from the log file per chunk
    pub chunk_size_bytes: usize,
    /// Records per result page
    pub page_size: usize,
    /// Non-empty lines checked before a file is accepted
    pub validation_sample_lines: usize,
    /// How often the consumer checks on the ingestion worker
    pub poll_interval_ms: u64,
    pub max_line_bytes: usize,
    /// JSON file with the `activities` documentation table
    pub docs_file: String,
    pub default_doc_url: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            chunk_size_bytes: DEFAULT_CHUNK_SIZE,
            page_size: DEFAULT_PAGE_SIZE,
            validation_sample_lines: DEFAULT_SAMPLE_LINES,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_line_bytes: MAX_LINE_SIZE,
            docs_file: DEFAULT_DOCS_FILE.to_string(),
            default_doc_url: DEFAULT_DOC_URL.to_string(),
        }
    }
}

impl ParserConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn line_parser(&self) -> LineParserConfig {
        LineParserConfig {
            max_line_bytes: self.max_line_bytes,
        }
    }
}
