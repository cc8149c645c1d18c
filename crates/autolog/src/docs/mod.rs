//! Docs — activity documentation links from the `activities` side file.
//!
//! The side file is a JSON object whose `activities` member maps activity
//! names to documentation URLs:
//!
//! ```json
//! { "activities": { "Click Element": "https://...", "Subprogram (install.exe)": "https://..." } }
//! ```
//!
//! Keys are matched case-insensitively. Anything not listed resolves to the
//! configured default URL.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::parser::activity::SUBPROGRAM;
use crate::parser::{normalize_activity_name, ActivityRecord};

#[derive(Debug, Error)]
pub enum DocsError {
    #[error("Failed to read documentation file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid documentation file: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct DocFile {
    activities: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct DocIndex {
    links: HashMap<String, String>,
    default_url: String,
}

impl DocIndex {
    /// An index with no entries; every lookup yields `default_url`.
    pub fn new(default_url: impl Into<String>) -> Self {
        Self {
            links: HashMap::new(),
            default_url: default_url.into(),
        }
    }

    pub fn from_json(text: &str, default_url: impl Into<String>) -> Result<Self, DocsError> {
        let file: DocFile = serde_json::from_str(text)?;
        let links = file
            .activities
            .into_iter()
            .map(|(name, url)| (normalize_activity_name(&name), url))
            .collect();
        Ok(Self {
            links,
            default_url: default_url.into(),
        })
    }

    pub fn load(path: impl AsRef<Path>, default_url: impl Into<String>) -> Result<Self, DocsError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| DocsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let index = Self::from_json(&text, default_url)?;
        debug!("Loaded {} documentation links from {}", index.len(), path.display());
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn default_url(&self) -> &str {
        &self.default_url
    }

    /// Documented activity names, lowercased and sorted.
    pub fn activity_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.links.keys().cloned().collect();
        names.sort();
        names
    }

    /// Resolve a displayed activity name.
    ///
    /// Any name mentioning a subprogram is looked up as
    /// `subprogram (<file>)` when a file is known, then as plain
    /// `subprogram`.
    pub fn lookup_name(&self, activity_name: &str, file_name: Option<&str>) -> &str {
        let name = normalize_activity_name(activity_name);

        if name.contains(SUBPROGRAM) {
            if let Some(file) = file_name.filter(|f| !f.is_empty()) {
                let key = normalize_activity_name(&format!("{} ({})", SUBPROGRAM, file));
                if let Some(url) = self.links.get(&key) {
                    return url;
                }
            }
            return self.get_or_default(SUBPROGRAM);
        }

        self.get_or_default(&name)
    }

    pub fn lookup(&self, record: &ActivityRecord) -> &str {
        self.lookup_name(&record.activity_name, record.file_name())
    }

    fn get_or_default(&self, key: &str) -> &str {
        self.links.get(key).map(String::as_str).unwrap_or(&self.default_url)
    }
}
