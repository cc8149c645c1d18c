//! Load — config loading from file and environment variables.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use super::model::ParserConfig;

pub const CONFIG_FILE_ENV: &str = "AUTOLOG_CONFIG_FILE";
pub const DEFAULT_CONFIG_FILE: &str = "autolog.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ParserConfig {
    /// Load configuration.
    /// Priority: Environment Variables > Config File > Defaults
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var(CONFIG_FILE_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let mut config = if Path::new(&config_path).exists() {
            info!("Loading configuration from: {}", config_path);
            Self::from_file(&config_path)?
        } else {
            info!("Config file not found at {}, using defaults", config_path);
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Defaults overlaid with the process environment
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Overlay values from `lookup`. Unparseable values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let number = |key: &str| lookup(key).and_then(|s| s.trim().parse::<u64>().ok());

        if let Some(n) = number("AUTOLOG_CHUNK_SIZE") {
            self.chunk_size_bytes = n as usize;
        }
        if let Some(n) = number("AUTOLOG_PAGE_SIZE") {
            self.page_size = n as usize;
        }
        if let Some(n) = number("AUTOLOG_SAMPLE_LINES") {
            self.validation_sample_lines = n as usize;
        }
        if let Some(n) = number("AUTOLOG_POLL_INTERVAL_MS") {
            self.poll_interval_ms = n;
        }
        if let Some(n) = number("AUTOLOG_MAX_LINE_BYTES") {
            self.max_line_bytes = n as usize;
        }
        if let Some(docs) = lookup("AUTOLOG_DOCS_FILE") {
            self.docs_file = docs;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let sizes = [
            ("chunk_size_bytes", self.chunk_size_bytes as u64),
            ("page_size", self.page_size as u64),
            ("validation_sample_lines", self.validation_sample_lines as u64),
            ("poll_interval_ms", self.poll_interval_ms),
            ("max_line_bytes", self.max_line_bytes as u64),
        ];
        for (name, value) in sizes {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{} must be > 0", name)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "chunk_size_bytes = 4096\ndocs_file = \"docs.json\"").unwrap();

        let cfg = ParserConfig::from_file(file.path()).unwrap();
        assert_eq!(cfg.chunk_size_bytes, 4096);
        assert_eq!(cfg.docs_file, "docs.json");
        assert_eq!(cfg.page_size, 1000);
    }

    #[test]
    fn test_from_file_missing() {
        let err = ParserConfig::from_file("/nonexistent/autolog.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_from_file_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "page_size = \"lots\"").unwrap();
        let err = ParserConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("AUTOLOG_PAGE_SIZE", "50"),
            ("AUTOLOG_POLL_INTERVAL_MS", "20"),
            ("AUTOLOG_CHUNK_SIZE", "not-a-number"),
            ("AUTOLOG_DOCS_FILE", "/tmp/docs.json"),
        ]
        .into_iter()
        .collect();

        let mut cfg = ParserConfig::default();
        cfg.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(cfg.page_size, 50);
        assert_eq!(cfg.poll_interval_ms, 20);
        assert_eq!(cfg.chunk_size_bytes, 8192);
        assert_eq!(cfg.docs_file, "/tmp/docs.json");
    }

    #[test]
    fn test_validate_rejects_zero_sizes() {
        assert!(ParserConfig::default().validate().is_ok());

        let cfg = ParserConfig {
            chunk_size_bytes: 0,
            ..Default::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("chunk_size_bytes"));

        let cfg = ParserConfig {
            page_size: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
