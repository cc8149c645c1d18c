//! Ingest module — chunked reading, validation and the background worker.
//!
//! A file is first sampled by [`validate`], then streamed through
//! [`pipeline::IngestPipeline`] on a blocking worker thread spawned by
//! [`worker`]. The consumer only ever sees progress snapshots and, once the
//! worker finishes, the complete [`IngestOutcome`].

pub mod pipeline;
pub mod reader;
pub mod validate;
pub mod worker;

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::parser::metrics::MetricsSnapshot;
use crate::parser::SystemConfigRecord;
use crate::store::RecordStore;

pub use pipeline::IngestPipeline;
pub use reader::{LineSplitter, SplitLine};
pub use validate::{validate_file, validate_reader};
pub use worker::{spawn_ingest, spawn_with, IngestHandle};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read log data: {0}")]
    Read(#[from] io::Error),

    #[error("Invalid log format at line {line}: {reason}")]
    InvalidFormat { line: usize, reason: String },

    #[error("Ingestion already in progress")]
    InProgress,

    #[error("Ingestion worker failed: {0}")]
    Worker(String),
}

impl IngestError {
    /// Attach the file path to a bare read error.
    pub fn with_path(self, path: &Path) -> Self {
        match self {
            IngestError::Read(source) => IngestError::Io {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        }
    }
}

/// Progress of one ingestion run, by bytes consumed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct IngestProgress {
    pub bytes_processed: u64,
    pub total_bytes: u64,
    /// 0.0 ..= 100.0
    pub percent: f64,
    pub finished: bool,
}

impl IngestProgress {
    pub fn new(bytes_processed: u64, total_bytes: u64) -> Self {
        let percent = if total_bytes == 0 {
            0.0
        } else {
            (bytes_processed.min(total_bytes) as f64 / total_bytes as f64 * 100.0).clamp(0.0, 100.0)
        };
        Self {
            bytes_processed,
            total_bytes,
            percent,
            finished: false,
        }
    }

    pub fn complete(bytes_processed: u64, total_bytes: u64) -> Self {
        Self {
            bytes_processed,
            total_bytes,
            percent: 100.0,
            finished: true,
        }
    }
}

/// Everything one completed run produced.
#[derive(Debug)]
pub struct IngestOutcome {
    pub store: RecordStore,
    /// Last system configuration line seen, if any
    pub system_config: Option<SystemConfigRecord>,
    pub metrics: MetricsSnapshot,
}
