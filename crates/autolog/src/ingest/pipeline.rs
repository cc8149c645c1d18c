//! Pipeline — bounded-chunk ingestion of one log source.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use tracing::{debug, info, warn};

use super::reader::{LineSplitter, SplitLine};
use super::{IngestError, IngestOutcome, IngestProgress};
use crate::conf::ParserConfig;
use crate::parser::metrics::{IngestMetrics, SkipReason};
use crate::parser::{Classified, LineClassifier, ParseError, SystemConfigRecord};
use crate::redact::RedactionFilter;
use crate::store::RecordStore;

/// Mutable state threaded through one run, in file order.
#[derive(Default)]
struct RunState {
    store: RecordStore,
    system_config: Option<SystemConfigRecord>,
    redaction: RedactionFilter,
    line_no: usize,
}

pub struct IngestPipeline {
    classifier: LineClassifier,
    chunk_size: usize,
    max_line_bytes: usize,
    metrics: IngestMetrics,
}

impl IngestPipeline {
    pub fn new(config: &ParserConfig) -> Self {
        Self {
            classifier: LineClassifier::with_parser_config(config.line_parser()),
            chunk_size: config.chunk_size_bytes.max(1),
            max_line_bytes: config.max_line_bytes,
            metrics: IngestMetrics::new(),
        }
    }

    /// Open `path` and ingest it, reporting progress after every chunk.
    pub fn ingest_file(
        &self,
        path: &Path,
        on_progress: impl FnMut(IngestProgress),
    ) -> Result<IngestOutcome, IngestError> {
        let file = File::open(path).map_err(|source| IngestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let total_bytes = file
            .metadata()
            .map_err(|source| IngestError::Io {
                path: path.to_path_buf(),
                source,
            })?
            .len();

        info!("Ingesting {} ({} bytes)", path.display(), total_bytes);
        let outcome = self.run(file, total_bytes, on_progress).map_err(|e| e.with_path(path))?;
        info!(
            "Ingested {}: {} records, {} lines skipped",
            path.display(),
            outcome.store.len(),
            outcome.metrics.lines_skipped
        );
        Ok(outcome)
    }

    /// Ingest everything `reader` yields. `total_bytes` only drives progress.
    pub fn run<R: Read>(
        &self,
        mut reader: R,
        total_bytes: u64,
        mut on_progress: impl FnMut(IngestProgress),
    ) -> Result<IngestOutcome, IngestError> {
        let mut state = RunState::default();
        let mut splitter = LineSplitter::new(self.max_line_bytes);
        let mut buf = vec![0u8; self.chunk_size];
        let mut processed: u64 = 0;
        let mut last_percent = 0.0;

        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(IngestError::Read(e)),
            };
            processed += n as u64;
            self.metrics.record_bytes(n as u64);

            for line in splitter.push(&buf[..n]) {
                self.process(line, &mut state);
            }

            let mut progress = IngestProgress::new(processed, total_bytes);
            if progress.percent < last_percent {
                progress.percent = last_percent;
            }
            last_percent = progress.percent;
            on_progress(progress);
        }

        if let Some(line) = splitter.finish() {
            self.process(line, &mut state);
        }
        on_progress(IngestProgress::complete(processed, total_bytes));

        let metrics = self.metrics.snapshot();
        debug!(?metrics, "ingestion finished");

        Ok(IngestOutcome {
            store: state.store,
            system_config: state.system_config,
            metrics,
        })
    }

    fn process(&self, line: SplitLine, state: &mut RunState) {
        state.line_no += 1;
        self.metrics.record_line();

        let classified = match line {
            SplitLine::Text(text) => self.classifier.classify(&text),
            SplitLine::TooLarge(len) => Err(ParseError::LineTooLarge(len, self.max_line_bytes)),
        };

        match classified {
            Ok(Classified::SystemConfig(config)) => {
                if state.system_config.is_some() {
                    debug!(line = state.line_no, "replacing earlier system configuration");
                }
                self.metrics.record_system_config();
                state.system_config = Some(config);
            }
            Ok(Classified::Activity(mut record)) => {
                let masked = state.redaction.apply(&mut record);
                self.metrics.record_activity(masked);
                state.store.push(record);
            }
            Ok(Classified::Excluded { activity_key }) => {
                state.redaction.observe(&activity_key);
                self.metrics.record_excluded();
            }
            Err(e) => {
                self.metrics.record_skip(SkipReason::from(&e));
                match &e {
                    ParseError::MissingSeparator => debug!(line = state.line_no, "skipping line: {}", e),
                    _ => warn!(line = state.line_no, "skipping line: {}", e),
                }
            }
        }
    }
}
