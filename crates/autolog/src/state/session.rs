//! Session — one open log file, replaced wholesale on each successful load.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{RwLock, RwLockReadGuard};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::conf::ParserConfig;
use crate::filter::{FilterEngine, FilterError, FilterSpec};
use crate::ingest::{self, IngestError, IngestHandle};
use crate::parser::metrics::MetricsSnapshot;
use crate::parser::{LineRecordParser, SystemConfigRecord, SystemConfigSnapshot};
use crate::store::{OwnedPage, RecordStore, StoreError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("Ingestion in progress, try again once loading finishes")]
    Busy,
}

/// Results of the last successful load.
#[derive(Debug, Default)]
pub struct SessionData {
    pub path: Option<PathBuf>,
    pub store: RecordStore,
    pub system_config: Option<SystemConfigRecord>,
    pub metrics: MetricsSnapshot,
}

/// What the worker reports back once a load has been installed.
#[derive(Debug, Clone, Serialize)]
pub struct IngestSummary {
    pub path: PathBuf,
    pub records: usize,
    pub errors: usize,
    pub has_system_config: bool,
    /// First and last parsed activity timestamps
    pub time_span: Option<(DateTime<Utc>, DateTime<Utc>)>,
    /// Distinct activity names, for filter suggestions
    pub activities: Vec<String>,
    pub metrics: MetricsSnapshot,
}

/// Clears the loading flag when the worker is done with it, on every path.
struct LoadingGuard(Arc<AtomicBool>);

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct LogSession {
    config: ParserConfig,
    parser: LineRecordParser,
    loading: Arc<AtomicBool>,
    data: Arc<RwLock<SessionData>>,
}

pub type SharedSession = Arc<LogSession>;

impl LogSession {
    pub fn new(config: ParserConfig) -> Self {
        Self {
            parser: LineRecordParser::with_config(config.line_parser()),
            config,
            loading: Arc::new(AtomicBool::new(false)),
            data: Arc::new(RwLock::new(SessionData::default())),
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Take the loading flag, or fail if a load already holds it.
    fn begin_loading(&self) -> Result<LoadingGuard, SessionError> {
        self.loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| IngestError::InProgress)?;
        Ok(LoadingGuard(Arc::clone(&self.loading)))
    }

    /// Validate `path` and start ingesting it in the background.
    ///
    /// Fails immediately if another load is running or the file does not
    /// look like an execution log; the current data is untouched either way.
    /// On success the returned handle resolves once the new data is
    /// installed. A read failure mid-way keeps the previous data.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime: the ingestion worker is
    /// spawned onto the current runtime's blocking pool.
    pub fn open(&self, path: impl AsRef<Path>) -> Result<IngestHandle<IngestSummary>, SessionError> {
        let path = path.as_ref().to_path_buf();

        let guard = self.begin_loading().inspect_err(|_| {
            warn!("Rejected open of {}: ingestion in progress", path.display());
        })?;

        ingest::validate_file(&path, self.config.validation_sample_lines, &self.parser)?;
        info!("Opening {}", path.display());

        let data = Arc::clone(&self.data);
        let installed_path = path.clone();
        Ok(ingest::spawn_with(path, &self.config, move |result| {
            let _guard = guard;
            let outcome = result?;

            let summary = IngestSummary {
                path: installed_path.clone(),
                records: outcome.store.len(),
                errors: outcome.store.error_count(),
                has_system_config: outcome.system_config.is_some(),
                time_span: outcome.store.time_span(),
                activities: outcome.store.activity_names(),
                metrics: outcome.metrics.clone(),
            };

            *data.write() = SessionData {
                path: Some(installed_path),
                store: outcome.store,
                system_config: outcome.system_config,
                metrics: outcome.metrics,
            };
            Ok(summary)
        }))
    }

    /// Read access to the installed data, refused while a load is running.
    pub fn read(&self) -> Result<RwLockReadGuard<'_, SessionData>, SessionError> {
        if self.is_loading() {
            return Err(SessionError::Busy);
        }
        Ok(self.data.read())
    }

    /// Store window `[offset, offset + page_size)` filtered by `spec`.
    pub fn page(&self, offset: usize, spec: &FilterSpec) -> Result<OwnedPage, SessionError> {
        let filter = FilterEngine::new(spec)?;
        let data = self.read()?;
        let page = data.store.page(offset, self.config.page_size, &filter).to_owned_page();
        log_filter_stats(&filter);
        Ok(page)
    }

    /// Up to `page_size` matching records starting at store position `offset`.
    pub fn filtered_page(&self, offset: usize, spec: &FilterSpec) -> Result<OwnedPage, SessionError> {
        let filter = FilterEngine::new(spec)?;
        let data = self.read()?;
        let page = data
            .store
            .filtered_page(offset, self.config.page_size, &filter)
            .to_owned_page();
        log_filter_stats(&filter);
        Ok(page)
    }

    pub fn detail_json(&self, id: &Uuid) -> Result<String, SessionError> {
        Ok(self.read()?.store.export_json(id)?)
    }

    pub fn detail_text(&self, id: &Uuid) -> Result<String, SessionError> {
        Ok(self.read()?.store.export_text(id)?)
    }

    pub fn output_result(&self, id: &Uuid) -> Result<String, SessionError> {
        Ok(self.read()?.store.output_result(id)?.to_string())
    }

    /// Labelled system configuration, `N/A` everywhere when none was seen.
    pub fn system_config(&self) -> Result<SystemConfigSnapshot, SessionError> {
        let data = self.read()?;
        Ok(data
            .system_config
            .as_ref()
            .map(SystemConfigRecord::snapshot)
            .unwrap_or_default())
    }
}

fn log_filter_stats(filter: &FilterEngine) {
    let (scanned, matched) = filter.stats();
    debug!(scanned, matched, "page filtered");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::ErrorDisposition;
    use crate::redact::MASK;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn session() -> LogSession {
        LogSession::new(ParserConfig {
            page_size: 2,
            poll_interval_ms: 5,
            ..Default::default()
        })
    }

    fn log_file(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file.flush().unwrap();
        file
    }

    fn sample() -> NamedTempFile {
        log_file(&[
            r#"2024-01-01T00:00:00 {"activity_name":"Start"}"#,
            r#"2024-01-01T00:00:01 {"activity_name":"Get Password","output_result":"pw"}"#,
            r#"2024-01-01T00:00:02 {"activity_name":"Input to browser","output_result":"pw"}"#,
            r#"2024-01-01T00:00:03 {"activity_name":"Click","status":"error","error_message":"not found"}"#,
            r#"2024-01-01T00:00:04 {"activity_name":"End"}"#,
        ])
    }

    #[tokio::test]
    async fn test_open_and_query() {
        let session = session();
        let file = sample();

        let summary = session.open(file.path()).unwrap().wait().await.unwrap();
        assert_eq!(summary.records, 3);
        assert_eq!(summary.errors, 1);
        assert!(!summary.has_system_config);
        assert!(!session.is_loading());

        let page = session.page(0, &FilterSpec::default()).unwrap();
        assert_eq!(page.records.len(), 2);
        assert!(page.has_more);

        let input_id = page.records[1].id;
        assert_eq!(session.output_result(&input_id).unwrap(), MASK);
        assert!(session.detail_json(&input_id).unwrap().contains(MASK));

        let errors = session
            .filtered_page(0, &FilterSpec::new("", ErrorDisposition::OnlyError))
            .unwrap();
        assert_eq!(errors.records.len(), 1);
        assert_eq!(errors.records[0].record.error_message, "not found");

        let snapshot = session.system_config().unwrap();
        assert_eq!(snapshot.get("CPU Name"), Some("N/A"));
    }

    #[tokio::test]
    async fn test_invalid_file_leaves_state_unchanged() {
        let session = session();
        let good = sample();
        session.open(good.path()).unwrap().wait().await.unwrap();

        let bad = log_file(&["2024-01-01T00:00:00 not json"]);
        let err = session.open(bad.path()).unwrap_err();
        assert!(matches!(err, SessionError::Ingest(IngestError::InvalidFormat { line: 1, .. })));
        assert!(!session.is_loading());

        let data = session.read().unwrap();
        assert_eq!(data.store.len(), 3);
        assert_eq!(data.path.as_deref(), Some(good.path()));
    }

    #[tokio::test]
    async fn test_second_open_rejected_while_loading() {
        let session = session();
        let file = sample();

        let guard = session.begin_loading().unwrap();
        assert!(session.is_loading());
        assert!(matches!(
            session.open(file.path()),
            Err(SessionError::Ingest(IngestError::InProgress))
        ));
        assert!(matches!(session.read(), Err(SessionError::Busy)));
        assert!(matches!(session.page(0, &FilterSpec::default()), Err(SessionError::Busy)));

        drop(guard);
        assert!(!session.is_loading());
        let summary = session.open(file.path()).unwrap().wait().await.unwrap();
        assert_eq!(summary.records, 3);
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_summary_lists_names_and_span() {
        let session = session();
        let file = sample();

        let summary = session.open(file.path()).unwrap().wait().await.unwrap();
        assert_eq!(summary.activities, vec!["click", "get password", "input to browser"]);
        let (first, last) = summary.time_span.unwrap();
        assert_eq!((last - first).num_seconds(), 2);
    }

    #[tokio::test]
    async fn test_missing_file_rejected() {
        let session = session();
        let err = session.open("/nonexistent/run.log").unwrap_err();
        assert!(matches!(err, SessionError::Ingest(IngestError::Io { .. })));
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_unknown_record() {
        let session = session();
        let err = session.detail_json(&Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, SessionError::Store(StoreError::UnknownRecord(_))));
    }
}
