use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use super::model::ParseError;

/// Skip reasons for metrics recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No whitespace between timestamp and payload (includes blank lines)
    MissingSeparator,
    /// Payload was not a JSON object
    InvalidPayload,
    /// Line exceeded the configured size limit
    TooLarge,
}

impl From<&ParseError> for SkipReason {
    fn from(err: &ParseError) -> Self {
        match err {
            ParseError::MissingSeparator => SkipReason::MissingSeparator,
            ParseError::LineTooLarge(..) => SkipReason::TooLarge,
            ParseError::InvalidPayload(_) | ParseError::NotAnObject => SkipReason::InvalidPayload,
        }
    }
}

/// Line-level counters
#[derive(Debug, Default)]
pub struct LineMetrics {
    pub seen: AtomicU64,
    pub parsed: AtomicU64,
    pub bytes: AtomicU64,
}

/// Counters by classification outcome
#[derive(Debug, Default)]
pub struct RecordMetrics {
    pub system_config: AtomicU64,
    pub activities: AtomicU64,
    pub excluded: AtomicU64,
    pub masked: AtomicU64,
}

/// Skip counters by reason
#[derive(Debug, Default)]
pub struct SkipMetrics {
    pub missing_separator: AtomicU64,
    pub invalid_payload: AtomicU64,
    pub too_large: AtomicU64,
}

/// Counters for one ingestion run.
///
/// The worker thread writes while the polling side reads for progress
/// display, so every field is an atomic with `Ordering::Relaxed`.
/// `snapshot()` is not transactional across fields.
#[derive(Debug, Default)]
pub struct IngestMetrics {
    pub lines: LineMetrics,
    pub records: RecordMetrics,
    pub skips: SkipMetrics,
}

impl IngestMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_bytes(&self, bytes: u64) {
        self.lines.bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_line(&self) {
        self.lines.seen.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_system_config(&self) {
        self.lines.parsed.fetch_add(1, Ordering::Relaxed);
        self.records.system_config.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_activity(&self, masked: bool) {
        self.lines.parsed.fetch_add(1, Ordering::Relaxed);
        self.records.activities.fetch_add(1, Ordering::Relaxed);
        if masked {
            self.records.masked.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub fn record_excluded(&self) {
        self.lines.parsed.fetch_add(1, Ordering::Relaxed);
        self.records.excluded.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_skip(&self, reason: SkipReason) {
        match reason {
            SkipReason::MissingSeparator => self.skips.missing_separator.fetch_add(1, Ordering::Relaxed),
            SkipReason::InvalidPayload => self.skips.invalid_payload.fetch_add(1, Ordering::Relaxed),
            SkipReason::TooLarge => self.skips.too_large.fetch_add(1, Ordering::Relaxed),
        };
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let skipped = self.skips.missing_separator.load(Ordering::Relaxed)
            + self.skips.invalid_payload.load(Ordering::Relaxed)
            + self.skips.too_large.load(Ordering::Relaxed);

        MetricsSnapshot {
            lines_seen: self.lines.seen.load(Ordering::Relaxed),
            lines_parsed: self.lines.parsed.load(Ordering::Relaxed),
            lines_skipped: skipped,
            bytes_processed: self.lines.bytes.load(Ordering::Relaxed),
            system_config_records: self.records.system_config.load(Ordering::Relaxed),
            activity_records: self.records.activities.load(Ordering::Relaxed),
            excluded_records: self.records.excluded.load(Ordering::Relaxed),
            masked_records: self.records.masked.load(Ordering::Relaxed),
            skipped_missing_separator: self.skips.missing_separator.load(Ordering::Relaxed),
            skipped_invalid_payload: self.skips.invalid_payload.load(Ordering::Relaxed),
            skipped_too_large: self.skips.too_large.load(Ordering::Relaxed),
        }
    }
}

/// A read-only snapshot of ingestion metrics, cheap to clone and log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub lines_seen: u64,
    pub lines_parsed: u64,
    pub lines_skipped: u64,
    pub bytes_processed: u64,
    pub system_config_records: u64,
    pub activity_records: u64,
    pub excluded_records: u64,
    pub masked_records: u64,
    pub skipped_missing_separator: u64,
    pub skipped_invalid_payload: u64,
    pub skipped_too_large: u64,
}
