/// Log line parsing and classification module
///
/// Turns one raw automatic-log line into a typed record:
/// a machine system configuration, a workflow activity, an excluded
/// marker activity (`start` / `end`), or a parse failure.
///
/// # Architecture
///
/// - `line.rs`: timestamp / JSON payload split (`LineRecordParser`)
/// - `system.rs`: system configuration recognition (`SystemConfigExtractor`)
/// - `activity.rs`: activity normalization and enrichment (`ActivityRecordBuilder`)
/// - `classify.rs`: orchestrates the extractors for a single line
/// - `traits.rs`: the extractor seam shared by the two record kinds
/// - `metrics.rs`: per-run ingestion counters
///
/// # Safety Guarantees
///
/// - Line size limits (oversized lines are rejected, never buffered twice)
/// - Field-level problems never abort a scan: a malformed config line falls
///   through to activity handling, missing activity fields take defaults

pub mod activity;
pub mod classify;
pub mod line;
pub mod metrics;
pub mod model;
pub mod system;
pub mod traits;
mod value;

// Re-export commonly used types
pub use activity::{normalize_activity_name, ActivityOutcome, ActivityRecordBuilder};
pub use classify::LineClassifier;
pub use line::LineRecordParser;
pub use model::{ActivityRecord, Classified, ParseError, ParsedLine};
pub use system::{StorageDevice, SystemConfigExtractor, SystemConfigRecord, SystemConfigSnapshot};
pub use traits::{Extraction, PayloadExtractor};

// Constants
pub const MAX_LINE_SIZE: usize = 1_048_576; // 1MB
/// Key under which the line timestamp is stored in the archived payload.
pub const TIMESTAMP_KEY: &str = "timestamp";
