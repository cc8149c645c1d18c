use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

use super::traits::*;
use super::value::display_value;

pub const ACTIVITY_NAME_KEY: &str = "activity_name";
pub const EXECUTED_BRANCH_KEY: &str = "executed_branch";
pub const OUTPUT_RESULT_KEY: &str = "output_result";
pub const STATUS_KEY: &str = "status";
pub const ERROR_MESSAGE_KEY: &str = "error_message";
pub const FILE_NAME_KEY: &str = "fileName";

pub const SUBPROGRAM: &str = "subprogram";
/// Marker activities that bracket every run and are never shown.
pub const EXCLUDED_ACTIVITIES: [&str; 2] = ["start", "end"];
/// Status value that marks a failed activity.
pub const ERROR_STATUS: &str = "error";

/// Case-normalize an activity name for comparisons. Idempotent.
pub fn normalize_activity_name(name: &str) -> String {
    name.to_lowercase()
}

/// Display name for an activity: subprograms are suffixed with their file.
pub fn display_name(activity_key: &str, file_name: Option<&str>) -> String {
    match file_name {
        Some(file) if activity_key == SUBPROGRAM && !file.is_empty() => {
            format!("{} ({})", activity_key, file)
        }
        _ => activity_key.to_string(),
    }
}

pub fn is_excluded(activity_key: &str) -> bool {
    EXCLUDED_ACTIVITIES.contains(&activity_key)
}

/// Parse the line timestamp into an instant.
///
/// Accepts RFC 3339, naive ISO-8601 (treated as UTC) and Unix seconds or
/// milliseconds. Anything else yields `None`; the raw token is always kept.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d_%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }

    raw.parse::<i64>().ok().and_then(|ts| {
        if ts > 1_000_000_000_000 {
            DateTime::from_timestamp_millis(ts)
        } else {
            DateTime::from_timestamp(ts, 0)
        }
    })
}

#[derive(Debug, Clone)]
pub enum ActivityOutcome {
    Record(ActivityRecord),
    /// A `start` / `end` marker. Carries the key so redaction can still observe it.
    Excluded { activity_key: String },
}

/// Builds activity records from any payload that is not a system config.
///
/// Every field is optional; absent values become empty strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActivityRecordBuilder;

impl ActivityRecordBuilder {
    pub fn build(&self, line: ParsedLine) -> ActivityOutcome {
        let payload = line.payload;
        let activity_key = normalize_activity_name(&display_value(payload.get(ACTIVITY_NAME_KEY)));

        if is_excluded(&activity_key) {
            return ActivityOutcome::Excluded { activity_key };
        }

        let file_name = payload.get(FILE_NAME_KEY).and_then(Value::as_str);
        let activity_name = display_name(&activity_key, file_name);

        ActivityOutcome::Record(ActivityRecord {
            occurred_at: parse_timestamp(&line.timestamp),
            timestamp: line.timestamp,
            activity_name,
            activity_key,
            status: display_value(payload.get(STATUS_KEY)),
            executed_branch: display_value(payload.get(EXECUTED_BRANCH_KEY)),
            output_result: display_value(payload.get(OUTPUT_RESULT_KEY)),
            error_message: display_value(payload.get(ERROR_MESSAGE_KEY)),
            payload: Arc::new(payload),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::LineRecordParser;
    use chrono::{Datelike, Timelike};

    fn build(line: &str) -> ActivityOutcome {
        ActivityRecordBuilder.build(LineRecordParser::new().parse(line).unwrap())
    }

    fn record(line: &str) -> ActivityRecord {
        match build(line) {
            ActivityOutcome::Record(r) => r,
            ActivityOutcome::Excluded { activity_key } => panic!("unexpected exclusion of {}", activity_key),
        }
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for name in ["Get Password", "INPUT TO BROWSER", "subprogram", "", "Ünïcode Step"] {
            let once = normalize_activity_name(name);
            assert_eq!(normalize_activity_name(&once), once);
        }
        assert_eq!(normalize_activity_name("Get PassWord"), normalize_activity_name("get password"));
    }

    #[test]
    fn test_build_full_record() {
        let r = record(
            r#"2024-03-01T09:00:01 {"activity_name":"Click Element","status":"success","executed_branch":"main","output_result":"done","error_message":""}"#,
        );
        assert_eq!(r.timestamp, "2024-03-01T09:00:01");
        assert_eq!(r.activity_name, "click element");
        assert_eq!(r.activity_key, "click element");
        assert_eq!(r.status, "success");
        assert_eq!(r.executed_branch, "main");
        assert_eq!(r.output_result, "done");
        assert!(!r.is_error());
        assert_eq!(r.payload.get("activity_name"), Some(&Value::String("Click Element".into())));
    }

    #[test]
    fn test_missing_fields_default_empty() {
        let r = record("ts {}");
        assert_eq!(r.activity_name, "");
        assert_eq!(r.status, "");
        assert_eq!(r.executed_branch, "");
        assert_eq!(r.output_result, "");
        assert_eq!(r.error_message, "");
        assert!(r.occurred_at.is_none());
    }

    #[test]
    fn test_non_string_output_rendered_as_json() {
        let r = record(r#"ts {"activity_name":"Read Table","output_result":{"rows":2}}"#);
        assert_eq!(r.output_result, r#"{"rows":2}"#);
    }

    #[test]
    fn test_subprogram_enrichment() {
        let r = record(r#"ts {"activity_name":"Subprogram","fileName":"install.exe"}"#);
        assert_eq!(r.activity_name, "subprogram (install.exe)");
        assert_eq!(r.activity_key, "subprogram");
        assert_eq!(r.file_name(), Some("install.exe"));
    }

    #[test]
    fn test_subprogram_without_file_name() {
        let r = record(r#"ts {"activity_name":"SUBPROGRAM","fileName":""}"#);
        assert_eq!(r.activity_name, "subprogram");
        assert_eq!(r.file_name(), None);
    }

    #[test]
    fn test_file_name_ignored_for_other_activities() {
        let r = record(r#"ts {"activity_name":"Open File","fileName":"a.txt"}"#);
        assert_eq!(r.activity_name, "open file");
    }

    #[test]
    fn test_start_and_end_are_excluded() {
        for name in ["START", "start", "End"] {
            let line = format!(r#"ts {{"activity_name":"{}"}}"#, name);
            match build(&line) {
                ActivityOutcome::Excluded { activity_key } => {
                    assert_eq!(activity_key, name.to_lowercase())
                }
                ActivityOutcome::Record(_) => panic!("{} should be excluded", name),
            }
        }
    }

    #[test]
    fn test_start_substring_not_excluded() {
        let r = record(r#"ts {"activity_name":"Start Process"}"#);
        assert_eq!(r.activity_name, "start process");
    }

    #[test]
    fn test_error_status() {
        let r = record(r#"ts {"activity_name":"Click","status":"error","error_message":"not found"}"#);
        assert!(r.is_error());
        assert_eq!(r.error_message, "not found");
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let rfc = parse_timestamp("2024-03-01T09:00:01Z").unwrap();
        assert_eq!(rfc.hour(), 9);

        let offset = parse_timestamp("2024-03-01T09:00:01+02:00").unwrap();
        assert_eq!(offset.hour(), 7);

        let naive = parse_timestamp("2024-03-01T09:00:01.250").unwrap();
        assert_eq!(naive.day(), 1);

        let millis = parse_timestamp("1709283601000").unwrap();
        assert_eq!(millis.year(), 2024);

        assert!(parse_timestamp("yesterday").is_none());
    }
}
