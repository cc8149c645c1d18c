use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use grep_matcher::Matcher;
use grep_regex::{RegexMatcher, RegexMatcherBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::parser::ActivityRecord;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid activity filter: {0}")]
    InvalidPattern(String),

    #[error("Unknown error filter '{0}' (expected any, yes or no)")]
    UnknownDisposition(String),
}

/// Which records to keep based on their status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorDisposition {
    #[default]
    Any,
    /// Only records whose status is `error`
    OnlyError,
    /// Only records whose status is anything but `error`
    OnlyNonError,
}

impl ErrorDisposition {
    pub fn accepts(self, record: &ActivityRecord) -> bool {
        match self {
            ErrorDisposition::Any => true,
            ErrorDisposition::OnlyError => record.is_error(),
            ErrorDisposition::OnlyNonError => !record.is_error(),
        }
    }
}

impl FromStr for ErrorDisposition {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "any" | "all" => Ok(ErrorDisposition::Any),
            "yes" | "only" | "error" | "errors" => Ok(ErrorDisposition::OnlyError),
            "no" | "none" | "ok" => Ok(ErrorDisposition::OnlyNonError),
            other => Err(FilterError::UnknownDisposition(other.to_string())),
        }
    }
}

impl fmt::Display for ErrorDisposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorDisposition::Any => "Any",
            ErrorDisposition::OnlyError => "Yes",
            ErrorDisposition::OnlyNonError => "No",
        })
    }
}

/// Filter criteria as entered by the user. Pure value, never touches records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Case-insensitive substring of the activity name; empty matches all
    pub activity: String,
    pub errors: ErrorDisposition,
}

impl FilterSpec {
    pub fn new(activity: impl Into<String>, errors: ErrorDisposition) -> Self {
        Self {
            activity: activity.into(),
            errors,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.activity.is_empty() && self.errors == ErrorDisposition::Any
    }
}

#[derive(Debug, Default)]
pub struct FilterStats {
    pub records_scanned: AtomicU64,
    pub records_matched: AtomicU64,
}

/// Compiled form of a [`FilterSpec`].
pub struct FilterEngine {
    matcher: Option<RegexMatcher>,
    errors: ErrorDisposition,
    stats: FilterStats,
}

impl FilterEngine {
    pub fn new(spec: &FilterSpec) -> Result<Self, FilterError> {
        let matcher = if spec.activity.is_empty() {
            None
        } else {
            let matcher = RegexMatcherBuilder::new()
                .case_insensitive(true)
                .fixed_strings(true)
                .multi_line(false)
                .build(&spec.activity)
                .map_err(|e| FilterError::InvalidPattern(e.to_string()))?;
            Some(matcher)
        };

        Ok(Self {
            matcher,
            errors: spec.errors,
            stats: FilterStats::default(),
        })
    }

    /// A filter that accepts every record.
    pub fn pass_all() -> Self {
        Self {
            matcher: None,
            errors: ErrorDisposition::Any,
            stats: FilterStats::default(),
        }
    }

    #[inline]
    pub fn matches(&self, record: &ActivityRecord) -> bool {
        self.stats.records_scanned.fetch_add(1, Ordering::Relaxed);

        let name_ok = match &self.matcher {
            Some(matcher) => matcher
                .is_match(record.activity_name.as_bytes())
                .unwrap_or(false),
            None => true,
        };

        let include = name_ok && self.errors.accepts(record);
        if include {
            self.stats.records_matched.fetch_add(1, Ordering::Relaxed);
        }
        include
    }

    pub fn stats(&self) -> (u64, u64) {
        (
            self.stats.records_scanned.load(Ordering::Relaxed),
            self.stats.records_matched.load(Ordering::Relaxed),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ActivityOutcome, ActivityRecordBuilder, LineRecordParser};

    fn activity(name: &str, status: &str) -> ActivityRecord {
        let line = format!(r#"ts {{"activity_name":"{}","status":"{}"}}"#, name, status);
        match ActivityRecordBuilder.build(LineRecordParser::new().parse(&line).unwrap()) {
            ActivityOutcome::Record(r) => r,
            ActivityOutcome::Excluded { .. } => panic!("unexpected exclusion"),
        }
    }

    #[test]
    fn test_empty_spec_matches_everything() {
        let filter = FilterEngine::new(&FilterSpec::default()).expect("Failed to create filter");
        assert!(filter.matches(&activity("click", "success")));
        assert!(filter.matches(&activity("", "error")));
    }

    #[test]
    fn test_activity_substring_case_insensitive() {
        let filter = FilterEngine::new(&FilterSpec::new("BROWSER", ErrorDisposition::Any))
            .expect("Failed to create filter");

        assert!(filter.matches(&activity("Input to browser", "success")));
        assert!(filter.matches(&activity("Open Browser", "success")));
        assert!(!filter.matches(&activity("Click", "success")));
    }

    #[test]
    fn test_activity_filter_is_literal() {
        let filter = FilterEngine::new(&FilterSpec::new("(install.exe)", ErrorDisposition::Any))
            .expect("Failed to create filter");

        let line = r#"ts {"activity_name":"Subprogram","fileName":"install.exe"}"#;
        let ActivityOutcome::Record(sub) = ActivityRecordBuilder.build(LineRecordParser::new().parse(line).unwrap()) else {
            panic!("expected record");
        };
        assert!(filter.matches(&sub));
        assert!(!filter.matches(&activity("installexe", "success")));
    }

    #[test]
    fn test_error_disposition() {
        let only = FilterEngine::new(&FilterSpec::new("", ErrorDisposition::OnlyError)).unwrap();
        let none = FilterEngine::new(&FilterSpec::new("", ErrorDisposition::OnlyNonError)).unwrap();

        assert!(only.matches(&activity("click", "error")));
        assert!(!only.matches(&activity("click", "success")));
        assert!(none.matches(&activity("click", "success")));
        assert!(!none.matches(&activity("click", "error")));
    }

    #[test]
    fn test_combined_criteria() {
        let filter = FilterEngine::new(&FilterSpec::new("click", ErrorDisposition::OnlyError)).unwrap();
        assert!(filter.matches(&activity("Click Element", "error")));
        assert!(!filter.matches(&activity("Click Element", "success")));
        assert!(!filter.matches(&activity("Type Text", "error")));
    }

    #[test]
    fn test_disposition_from_str() {
        assert_eq!("Any".parse::<ErrorDisposition>().unwrap(), ErrorDisposition::Any);
        assert_eq!("yes".parse::<ErrorDisposition>().unwrap(), ErrorDisposition::OnlyError);
        assert_eq!("No".parse::<ErrorDisposition>().unwrap(), ErrorDisposition::OnlyNonError);
        assert!("maybe".parse::<ErrorDisposition>().is_err());
    }

    #[test]
    fn test_stats_tracking() {
        let filter = FilterEngine::new(&FilterSpec::new("click", ErrorDisposition::Any)).unwrap();
        filter.matches(&activity("click", ""));
        filter.matches(&activity("type", ""));
        filter.matches(&activity("double click", ""));

        let (scanned, matched) = filter.stats();
        assert_eq!(scanned, 3);
        assert_eq!(matched, 2);
    }
}
