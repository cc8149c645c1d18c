//! Redact — two-line adjacency masking of sensitive output results.
//!
//! A secret fetched by a `get password` activity tends to show up in the
//! output of the very next browser input or variable assignment. The live
//! pass masks it while ingesting; the read-time rule re-derives the same
//! decision from store order whenever an archived payload is shown.

pub mod filter;

pub use filter::{is_sensitive, mask_payload, should_mask, RedactionFilter, RedactionState};

/// Replacement for a masked output result.
pub const MASK: &str = "******";

/// Activity whose output makes the next record sensitive.
pub const PASSWORD_ACTIVITY: &str = "get password";

/// Activities that can echo a retrieved password.
pub const SENSITIVE_ACTIVITIES: [&str; 2] = ["input to browser", "assign value to variable"];
