use serde_json::{Map, Value};
use tracing::trace;

use super::{MASK, PASSWORD_ACTIVITY, SENSITIVE_ACTIVITIES};
use crate::parser::activity::{ACTIVITY_NAME_KEY, OUTPUT_RESULT_KEY};
use crate::parser::{normalize_activity_name, ActivityRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RedactionState {
    #[default]
    Normal,
    /// The previous activity retrieved a password
    SawPassword,
}

impl RedactionState {
    /// Transition on the next activity's comparison key.
    pub fn next(self, activity_key: &str) -> Self {
        if activity_key == PASSWORD_ACTIVITY {
            RedactionState::SawPassword
        } else {
            RedactionState::Normal
        }
    }
}

pub fn is_sensitive(activity_key: &str) -> bool {
    SENSITIVE_ACTIVITIES.contains(&activity_key)
}

/// The adjacency rule on its own: mask `current` when `previous` fetched a password.
pub fn should_mask(previous_key: &str, current_key: &str) -> bool {
    previous_key == PASSWORD_ACTIVITY && is_sensitive(current_key)
}

/// Read-time re-masking of an archived payload.
///
/// Both keys are re-derived from the payloads themselves; no stored
/// masked/unmasked flag is consulted. The archive is never modified,
/// a masked copy is returned instead.
pub fn mask_payload(previous: Option<&Map<String, Value>>, current: &Map<String, Value>) -> Map<String, Value> {
    let mut view = current.clone();
    let Some(previous) = previous else {
        return view;
    };

    if should_mask(&payload_key(previous), &payload_key(current)) {
        view.insert(OUTPUT_RESULT_KEY.to_string(), Value::String(MASK.to_string()));
    }
    view
}

fn payload_key(payload: &Map<String, Value>) -> String {
    payload
        .get(ACTIVITY_NAME_KEY)
        .and_then(Value::as_str)
        .map(normalize_activity_name)
        .unwrap_or_default()
}

/// Live, strictly sequential masking pass over one file.
///
/// Must see every activity in file order, including excluded
/// `start` / `end` markers, which reset the state like any other activity.
#[derive(Debug, Default)]
pub struct RedactionFilter {
    state: RedactionState,
}

impl RedactionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RedactionState {
        self.state
    }

    /// Mask `record.output_result` if required, then advance the state.
    /// Returns whether the record was masked.
    pub fn apply(&mut self, record: &mut ActivityRecord) -> bool {
        let masked = self.state == RedactionState::SawPassword && is_sensitive(&record.activity_key);
        if masked {
            trace!(timestamp = %record.timestamp, activity = %record.activity_key, "masking output result");
            record.output_result = MASK.to_string();
        }
        self.state = self.state.next(&record.activity_key);
        masked
    }

    /// Advance the state for an activity that is not stored.
    pub fn observe(&mut self, activity_key: &str) {
        self.state = self.state.next(activity_key);
    }
}
