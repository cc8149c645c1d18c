//! Store — ordered activity records with identifier lookup and paging.
//!
//! The store is append-only while a file is being ingested and read-only
//! afterwards. Position in the store is the order records were produced in,
//! which is also the order the read-time redaction rule relies on.

pub mod export;
pub mod record;

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::filter::FilterEngine;
use crate::parser::ActivityRecord;
use crate::redact::mask_payload;

pub use record::{OwnedPage, Page, StoredRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    UnknownRecord(Uuid),

    #[error("Failed to render record: {0}")]
    Export(#[from] serde_json::Error),
}

#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<StoredRecord>,
    index: HashMap<Uuid, usize>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record and return its identifier.
    pub fn push(&mut self, record: ActivityRecord) -> Uuid {
        let stored = StoredRecord::new(record);
        let id = stored.id;
        self.index.insert(id, self.records.len());
        self.records.push(stored);
        id
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StoredRecord> {
        self.records.iter()
    }

    pub fn get(&self, id: &Uuid) -> Option<&StoredRecord> {
        self.position(id).map(|pos| &self.records[pos])
    }

    pub fn position(&self, id: &Uuid) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// `min(offset, total) / total` as a percentage; an empty store is complete.
    pub fn page_progress(&self, offset: usize) -> f64 {
        let total = self.records.len();
        if total == 0 {
            return 100.0;
        }
        offset.min(total) as f64 / total as f64 * 100.0
    }

    /// Records at store positions `[offset, offset + page_size)` that pass the filter.
    ///
    /// The window is taken over the whole store and filtered afterwards, so
    /// a filtered page can hold fewer than `page_size` records.
    pub fn page(&self, offset: usize, page_size: usize, filter: &FilterEngine) -> Page<'_> {
        let start = offset.min(self.records.len());
        let end = offset.saturating_add(page_size).min(self.records.len());

        let records = self.records[start..end]
            .iter()
            .filter(|stored| filter.matches(&stored.record))
            .collect();

        Page {
            offset,
            next_offset: end,
            records,
            progress: self.page_progress(end),
            has_more: end < self.records.len(),
        }
    }

    /// Up to `page_size` matching records, scanning forward from `offset`.
    pub fn filtered_page(&self, offset: usize, page_size: usize, filter: &FilterEngine) -> Page<'_> {
        let mut records = Vec::with_capacity(page_size.min(self.records.len()));
        let mut next_offset = offset.min(self.records.len());

        for stored in self.records.iter().skip(next_offset) {
            if records.len() == page_size {
                break;
            }
            next_offset += 1;
            if filter.matches(&stored.record) {
                records.push(stored);
            }
        }

        Page {
            offset,
            next_offset,
            records,
            progress: self.page_progress(next_offset),
            has_more: next_offset < self.records.len(),
        }
    }

    /// Archived payload for a record, with the adjacency rule re-applied
    /// against the record immediately before it in store order.
    pub fn detail(&self, id: &Uuid) -> Result<Map<String, Value>, StoreError> {
        let pos = self.position(id).ok_or(StoreError::UnknownRecord(*id))?;
        let previous = pos
            .checked_sub(1)
            .map(|prev| self.records[prev].record.payload.as_ref());
        Ok(mask_payload(previous, &self.records[pos].record.payload))
    }

    /// Detail view / clipboard export as 4-space indented JSON.
    pub fn export_json(&self, id: &Uuid) -> Result<String, StoreError> {
        let detail = self.detail(id)?;
        Ok(export::to_pretty_json(&detail)?)
    }

    /// Detail view as indented `key: value` text.
    pub fn export_text(&self, id: &Uuid) -> Result<String, StoreError> {
        let detail = self.detail(id)?;
        Ok(export::to_text(&detail))
    }

    /// The output result cell as stored, after live masking.
    pub fn output_result(&self, id: &Uuid) -> Result<&str, StoreError> {
        self.get(id)
            .map(|stored| stored.record.output_result.as_str())
            .ok_or(StoreError::UnknownRecord(*id))
    }

    /// Distinct display names, sorted. Feeds activity filter suggestions.
    pub fn activity_names(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|stored| stored.record.activity_name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn error_count(&self) -> usize {
        self.records.iter().filter(|stored| stored.record.is_error()).count()
    }

    /// Earliest and latest parsed timestamps, ignoring unparseable ones.
    pub fn time_span(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let mut instants = self.records.iter().filter_map(|stored| stored.record.occurred_at);
        let first = instants.next()?;
        Some(instants.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t))))
    }
}
