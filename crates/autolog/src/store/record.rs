use serde::Serialize;
use uuid::Uuid;

use crate::parser::ActivityRecord;

/// An activity as held by the store, correlated by an opaque identifier.
#[derive(Debug, Clone, Serialize)]
pub struct StoredRecord {
    pub id: Uuid,
    #[serde(flatten)]
    pub record: ActivityRecord,
}

impl StoredRecord {
    pub fn new(record: ActivityRecord) -> Self {
        Self {
            id: Uuid::new_v4(),
            record,
        }
    }
}

/// One page of records in insertion order.
#[derive(Debug, Clone)]
pub struct Page<'a> {
    /// Store position the page started at
    pub offset: usize,
    /// Store position to request next
    pub next_offset: usize,
    pub records: Vec<&'a StoredRecord>,
    /// Share of the store consumed once this page is shown, 0.0 ..= 100.0
    pub progress: f64,
    pub has_more: bool,
}

impl<'a> Page<'a> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn to_owned_page(&self) -> OwnedPage {
        OwnedPage {
            offset: self.offset,
            next_offset: self.next_offset,
            records: self.records.iter().map(|r| (*r).clone()).collect(),
            progress: self.progress,
            has_more: self.has_more,
        }
    }
}

/// A page detached from the store, for callers that cannot hold a borrow.
#[derive(Debug, Clone, Serialize)]
pub struct OwnedPage {
    pub offset: usize,
    pub next_offset: usize,
    pub records: Vec<StoredRecord>,
    pub progress: f64,
    pub has_more: bool,
}
