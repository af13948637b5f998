//! Record inclusion and cursor tracking
//!
//! Inclusion decides what is emitted. The cursor tracker sees every
//! record, emitted or not, so the bookmark always reflects the highest
//! value observed.

use crate::state::{is_after, max_cursor};
use crate::types::ReplicationMethod;

/// Decides which records of a stream are emitted
#[derive(Debug, Clone)]
pub struct RecordFilter {
    method: ReplicationMethod,
    bypass_date: bool,
    bookmark: Option<String>,
    start_date: String,
}

impl RecordFilter {
    /// Create a filter for one stream sync
    pub fn new(
        method: ReplicationMethod,
        bypass_date: bool,
        bookmark: Option<String>,
        start_date: impl Into<String>,
    ) -> Self {
        Self {
            method,
            bypass_date,
            bookmark,
            start_date: start_date.into(),
        }
    }

    /// Replication method in effect
    pub fn method(&self) -> ReplicationMethod {
        self.method
    }

    /// The value a record must exceed, or `None` when everything passes
    ///
    /// Full-table streams always compare against the start date. Incremental
    /// reference streams skip the comparison, other incremental streams use
    /// the bookmark, falling back to the start date on a first run.
    pub fn floor(&self) -> Option<&str> {
        match self.method {
            ReplicationMethod::FullTable => Some(&self.start_date),
            ReplicationMethod::Incremental if self.bypass_date => None,
            ReplicationMethod::Incremental => {
                Some(self.bookmark.as_deref().unwrap_or(&self.start_date))
            }
        }
    }

    /// Whether a record with this replication-key value is emitted
    ///
    /// Records without a value cannot be compared and are kept.
    pub fn admits(&self, cursor: Option<&str>) -> bool {
        match (self.floor(), cursor) {
            (Some(floor), Some(value)) => is_after(value, floor),
            _ => true,
        }
    }
}

/// Running maximum of replication-key values, seeded with the stored bookmark
#[derive(Debug, Clone, Default)]
pub struct CursorTracker {
    max: Option<String>,
}

impl CursorTracker {
    /// Start tracking from an existing bookmark
    pub fn new(initial: Option<String>) -> Self {
        Self { max: initial }
    }

    /// Record one observed value
    pub fn observe(&mut self, cursor: Option<&str>) {
        self.max = max_cursor(self.max.take(), cursor);
    }

    /// Highest value seen so far
    pub fn max(&self) -> Option<&str> {
        self.max.as_deref()
    }

    /// Consume the tracker, returning the highest value
    pub fn into_max(self) -> Option<String> {
        self.max
    }
}
