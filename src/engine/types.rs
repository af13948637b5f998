//! Engine types
//!
//! Run statistics for the sync engine.

use crate::strategy::StreamOutcome;

/// Statistics from a sync run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// GET requests issued
    pub requests: usize,
    /// Records returned by the API
    pub records_fetched: usize,
    /// Records written to the sink
    pub records_emitted: usize,
    /// Streams completed
    pub streams_synced: usize,
    /// Fan-out units skipped on 404
    pub units_skipped: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl SyncStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a request made outside any stream
    pub fn add_request(&mut self) {
        self.requests += 1;
    }

    /// Fold in a completed stream
    pub fn add_stream(&mut self, outcome: &StreamOutcome) {
        self.requests += outcome.requests;
        self.records_fetched += outcome.records_fetched;
        self.records_emitted += outcome.records_emitted;
        self.units_skipped += outcome.units_skipped;
        self.streams_synced += 1;
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}
