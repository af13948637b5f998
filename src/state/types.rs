//! State types for tracking sync progress
//!
//! These types are serialized to JSON and emitted between streams:
//!
//! ```json
//! {"bookmarks": {"milestones": {"updated_at": "2021-01-01T00:00:00Z"}}}
//! ```

use super::cursor::max_cursor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complete bookmark document for a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    /// Per-stream cursors
    #[serde(default)]
    pub bookmarks: BTreeMap<String, StreamState>,
}

impl State {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get state for a stream
    pub fn get_stream(&self, stream: &str) -> Option<&StreamState> {
        self.bookmarks.get(stream)
    }

    /// Get the cursor stored for `stream` under `key`
    pub fn get_bookmark(&self, stream: &str, key: &str) -> Option<&str> {
        self.bookmarks.get(stream)?.get(key)
    }

    /// Overwrite the cursor for `stream` under `key`
    pub fn set_bookmark(
        &mut self,
        stream: &str,
        key: &str,
        value: impl Into<String>,
    ) -> &mut Self {
        self.bookmarks
            .entry(stream.to_string())
            .or_default()
            .set(key, value);
        self
    }

    /// Move the cursor forward to `candidate` if it is later than the stored one
    ///
    /// Returns the cursor in effect afterwards.
    pub fn advance_bookmark(&mut self, stream: &str, key: &str, candidate: &str) -> Option<&str> {
        let current = self.get_bookmark(stream, key).map(ToString::to_string);
        if let Some(next) = max_cursor(current, Some(candidate)) {
            self.set_bookmark(stream, key, next);
        }
        self.get_bookmark(stream, key)
    }

    /// Whether no stream has a bookmark yet
    pub fn is_empty(&self) -> bool {
        self.bookmarks.values().all(StreamState::is_empty)
    }
}

/// Cursor values for one stream, keyed by replication-key name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamState {
    cursors: BTreeMap<String, String>,
}

impl StreamState {
    /// Create a new empty stream state
    pub fn new() -> Self {
        Self::default()
    }

    /// Cursor stored under `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.cursors.get(key).map(String::as_str)
    }

    /// Store a cursor under `key`
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.cursors.insert(key.to_string(), value.into());
    }

    /// Iterate over `(key, cursor)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cursors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whether no cursor is stored
    pub fn is_empty(&self) -> bool {
        self.cursors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_state_default() {
        let state = State::new();
        assert!(state.bookmarks.is_empty());
        assert!(state.is_empty());
    }

    #[test]
    fn test_get_set_bookmark() {
        let mut state = State::new();
        assert!(state.get_bookmark("clients", "updated_at").is_none());

        state.set_bookmark("clients", "updated_at", "2021-01-01T00:00:00Z");
        assert_eq!(
            state.get_bookmark("clients", "updated_at"),
            Some("2021-01-01T00:00:00Z")
        );
        assert!(state.get_bookmark("clients", "since").is_none());
        assert!(state.get_bookmark("persons", "updated_at").is_none());
    }

    #[test]
    fn test_advance_is_monotonic() {
        let mut state = State::new();
        state.advance_bookmark("cards", "updated_at", "2021-02-01");
        state.advance_bookmark("cards", "updated_at", "2020-12-31");
        assert_eq!(state.get_bookmark("cards", "updated_at"), Some("2021-02-01"));

        state.advance_bookmark("cards", "updated_at", "2021-03-01");
        assert_eq!(state.get_bookmark("cards", "updated_at"), Some("2021-03-01"));
    }

    #[test]
    fn test_state_serialization_shape() {
        let mut state = State::new();
        state.set_bookmark("milestones", "updated_at", "2021-01-01");

        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(
            value,
            json!({"bookmarks": {"milestones": {"updated_at": "2021-01-01"}}})
        );

        let restored: State = serde_json::from_value(value).unwrap();
        assert_eq!(restored, state);
    }
}
