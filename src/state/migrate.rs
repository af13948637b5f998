//! Reading state documents written by older releases
//!
//! Three shapes have been written over time:
//!
//! ```text
//! {"bookmarks": {"<stream>": {"since": v}}}              flat, fixed key
//! {"bookmarks": {"<org>": {"<stream>": {"since": v}}}}   nested by organization
//! {"bookmarks": {"<stream>": {"<replication_key>": v}}}  current
//! ```
//!
//! Each may also appear without the `bookmarks` wrapper. [`migrate`] folds
//! every value it can reach for a catalog stream into the current shape,
//! keeping the latest cursor when several shapes disagree.

use super::cursor::{cursor_from_value, max_cursor};
use super::types::{State, StreamState};
use crate::catalog::Catalog;
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::{debug, info};

/// Key the first releases stored every cursor under
pub const LEGACY_CURSOR_KEY: &str = "since";

/// Objects in `raw` that may hold stream entries
fn containers(raw: &Value) -> Vec<&Map<String, Value>> {
    let mut found = Vec::new();
    if let Some(bookmarks) = raw.get("bookmarks").and_then(Value::as_object) {
        found.push(bookmarks);
    }
    if let Some(top) = raw.as_object() {
        found.push(top);
    }
    found
}

/// Cursor values in one stream entry, current key first
fn entry_cursors<'a>(entry: &'a Value, key: &str) -> impl Iterator<Item = String> + 'a {
    let obj = entry.as_object();
    [key.to_string(), LEGACY_CURSOR_KEY.to_string()]
        .into_iter()
        .filter_map(move |k| obj.and_then(|o| o.get(&k)).and_then(cursor_from_value))
}

/// Rewrite any known state shape into the current [`State`]
///
/// Streams without a resolvable cursor are left absent so the run falls
/// back to the configured start date. Running this on its own output
/// returns the same state.
pub fn migrate(raw: &Value, catalog: &Catalog) -> State {
    let mut state = State::new();
    let stream_ids: HashSet<&str> = catalog
        .streams
        .iter()
        .map(|s| s.tap_stream_id.as_str())
        .collect();
    let containers = containers(raw);

    for stream in &catalog.streams {
        let stream_id = stream.tap_stream_id.as_str();
        let key = stream.bookmark_key();
        let mut best: Option<String> = None;

        for container in &containers {
            if let Some(entry) = container.get(stream_id) {
                for cursor in entry_cursors(entry, key) {
                    best = max_cursor(best, Some(&cursor));
                }
            }

            let orgs = container.iter().filter(|(name, _)| {
                name.as_str() != "bookmarks" && !stream_ids.contains(name.as_str())
            });
            for (org, nested) in orgs {
                if let Some(entry) = nested.get(stream_id) {
                    for cursor in entry_cursors(entry, key) {
                        debug!(stream = stream_id, org = org.as_str(), "organization-scoped bookmark");
                        best = max_cursor(best, Some(&cursor));
                    }
                }
            }
        }

        if let Some(cursor) = best {
            state.set_bookmark(stream_id, key, cursor);
        }
    }

    // Current-shape entries for streams this catalog doesn't know about
    if let Some(bookmarks) = raw.get("bookmarks").and_then(Value::as_object) {
        for (name, entry) in bookmarks {
            if stream_ids.contains(name.as_str()) {
                continue;
            }
            if let Some(kept) = scalar_entry(entry) {
                state.bookmarks.insert(name.clone(), kept);
            }
        }
    }

    let was_current = current_shape(raw).as_ref() == Some(&state);
    if raw.as_object().is_some_and(|o| !o.is_empty()) && !was_current {
        info!(
            streams = state.bookmarks.len(),
            "migrated state document to current bookmark layout"
        );
    }

    state
}

/// An entry whose values are all cursors, i.e. not an organization container
fn scalar_entry(entry: &Value) -> Option<StreamState> {
    let obj = entry.as_object()?;
    if obj.is_empty() {
        return None;
    }
    let mut kept = StreamState::new();
    for (key, value) in obj {
        kept.set(key, cursor_from_value(value)?);
    }
    Some(kept)
}

fn current_shape(raw: &Value) -> Option<State> {
    serde_json::from_value(raw.clone()).ok()
}
