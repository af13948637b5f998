//! Ordering of replication-key values
//!
//! Cursors are ISO 8601 strings. Values that parse as timestamps or dates
//! are compared chronologically so that `2021-01-01` and
//! `2021-01-01T00:00:00Z` agree; anything else falls back to plain
//! lexicographic order.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use std::cmp::Ordering;

pub(crate) fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Total order over cursor values
pub fn compare_cursors(a: &str, b: &str) -> Ordering {
    match (parse_instant(a), parse_instant(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

/// `true` when `candidate` sorts strictly after `floor`
pub fn is_after(candidate: &str, floor: &str) -> bool {
    compare_cursors(candidate, floor) == Ordering::Greater
}

/// The later of two optional cursors
pub fn max_cursor(current: Option<String>, candidate: Option<&str>) -> Option<String> {
    match (current, candidate) {
        (Some(cur), Some(cand)) if is_after(cand, &cur) => Some(cand.to_string()),
        (Some(cur), _) => Some(cur),
        (None, cand) => cand.map(ToString::to_string),
    }
}

/// Render a JSON scalar as a cursor string
pub fn cursor_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
