//! Role references collected while parent streams sync

use super::types::id_segment;
use serde_json::Value;
use std::collections::HashSet;

/// Role ids seen in parent records, and which of them have been fetched
///
/// One accumulator lives for a whole run and is passed explicitly to every
/// parent sync and to the roles step.
#[derive(Debug, Clone, Default)]
pub struct RoleAccumulator {
    observed: Vec<String>,
    fetched: HashSet<String>,
    listing_done: bool,
}

impl RoleAccumulator {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a role id, ignoring duplicates
    pub fn observe(&mut self, role_id: impl Into<String>) {
        let role_id = role_id.into();
        if !self.observed.contains(&role_id) {
            self.observed.push(role_id);
        }
    }

    /// Collect the role referenced by a raw parent record
    ///
    /// `team` and `rates` use `role_id`, cards carry `role` as either an id
    /// or an embedded object.
    pub fn observe_record(&mut self, record: &Value) {
        let reference = record
            .get("role_id")
            .filter(|v| !v.is_null())
            .or_else(|| record.get("role"));
        let id = match reference {
            Some(Value::Object(role)) => role.get("id").and_then(id_segment),
            Some(value) => id_segment(value),
            None => None,
        };
        if let Some(id) = id {
            self.observe(id);
        }
    }

    /// Every role id observed so far, in first-seen order
    pub fn observed(&self) -> &[String] {
        &self.observed
    }

    /// Observed ids that have not been fetched yet
    pub fn pending(&self) -> Vec<String> {
        self.observed
            .iter()
            .filter(|id| !self.fetched.contains(*id))
            .cloned()
            .collect()
    }

    /// Mark one role as fetched
    pub fn mark_fetched(&mut self, role_id: &str) {
        self.fetched.insert(role_id.to_string());
    }

    /// Record that the full `roles` listing was synced
    pub fn mark_listed<I, S>(&mut self, role_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.listing_done = true;
        self.fetched.extend(role_ids.into_iter().map(Into::into));
    }

    /// Whether the full listing has already been synced this run
    pub fn listing_done(&self) -> bool {
        self.listing_done
    }

    /// Whether no role was referenced
    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }
}
