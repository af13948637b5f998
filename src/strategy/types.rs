//! Strategy types
//!
//! How each stream's records are enumerated, and the per-stream settings a
//! strategy runs with.

use crate::catalog::{find_stream, DEFAULT_REPLICATION_KEY};
use crate::error::{Error, Result};
use crate::http::Transport;
use crate::state::State;
use crate::transform::RecordFilter;
use crate::types::ReplicationMethod;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashSet;

/// The stream every project fan-out is enumerated from
pub const PROJECTS_STREAM: &str = "projects";

/// The stream fetched by id from role references
pub const ROLES_STREAM: &str = "roles";

/// Streams whose records reference roles by id
pub const ROLE_PARENT_STREAMS: &[&str] = &["team", "rates", "cards"];

/// How a stream's records are enumerated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStrategy {
    /// One GET of `<stream>`
    Direct,
    /// GET `projects/{id}/<stream>` for every project
    ProjectFanout,
    /// GET `rate_cards/{id}/<stream>` for every rate card
    RateCardFanout,
    /// Fetched by id from references collected during parent syncs
    DependentSubstream,
}

impl StreamStrategy {
    /// Strategy for a stream id
    pub fn for_stream(stream_id: &str) -> Self {
        match stream_id {
            "milestones" | "team" | "sprints" | "sub_tasks" | "workflow_columns" => {
                Self::ProjectFanout
            }
            "rates" => Self::RateCardFanout,
            ROLES_STREAM => Self::DependentSubstream,
            _ => Self::Direct,
        }
    }
}

/// Whether records of `stream_id` carry role references
pub fn observes_roles(stream_id: &str) -> bool {
    ROLE_PARENT_STREAMS.contains(&stream_id)
}

/// Parent resource of a fan-out stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parent {
    /// `projects`
    Project,
    /// `rate_cards`
    RateCard,
}

impl Parent {
    /// Path of the parent listing
    pub fn collection(self) -> &'static str {
        match self {
            Self::Project => PROJECTS_STREAM,
            Self::RateCard => "rate_cards",
        }
    }

    /// Field injected into each child record
    pub fn id_field(self) -> &'static str {
        match self {
            Self::Project => "project_id",
            Self::RateCard => "rate_card_id",
        }
    }

    /// Path of one parent's child collection
    pub fn child_path(self, parent_id: &str, stream_id: &str) -> String {
        format!("{}/{parent_id}/{stream_id}", self.collection())
    }
}

/// Settings one stream is synced with
#[derive(Debug, Clone)]
pub struct StreamContext {
    /// Stream id, also the API path segment
    pub stream_id: String,
    /// Schema records are coerced to
    pub schema: Value,
    /// Identity fields announced with the schema
    pub key_properties: Vec<String>,
    /// Field whose values are bookmarked
    pub bookmark_key: String,
    /// Replication method in effect
    pub replication_method: ReplicationMethod,
    /// Skip the bookmark comparison for incremental syncs
    pub bypass_date: bool,
    /// Configured start date
    pub start_date: String,
}

impl StreamContext {
    /// Context with the registry defaults for `stream_id`
    pub fn new(stream_id: impl Into<String>, schema: Value) -> Self {
        let stream_id = stream_id.into();
        let def = find_stream(&stream_id);
        Self {
            key_properties: def
                .map(|d| d.key_properties.iter().map(ToString::to_string).collect())
                .unwrap_or_default(),
            replication_method: def.map(|d| d.replication_method).unwrap_or_default(),
            bypass_date: def.is_some_and(|d| d.bypass_date),
            stream_id,
            schema,
            bookmark_key: DEFAULT_REPLICATION_KEY.to_string(),
            start_date: String::new(),
        }
    }

    /// Set the identity fields
    #[must_use]
    pub fn with_key_properties(mut self, key_properties: Vec<String>) -> Self {
        self.key_properties = key_properties;
        self
    }

    /// Set the bookmark field
    #[must_use]
    pub fn with_bookmark_key(mut self, key: impl Into<String>) -> Self {
        self.bookmark_key = key.into();
        self
    }

    /// Set the replication method
    #[must_use]
    pub fn with_replication_method(mut self, method: ReplicationMethod) -> Self {
        self.replication_method = method;
        self
    }

    /// Set the bypass flag
    #[must_use]
    pub fn with_bypass_date(mut self, bypass: bool) -> Self {
        self.bypass_date = bypass;
        self
    }

    /// Set the start date
    #[must_use]
    pub fn with_start_date(mut self, start_date: impl Into<String>) -> Self {
        self.start_date = start_date.into();
        self
    }

    /// Fields announced as bookmark properties
    pub fn bookmark_properties(&self) -> Vec<String> {
        match self.replication_method {
            ReplicationMethod::Incremental => vec![self.bookmark_key.clone()],
            ReplicationMethod::FullTable => Vec::new(),
        }
    }

    /// Enumeration strategy for this stream
    pub fn strategy(&self) -> StreamStrategy {
        StreamStrategy::for_stream(&self.stream_id)
    }

    /// Stored bookmark for this stream
    pub fn bookmark<'s>(&self, state: &'s State) -> Option<&'s str> {
        state.get_bookmark(&self.stream_id, &self.bookmark_key)
    }

    /// Inclusion filter seeded from the stored bookmark
    pub fn filter(&self, state: &State) -> RecordFilter {
        RecordFilter::new(
            self.replication_method,
            self.bypass_date,
            self.bookmark(state).map(ToString::to_string),
            self.start_date.clone(),
        )
    }
}

/// What one stream sync did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamOutcome {
    /// GET requests issued
    pub requests: usize,
    /// Records returned by the API
    pub records_fetched: usize,
    /// Records written to the sink
    pub records_emitted: usize,
    /// Fan-out units skipped on 404
    pub units_skipped: usize,
    /// Highest replication-key value seen, including the prior bookmark
    pub cursor: Option<String>,
}

/// The `projects` listing, fetched once per run
#[derive(Debug, Clone)]
pub struct ProjectList {
    /// Raw project records
    pub records: Vec<Value>,
    /// When the listing was fetched
    pub extracted_at: DateTime<Utc>,
}

impl ProjectList {
    /// Fetch the listing
    pub async fn fetch<T: Transport + ?Sized>(transport: &T) -> Result<Self> {
        let records = fetch_records(transport, PROJECTS_STREAM).await?;
        Ok(Self {
            records,
            extracted_at: Utc::now(),
        })
    }
}

/// GET `path` and return its records
///
/// Listings come back as arrays; fetching a single resource by id returns
/// one object.
pub async fn fetch_records<T: Transport + ?Sized>(transport: &T, path: &str) -> Result<Vec<Value>> {
    match transport.get(path).await? {
        Value::Array(records) => Ok(records),
        Value::Null => Ok(Vec::new()),
        record @ Value::Object(_) => Ok(vec![record]),
        other => Err(Error::decode(
            path,
            format!("expected a JSON array or object, got {other}"),
        )),
    }
}

/// Render an id as a path segment
pub(crate) fn id_segment(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Distinct parent ids in listing order, with their original JSON values
pub(crate) fn parent_ids(records: &[Value]) -> Vec<(String, Value)> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter_map(|r| r.get("id"))
        .filter_map(|id| id_segment(id).map(|segment| (segment, id.clone())))
        .filter(|(segment, _)| seen.insert(segment.clone()))
        .collect()
}
