//! Catalog types
//!
//! Singer-style catalog: one entry per stream, with selection and
//! replication settings carried either on the entry itself or in its
//! root metadata breadcrumb.

use crate::types::ReplicationMethod;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Replication key used when a catalog entry doesn't name one
pub const DEFAULT_REPLICATION_KEY: &str = "updated_at";

/// Discovered or operator-edited catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    /// Streams, in sync order
    pub streams: Vec<CatalogEntry>,
}

impl Catalog {
    /// Parse a catalog from JSON
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Look up an entry by stream id
    pub fn get(&self, stream_id: &str) -> Option<&CatalogEntry> {
        self.streams.iter().find(|s| s.tap_stream_id == stream_id)
    }

    /// Whether `stream_id` is present and selected
    pub fn is_selected(&self, stream_id: &str) -> bool {
        self.get(stream_id).is_some_and(CatalogEntry::is_selected)
    }

    /// Selected entries in catalog order
    pub fn selected_streams(&self) -> Vec<&CatalogEntry> {
        self.streams.iter().filter(|s| s.is_selected()).collect()
    }

    /// Mark every stream selected
    #[must_use]
    pub fn select_all(mut self) -> Self {
        for stream in &mut self.streams {
            stream.selected = Some(true);
        }
        self
    }
}

/// One stream in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Stream identifier
    pub tap_stream_id: String,

    /// Stream name
    #[serde(default)]
    pub stream: String,

    /// JSON schema for records
    #[serde(default)]
    pub schema: Value,

    /// Fields forming the record identity, in order
    #[serde(default)]
    pub key_properties: Vec<String>,

    /// Field compared against the bookmark
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key: Option<String>,

    /// Replication method chosen for this stream
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_method: Option<ReplicationMethod>,

    /// Breadcrumb metadata
    #[serde(default)]
    pub metadata: Vec<MetadataEntry>,

    /// Entry-level selection flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
}

impl CatalogEntry {
    /// Metadata attached to the stream root (empty breadcrumb)
    pub fn root_metadata(&self) -> Option<&Map<String, Value>> {
        self.metadata
            .iter()
            .find(|m| m.breadcrumb.is_empty())
            .map(|m| &m.metadata)
    }

    /// Whether the operator selected this stream
    ///
    /// Root metadata wins, then the schema-level flag, then the entry flag.
    pub fn is_selected(&self) -> bool {
        if let Some(selected) = self
            .root_metadata()
            .and_then(|m| m.get("selected"))
            .and_then(Value::as_bool)
        {
            return selected;
        }
        if let Some(selected) = self.schema.get("selected").and_then(Value::as_bool) {
            return selected;
        }
        self.selected.unwrap_or(false)
    }

    /// Name of the field whose values are bookmarked
    pub fn bookmark_key(&self) -> &str {
        self.replication_key
            .as_deref()
            .or_else(|| {
                self.root_metadata()
                    .and_then(|m| m.get("replication-key"))
                    .and_then(Value::as_str)
            })
            .unwrap_or(DEFAULT_REPLICATION_KEY)
    }

    /// Replication method requested by the catalog, if any
    pub fn requested_replication_method(&self) -> Option<ReplicationMethod> {
        if self.replication_method.is_some() {
            return self.replication_method;
        }
        let root = self.root_metadata()?;
        ["replication-method", "forced-replication-method"]
            .iter()
            .filter_map(|k| root.get(*k).and_then(Value::as_str))
            .find_map(|s| s.parse().ok())
    }
}

/// Metadata for one breadcrumb path
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataEntry {
    /// Path into the schema; empty for the stream root
    #[serde(default)]
    pub breadcrumb: Vec<String>,

    /// Metadata key/value pairs
    #[serde(default)]
    pub metadata: Map<String, Value>,
}
