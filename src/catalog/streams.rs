//! Known Forecast streams and discovery
//!
//! Schemas are embedded in the binary so discovery never touches the API.

use super::types::{Catalog, CatalogEntry, MetadataEntry, DEFAULT_REPLICATION_KEY};
use crate::error::Result;
use crate::types::ReplicationMethod;
use serde_json::{json, Map, Value};

/// Static description of a stream the tap knows how to sync
#[derive(Debug, Clone, Copy)]
pub struct StreamDefinition {
    /// Stream id, also the API path segment
    pub name: &'static str,
    /// Identity fields
    pub key_properties: &'static [&'static str],
    /// Method used unless the catalog or config overrides it
    pub replication_method: ReplicationMethod,
    /// Reference data: small lists re-read every run
    pub bypass_date: bool,
    schema: &'static str,
}

impl StreamDefinition {
    /// The bundled JSON schema
    pub fn schema(&self) -> Result<Value> {
        Ok(serde_json::from_str(self.schema)?)
    }
}

const fn incremental(
    name: &'static str,
    key_properties: &'static [&'static str],
    schema: &'static str,
) -> StreamDefinition {
    StreamDefinition {
        name,
        key_properties,
        replication_method: ReplicationMethod::Incremental,
        bypass_date: false,
        schema,
    }
}

const fn reference(name: &'static str, schema: &'static str) -> StreamDefinition {
    StreamDefinition {
        name,
        key_properties: &["id"],
        replication_method: ReplicationMethod::FullTable,
        bypass_date: true,
        schema,
    }
}

/// Every stream, in discovery order
pub static STREAMS: &[StreamDefinition] = &[
    incremental("projects", &["id"], include_str!("../../schemas/projects.json")),
    reference("clients", include_str!("../../schemas/clients.json")),
    reference("persons", include_str!("../../schemas/persons.json")),
    reference("rate_cards", include_str!("../../schemas/rate_cards.json")),
    reference("roles", include_str!("../../schemas/roles.json")),
    incremental("cards", &["id"], include_str!("../../schemas/cards.json")),
    incremental(
        "time_registrations",
        &["id"],
        include_str!("../../schemas/time_registrations.json"),
    ),
    incremental("milestones", &["id"], include_str!("../../schemas/milestones.json")),
    incremental(
        "team",
        &["project_id", "person_id"],
        include_str!("../../schemas/team.json"),
    ),
    incremental("sprints", &["id"], include_str!("../../schemas/sprints.json")),
    incremental("sub_tasks", &["id"], include_str!("../../schemas/sub_tasks.json")),
    incremental(
        "workflow_columns",
        &["id"],
        include_str!("../../schemas/workflow_columns.json"),
    ),
    incremental(
        "rates",
        &["rate_card_id", "role_id"],
        include_str!("../../schemas/rates.json"),
    ),
];

/// Look up a known stream
pub fn find_stream(name: &str) -> Option<&'static StreamDefinition> {
    STREAMS.iter().find(|s| s.name == name)
}

/// Whether `name` is a reference stream that skips the bookmark comparison
pub fn is_bypass_date(name: &str) -> bool {
    find_stream(name).is_some_and(|s| s.bypass_date)
}

/// Build the full catalog without contacting the API
pub fn discover() -> Result<Catalog> {
    let streams = STREAMS
        .iter()
        .map(catalog_entry)
        .collect::<Result<Vec<_>>>()?;
    Ok(Catalog { streams })
}

fn catalog_entry(def: &StreamDefinition) -> Result<CatalogEntry> {
    let schema = def.schema()?;
    let key_properties: Vec<String> = def.key_properties.iter().map(ToString::to_string).collect();

    let mut root = Map::new();
    root.insert("inclusion".into(), json!("available"));
    root.insert("table-key-properties".into(), json!(key_properties));
    root.insert(
        "valid-replication-keys".into(),
        json!([DEFAULT_REPLICATION_KEY]),
    );
    root.insert(
        "forced-replication-method".into(),
        json!(def.replication_method.as_str()),
    );

    let mut metadata = vec![MetadataEntry {
        breadcrumb: Vec::new(),
        metadata: root,
    }];

    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        for field in properties.keys() {
            let automatic =
                key_properties.iter().any(|k| k == field) || field == DEFAULT_REPLICATION_KEY;
            let mut field_meta = Map::new();
            field_meta.insert(
                "inclusion".into(),
                json!(if automatic { "automatic" } else { "available" }),
            );
            metadata.push(MetadataEntry {
                breadcrumb: vec!["properties".to_string(), field.clone()],
                metadata: field_meta,
            });
        }
    }

    Ok(CatalogEntry {
        tap_stream_id: def.name.to_string(),
        stream: def.name.to_string(),
        schema,
        key_properties,
        replication_key: Some(DEFAULT_REPLICATION_KEY.to_string()),
        replication_method: Some(def.replication_method),
        metadata,
        selected: None,
    })
}
