//! Tests for catalog discovery and selection

use super::*;
use crate::types::ReplicationMethod;
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn test_discover_lists_every_stream() {
    let catalog = discover().unwrap();
    let names: Vec<&str> = catalog
        .streams
        .iter()
        .map(|s| s.tap_stream_id.as_str())
        .collect();

    assert_eq!(
        names,
        vec![
            "projects",
            "clients",
            "persons",
            "rate_cards",
            "roles",
            "cards",
            "time_registrations",
            "milestones",
            "team",
            "sprints",
            "sub_tasks",
            "workflow_columns",
            "rates",
        ]
    );
}

#[test]
fn test_bundled_schemas_carry_replication_key() {
    for def in STREAMS {
        let schema = def.schema().unwrap();
        assert!(
            schema["properties"].get("updated_at").is_some(),
            "{} has no updated_at",
            def.name
        );
        for key in def.key_properties {
            assert!(
                schema["properties"].get(*key).is_some(),
                "{} is missing key property {key}",
                def.name
            );
        }
    }
}

#[test]
fn test_key_properties() {
    let catalog = discover().unwrap();
    assert_eq!(catalog.get("team").unwrap().key_properties, ["project_id", "person_id"]);
    assert_eq!(catalog.get("rates").unwrap().key_properties, ["rate_card_id", "role_id"]);
    assert_eq!(catalog.get("milestones").unwrap().key_properties, ["id"]);
}

#[test]
fn test_reference_streams() {
    for name in ["roles", "clients", "persons", "rate_cards"] {
        assert!(is_bypass_date(name), "{name}");
        assert_eq!(
            find_stream(name).unwrap().replication_method,
            ReplicationMethod::FullTable
        );
    }
    assert!(!is_bypass_date("milestones"));
    assert!(!is_bypass_date("unknown"));
}

#[test]
fn test_discovered_metadata() {
    let catalog = discover().unwrap();
    let team = catalog.get("team").unwrap();

    let root = team.root_metadata().unwrap();
    assert_eq!(root["table-key-properties"], json!(["project_id", "person_id"]));
    assert_eq!(root["forced-replication-method"], json!("INCREMENTAL"));
    assert_eq!(root["valid-replication-keys"], json!(["updated_at"]));

    let person = team
        .metadata
        .iter()
        .find(|m| m.breadcrumb == ["properties", "person_id"])
        .unwrap();
    assert_eq!(person.metadata["inclusion"], json!("automatic"));

    let role = team
        .metadata
        .iter()
        .find(|m| m.breadcrumb == ["properties", "role_id"])
        .unwrap();
    assert_eq!(role.metadata["inclusion"], json!("available"));
}

#[test]
fn test_discovered_streams_are_unselected() {
    let catalog = discover().unwrap();
    assert!(catalog.selected_streams().is_empty());

    let catalog = catalog.select_all();
    assert_eq!(catalog.selected_streams().len(), STREAMS.len());
}

#[test]
fn test_selection_sources() {
    let catalog = Catalog::from_json(
        &json!({
            "streams": [
                {
                    "tap_stream_id": "projects",
                    "schema": {},
                    "metadata": [{"breadcrumb": [], "metadata": {"selected": true}}]
                },
                {"tap_stream_id": "clients", "schema": {"selected": true}},
                {"tap_stream_id": "persons", "schema": {}, "selected": true},
                {"tap_stream_id": "roles", "schema": {}},
                {
                    "tap_stream_id": "cards",
                    "schema": {"selected": true},
                    "metadata": [{"breadcrumb": [], "metadata": {"selected": false}}]
                }
            ]
        })
        .to_string(),
    )
    .unwrap();

    assert!(catalog.is_selected("projects"));
    assert!(catalog.is_selected("clients"));
    assert!(catalog.is_selected("persons"));
    assert!(!catalog.is_selected("roles"));
    assert!(!catalog.is_selected("cards"));
    assert!(!catalog.is_selected("sprints"));

    let selected: Vec<&str> = catalog
        .selected_streams()
        .iter()
        .map(|s| s.tap_stream_id.as_str())
        .collect();
    assert_eq!(selected, vec!["projects", "clients", "persons"]);
}

#[test]
fn test_bookmark_key_and_method_from_metadata() {
    let entry: CatalogEntry = serde_json::from_value(json!({
        "tap_stream_id": "cards",
        "metadata": [{
            "breadcrumb": [],
            "metadata": {"replication-key": "modified", "replication-method": "FULL_TABLE"}
        }]
    }))
    .unwrap();

    assert_eq!(entry.bookmark_key(), "modified");
    assert_eq!(
        entry.requested_replication_method(),
        Some(ReplicationMethod::FullTable)
    );

    let bare: CatalogEntry = serde_json::from_value(json!({"tap_stream_id": "x"})).unwrap();
    assert_eq!(bare.bookmark_key(), "updated_at");
    assert_eq!(bare.requested_replication_method(), None);
}

#[test]
fn test_catalog_round_trips_through_json() {
    let catalog = discover().unwrap();
    let json = serde_json::to_string(&catalog).unwrap();
    let restored = Catalog::from_json(&json).unwrap();

    assert_eq!(restored.streams.len(), catalog.streams.len());
    assert_eq!(
        restored.get("rates").unwrap().replication_method,
        Some(ReplicationMethod::Incremental)
    );
}
