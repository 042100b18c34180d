use chrono::{TimeZone, Utc};
use domain::{AssetKind, DataSubtype};
use kio_eliona::ElionaClient;
use kio_eliona::body::{AssetBody, AssetResponse, AssetTypeBody, DataBody, asset_types};
use kio_reconcile::{AssetDescriptor, AssetParent, AttributeSnapshot};
use serde_json::json;

fn descriptor(kind: AssetKind, parent: AssetParent) -> AssetDescriptor {
    AssetDescriptor {
        scope: "p1".to_string(),
        kind,
        global_identifier: format!("{}aabbcc", kind.as_str()),
        name: "Nano Tag t1".to_string(),
        description: "Nano Tag t1 (aabbcc)".to_string(),
        parent,
        is_tracker: kind.is_tracker(),
    }
}

#[test]
fn tracker_body_uses_functional_parent() {
    let body = AssetBody::from(&descriptor(AssetKind::Tag, AssetParent::Functional(7)));
    let value = serde_json::to_value(&body).expect("encode");
    assert_eq!(
        value,
        json!({
            "projectId": "p1",
            "globalAssetIdentifier": "kontakt_io_tagaabbcc",
            "name": "Nano Tag t1",
            "assetType": "kontakt_io_tag",
            "description": "Nano Tag t1 (aabbcc)",
            "parentFunctionalAssetId": 7,
            "parentLocationalAssetId": null,
            "isTracker": true
        })
    );
}

#[test]
fn location_body_uses_locational_parent() {
    let body = AssetBody::from(&descriptor(AssetKind::Room, AssetParent::Locational(3)));
    assert_eq!(body.parent_locational_asset_id, Some(3));
    assert_eq!(body.parent_functional_asset_id, None);
    assert!(!body.is_tracker);
}

#[test]
fn asset_response_without_id() {
    let response: AssetResponse = serde_json::from_str("{}").expect("decode");
    assert_eq!(response.id, None);
    let response: AssetResponse = serde_json::from_str(r#"{"id": 42}"#).expect("decode");
    assert_eq!(response.id, Some(42));
}

#[test]
fn data_body_shape() {
    let mut data = serde_json::Map::new();
    data.insert("battery_level".to_string(), json!(80));
    let snapshot = AttributeSnapshot {
        asset_id: 5,
        subtype: DataSubtype::Status,
        timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
        data,
    };
    let value = serde_json::to_value(DataBody::from(&snapshot)).expect("encode");
    assert_eq!(
        value,
        json!({
            "assetId": 5,
            "subtype": "status",
            "timestamp": "2024-05-01T10:00:00Z",
            "data": {"battery_level": 80}
        })
    );
}

#[test]
fn urls_are_joined() {
    let client = ElionaClient::new(reqwest::Client::new(), "https://eliona.example/v2", "token");
    assert_eq!(client.assets_url(), "https://eliona.example/v2/assets");
    assert_eq!(client.data_url(), "https://eliona.example/v2/data");
    assert_eq!(client.asset_types_url(), "https://eliona.example/v2/asset-types");
}

fn attribute_names(body: &AssetTypeBody, subtype: &str) -> Vec<&'static str> {
    body.attributes
        .iter()
        .filter(|attribute| attribute.subtype == subtype)
        .map(|attribute| attribute.name)
        .collect()
}

#[test]
fn every_asset_kind_has_a_type_definition() {
    let types = asset_types();
    assert_eq!(types.len(), 8);
    let names: Vec<_> = types.iter().map(|body| body.name).collect();
    for kind in AssetKind::ALL {
        assert!(names.contains(&kind.as_str()));
    }
    assert!(types.iter().all(|body| body.custom && body.vendor == "Kontakt.io"));
}

#[test]
fn floor_type_exposes_height_output() {
    let floor = AssetTypeBody::from(AssetKind::Floor);
    assert_eq!(attribute_names(&floor, "info"), vec!["id", "name", "level"]);
    assert_eq!(attribute_names(&floor, "output"), vec!["height"]);

    let value = serde_json::to_value(&floor).expect("encode");
    assert_eq!(value["name"], json!("kontakt_io_floor"));
    assert_eq!(value["translation"], json!({"de": "Kontakt.io Floor", "en": "Kontakt.io Floor"}));
    assert_eq!(
        value["attributes"][3],
        json!({
            "subtype": "output",
            "name": "height",
            "enable": true,
            "translation": {"de": "height", "en": "height"}
        })
    );
}

#[test]
fn device_type_matches_pushed_snapshots() {
    let badge = AssetTypeBody::from(AssetKind::Badge);
    assert_eq!(
        attribute_names(&badge, "info"),
        vec!["id", "name", "firmware", "model", "product"]
    );
    assert_eq!(attribute_names(&badge, "status"), vec!["battery_level"]);
    let input = attribute_names(&badge, "input");
    assert!(input.contains(&"pos_world"));
    assert!(input.contains(&"temperature"));
    assert!(attribute_names(&badge, "output").is_empty());

    let root = AssetTypeBody::from(AssetKind::Root);
    assert!(root.attributes.is_empty());
}
