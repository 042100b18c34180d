use chrono::{TimeZone, Utc};
use domain::{DeviceMetadata, PositionRecord, Room, TelemetryRecord};
use kio_kontakt::KontaktEndpoints;
use kio_kontakt::client::telemetry_query;
use kio_kontakt::wire::{DeviceList, Page, PositionWire, RoomWire, TelemetryWire};
use kio_reconcile::TimeWindow;

#[test]
fn decode_rooms_page() {
    let json = r#"{
        "content": [{
            "id": 11,
            "name": "Meeting",
            "roomNumber": 101,
            "floor": {
                "id": 3,
                "name": "Ground",
                "level": 0,
                "building": {"id": 1, "name": "HQ", "address": "Main St 1", "description": null}
            }
        }]
    }"#;
    let page: Page<RoomWire> = serde_json::from_str(json).expect("decode");
    let rooms: Vec<Room> = page.content.into_iter().map(Into::into).collect();
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].room_number, Some(101));
    assert_eq!(rooms[0].floor.id, 3);
    assert_eq!(rooms[0].floor.building.address, "Main St 1");
    assert_eq!(rooms[0].floor.building.description, "");
}

#[test]
fn decode_device_list() {
    let json = r#"{
        "devices": [{
            "id": "dev-1",
            "mac": "AA:BB:CC:DD:EE:FF",
            "uniqueId": "abc1",
            "model": "NT",
            "product": "Nano Tag",
            "firmware": "1.4",
            "batteryLevel": 93,
            "irRoomNumber": 101
        }]
    }"#;
    let list: DeviceList = serde_json::from_str(json).expect("decode");
    let devices: Vec<DeviceMetadata> = list.devices.into_iter().map(Into::into).collect();
    assert_eq!(devices[0].name, "abc1");
    assert_eq!(devices[0].tracking_id(), "aabbccddeeff");
    assert_eq!(devices[0].room_number_ir, Some(101));
    assert_eq!(devices[0].battery_level, 93);
}

#[test]
fn device_name_is_preferred_over_unique_id() {
    let json = r#"{
        "devices": [
            {"id": "dev-1", "mac": "aa", "name": "Lobby tag", "uniqueId": "abc1"},
            {"id": "dev-2", "mac": "bb", "name": "", "uniqueId": "abc2"}
        ]
    }"#;
    let list: DeviceList = serde_json::from_str(json).expect("decode");
    let devices: Vec<DeviceMetadata> = list.devices.into_iter().map(Into::into).collect();
    assert_eq!(devices[0].name, "Lobby tag");
    assert_eq!(devices[1].name, "abc2");
}

#[test]
fn decode_telemetry_with_missing_readings() {
    let json = r#"{
        "content": [{
            "trackingId": "aabbccddeeff",
            "timestamp": "2024-05-01T10:00:00Z",
            "temperature": 21.5,
            "numberOfPeopleDetected": 2
        }]
    }"#;
    let page: Page<TelemetryWire> = serde_json::from_str(json).expect("decode");
    let records: Vec<TelemetryRecord> = page.content.into_iter().map(Into::into).collect();
    let readings = &records[0].readings;
    assert_eq!(readings.temperature, Some(21.5));
    assert_eq!(readings.people_count, Some(2));
    assert_eq!(readings.humidity, None);
    assert_eq!(
        records[0].timestamp,
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
    );
}

#[test]
fn decode_positions() {
    let json = r#"{
        "content": [{
            "trackingId": "aabbccddeeff",
            "timestamp": "2024-05-01T10:00:05Z",
            "x": 10.5,
            "y": 4.25,
            "floorId": 3
        }]
    }"#;
    let page: Page<PositionWire> = serde_json::from_str(json).expect("decode");
    let records: Vec<PositionRecord> = page.content.into_iter().map(Into::into).collect();
    assert_eq!(records[0].position.x, 10.5);
    assert_eq!(records[0].position.floor_id, 3);
}

#[test]
fn empty_page_decodes() {
    let page: Page<PositionWire> = serde_json::from_str("{}").expect("decode");
    assert!(page.content.is_empty());
}

#[test]
fn telemetry_query_joins_ids() {
    let end = Utc.with_ymd_and_hms(2024, 5, 1, 10, 2, 0).unwrap();
    let window = TimeWindow::trailing(end, std::time::Duration::from_secs(120));
    let query = telemetry_query(&["aa".to_string(), "bb".to_string()], window);
    assert_eq!(query[0], ("trackingId", "aa,bb".to_string()));
    assert_eq!(query[1], ("startTime", "2024-05-01T10:00:00Z".to_string()));
    assert_eq!(query[2], ("endTime", "2024-05-01T10:02:00Z".to_string()));
    assert_eq!(query[3], ("size", "2000".to_string()));
}

#[test]
fn endpoints_are_joined() {
    let endpoints = KontaktEndpoints {
        apps_url: "https://apps.example".to_string(),
        device_url: "https://api.example".to_string(),
    };
    assert_eq!(endpoints.rooms(), "https://apps.example/v2/locations/rooms");
    assert_eq!(endpoints.devices(), "https://api.example/device");
    assert_eq!(endpoints.telemetry(), "https://apps.example/v3/telemetry");
    assert_eq!(endpoints.positions(), "https://apps.example/v2/positions");
}
