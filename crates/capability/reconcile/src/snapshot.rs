//! 属性快照构造。
//!
//! - 楼宇 info：id, name, address, description
//! - 楼层 info：id, name, level
//! - 房间 info：id, name, room_number
//! - 设备 info：id, name, firmware, model, product
//! - 设备 status：battery_level
//! - 设备 input：pos_x, pos_y, floor_id, pos_world 与已有的环境读数

use crate::sources::AttributeSnapshot;
use chrono::{DateTime, Utc};
use domain::{AssetId, Building, DataSubtype, Device, Floor, Room};
use serde_json::{Map, Value, json};

fn snapshot(
    asset_id: AssetId,
    subtype: DataSubtype,
    timestamp: DateTime<Utc>,
    data: Value,
) -> AttributeSnapshot {
    let data = match data {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    AttributeSnapshot {
        asset_id,
        subtype,
        timestamp,
        data,
    }
}

pub fn building_info(asset_id: AssetId, building: &Building, at: DateTime<Utc>) -> AttributeSnapshot {
    snapshot(
        asset_id,
        DataSubtype::Info,
        at,
        json!({
            "id": building.id,
            "name": building.name,
            "address": building.address,
            "description": building.description,
        }),
    )
}

pub fn floor_info(asset_id: AssetId, floor: &Floor, at: DateTime<Utc>) -> AttributeSnapshot {
    snapshot(
        asset_id,
        DataSubtype::Info,
        at,
        json!({
            "id": floor.id,
            "name": floor.name,
            "level": floor.level,
        }),
    )
}

pub fn room_info(asset_id: AssetId, room: &Room, at: DateTime<Utc>) -> AttributeSnapshot {
    snapshot(
        asset_id,
        DataSubtype::Info,
        at,
        json!({
            "id": room.id,
            "name": room.name,
            "room_number": room.room_number,
        }),
    )
}

/// 设备快照（info / status / input）。
///
/// 时间戳取最近一次遥测或定位时间，都没有时使用 `fallback`。
pub fn device_snapshots(
    asset_id: AssetId,
    device: &Device,
    fallback: DateTime<Utc>,
) -> Vec<AttributeSnapshot> {
    let at = device
        .captured_at
        .into_iter()
        .chain(device.positioned_at)
        .max()
        .unwrap_or(fallback);

    let info = json!({
        "id": device.tracking_id,
        "name": device.name,
        "firmware": device.firmware,
        "model": device.model,
        "product": device.product,
    });
    let status = json!({ "battery_level": device.battery_level });

    let mut input = Map::new();
    if let Some(position) = device.position {
        input.insert("pos_x".to_string(), json!(position.x));
        input.insert("pos_y".to_string(), json!(position.y));
        input.insert("floor_id".to_string(), json!(position.floor_id));
    }
    if let Some(world) = device.world_position {
        input.insert("pos_world".to_string(), json!(world));
    }
    let readings = &device.readings;
    let values = [
        ("temperature", readings.temperature.map(Value::from)),
        ("humidity", readings.humidity.map(Value::from)),
        ("light_intensity", readings.light_intensity.map(Value::from)),
        ("air_quality", readings.air_quality.map(Value::from)),
        ("air_pressure", readings.air_pressure.map(Value::from)),
        ("people_count", readings.people_count.map(Value::from)),
    ];
    for (name, value) in values {
        if let Some(value) = value {
            input.insert(name.to_string(), value);
        }
    }

    let mut snapshots = vec![
        snapshot(asset_id, DataSubtype::Info, at, info),
        snapshot(asset_id, DataSubtype::Status, at, status),
    ];
    if !input.is_empty() {
        snapshots.push(snapshot(asset_id, DataSubtype::Input, at, Value::Object(input)));
    }
    snapshots
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{AssetKind, LocalPosition, Readings};

    fn device() -> Device {
        Device {
            tracking_id: "aabbcc".to_string(),
            name: "t1".to_string(),
            kind: AssetKind::Tag,
            product: "Nano Tag".to_string(),
            model: "NT".to_string(),
            firmware: "1.0".to_string(),
            battery_level: 50,
            room_number_hint: None,
            readings: Readings {
                temperature: Some(21.5),
                ..Readings::default()
            },
            captured_at: None,
            position: Some(LocalPosition {
                x: 1.0,
                y: 2.0,
                floor_id: 3,
            }),
            positioned_at: None,
            world_position: Some([1.0, 2.0, 0.0]),
        }
    }

    #[test]
    fn device_input_skips_missing_readings() {
        let snapshots = device_snapshots(5, &device(), Utc::now());
        assert_eq!(snapshots.len(), 3);
        let input = &snapshots[2];
        assert_eq!(input.subtype, DataSubtype::Input);
        assert_eq!(input.data.get("temperature"), Some(&json!(21.5)));
        assert!(input.data.get("humidity").is_none());
        assert_eq!(input.data.get("pos_world"), Some(&json!([1.0, 2.0, 0.0])));
        assert_eq!(snapshots[1].data.get("battery_level"), Some(&json!(50)));
    }

    #[test]
    fn device_without_input_has_two_snapshots() {
        let mut device = device();
        device.position = None;
        device.world_position = None;
        device.readings = Readings::default();
        let snapshots = device_snapshots(5, &device, Utc::now());
        assert_eq!(snapshots.len(), 2);
    }
}
