//! Kontakt.io 接口响应结构。
//!
//! 缺失字段按默认值处理，读数字段缺失时保持 `None`。

use chrono::{DateTime, Utc};
use domain::{
    Building, DeviceMetadata, Floor, LocalPosition, PositionRecord, Readings, Room,
    TelemetryRecord,
};
use serde::Deserialize;

/// 分页响应（房间、遥测、定位）。
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildingWire {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FloorWire {
    pub id: i64,
    pub name: String,
    pub level: i32,
    pub building: BuildingWire,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoomWire {
    pub id: i64,
    pub name: String,
    pub room_number: Option<i32>,
    pub floor: FloorWire,
}

impl From<RoomWire> for Room {
    fn from(room: RoomWire) -> Self {
        let floor = room.floor;
        let building = floor.building;
        Room {
            id: room.id,
            name: room.name,
            room_number: room.room_number,
            floor: Floor {
                id: floor.id,
                name: floor.name,
                level: floor.level,
                building: Building {
                    id: building.id,
                    name: building.name,
                    address: building.address.unwrap_or_default(),
                    description: building.description.unwrap_or_default(),
                },
            },
        }
    }
}

/// 设备清单响应。
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeviceList {
    pub devices: Vec<DeviceWire>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceWire {
    pub id: String,
    pub mac: String,
    pub unique_id: Option<String>,
    pub name: Option<String>,
    pub model: String,
    pub product: String,
    pub firmware: String,
    pub battery_level: i32,
    pub ir_room_number: Option<i32>,
}

impl From<DeviceWire> for DeviceMetadata {
    fn from(device: DeviceWire) -> Self {
        let name = device
            .name
            .filter(|name| !name.is_empty())
            .or(device.unique_id)
            .unwrap_or_default();
        DeviceMetadata {
            id: device.id,
            mac: device.mac,
            name,
            model: device.model,
            product: device.product,
            firmware: device.firmware,
            battery_level: device.battery_level,
            room_number_ir: device.ir_room_number,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryWire {
    pub tracking_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub light_intensity: Option<f64>,
    #[serde(default)]
    pub air_quality: Option<f64>,
    #[serde(default)]
    pub air_pressure: Option<f64>,
    #[serde(default)]
    pub number_of_people_detected: Option<i64>,
}

impl From<TelemetryWire> for TelemetryRecord {
    fn from(record: TelemetryWire) -> Self {
        TelemetryRecord {
            tracking_id: record.tracking_id,
            timestamp: record.timestamp,
            readings: Readings {
                temperature: record.temperature,
                humidity: record.humidity,
                light_intensity: record.light_intensity,
                air_quality: record.air_quality,
                air_pressure: record.air_pressure,
                people_count: record.number_of_people_detected,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionWire {
    pub tracking_id: String,
    pub timestamp: DateTime<Utc>,
    pub x: f64,
    pub y: f64,
    pub floor_id: i64,
}

impl From<PositionWire> for PositionRecord {
    fn from(record: PositionWire) -> Self {
        PositionRecord {
            tracking_id: record.tracking_id,
            timestamp: record.timestamp,
            position: LocalPosition {
                x: record.x,
                y: record.y,
                floor_id: record.floor_id,
            },
        }
    }
}
