//! 设备相关模型。
//!
//! 三个数据源各自描述同一批物理设备：
//! - [`DeviceMetadata`]：设备清单（名称、产品、固件、电量、红外房间号）
//! - [`TelemetryRecord`]：环境读数，带采集时间
//! - [`PositionRecord`]：楼层内坐标，带定位时间
//!
//! 合并结果为 [`Device`]，以规范化后的 tracking id 作为身份。

use crate::asset::AssetKind;
use crate::filter::FilterAttributes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 规范化 tracking id：小写并去掉 `:` / `-` 分隔符。
///
/// 设备清单返回带分隔符的 MAC，遥测与定位返回的 trackingId 大小写与分隔符不一定一致。
pub fn normalize_tracking_id(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != ':' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// 设备清单中的一条记录。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceMetadata {
    pub id: String,
    pub mac: String,
    /// 设备名称；Kontakt.io 未给出名称时取 uniqueId。
    pub name: String,
    pub model: String,
    pub product: String,
    pub firmware: String,
    pub battery_level: i32,
    pub room_number_ir: Option<i32>,
}

impl DeviceMetadata {
    pub fn tracking_id(&self) -> String {
        normalize_tracking_id(&self.mac)
    }

    /// 过滤规则可见的字段。字段集合固定，新增字段需在此显式声明。
    pub fn filter_attributes(&self) -> FilterAttributes {
        let mut attributes = FilterAttributes::new();
        attributes.insert("id", self.id.clone());
        attributes.insert("mac", self.mac.clone());
        attributes.insert("name", self.name.clone());
        attributes.insert("model", self.model.clone());
        attributes.insert("product", self.product.clone());
        attributes.insert("firmware", self.firmware.clone());
        attributes.insert("battery_level", self.battery_level.to_string());
        attributes
    }
}

/// 环境读数。缺失的读数保持 `None`，不参与快照输出。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Readings {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub light_intensity: Option<f64>,
    pub air_quality: Option<f64>,
    pub air_pressure: Option<f64>,
    pub people_count: Option<i64>,
}

/// 遥测记录。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub tracking_id: String,
    pub timestamp: DateTime<Utc>,
    pub readings: Readings,
}

/// 楼层内的本地坐标。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalPosition {
    pub x: f64,
    pub y: f64,
    pub floor_id: i64,
}

/// 定位记录。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub tracking_id: String,
    pub timestamp: DateTime<Utc>,
    pub position: LocalPosition,
}

/// 合并后的设备（仅保留最近一次状态）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub tracking_id: String,
    pub name: String,
    pub kind: AssetKind,
    pub product: String,
    pub model: String,
    pub firmware: String,
    pub battery_level: i32,
    pub room_number_hint: Option<i32>,
    pub readings: Readings,
    pub captured_at: Option<DateTime<Utc>>,
    pub position: Option<LocalPosition>,
    pub positioned_at: Option<DateTime<Utc>>,
    /// 目标坐标系下的 `[x, y, z]`，z 为楼层高度。
    pub world_position: Option<[f64; 3]>,
}

impl Device {
    /// 资产名称：`{product} {name}`。
    pub fn display_name(&self) -> String {
        format!("{} {}", self.product, self.name)
    }
}
