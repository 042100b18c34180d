//! 三路数据合并：设备清单 + 遥测 + 定位 → 每台物理设备一条记录。
//!
//! - 设备清单按 tracking id 建索引并先行过滤，范围外设备不参与后续合并
//! - 遥测与定位各自按时间戳取最新，时间相同保留先出现的记录
//! - 定位只覆盖坐标字段，没有遥测的设备由定位单独生成记录
//! - 合并结果回连设备清单，连不上的丢弃并计入 `unmatched`；被过滤掉的设备只计入 `filtered`
//! - 产品名映射到资产类型，不支持的产品计入 `unsupported`
//!
//! 输出按 tracking id 排序，同一输入重复合并结果不变。

use crate::filter::CompiledFilter;
use chrono::{DateTime, Utc};
use domain::{
    AssetKind, Device, DeviceMetadata, FilterRuleSet, LocalPosition, PositionRecord, Readings,
    TelemetryRecord, normalize_tracking_id,
};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

/// 合并计数。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub merged: u64,
    pub filtered: u64,
    pub filter_errors: u64,
    pub unmatched: u64,
    pub unsupported: u64,
}

/// 合并结果。
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    pub devices: Vec<Device>,
    pub stats: MergeStats,
}

/// 过滤后的设备清单索引。
#[derive(Debug, Clone, Default)]
pub struct MetadataIndex {
    devices: BTreeMap<String, DeviceMetadata>,
    /// 被过滤或过滤出错的 tracking id。
    rejected: BTreeSet<String>,
    filtered: u64,
    filter_errors: u64,
}

impl MetadataIndex {
    /// 范围内设备的 tracking id（用于遥测查询）。
    pub fn tracking_ids(&self) -> Vec<String> {
        self.devices.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn get(&self, tracking_id: &str) -> Option<&DeviceMetadata> {
        self.devices.get(tracking_id)
    }

    pub fn is_rejected(&self, tracking_id: &str) -> bool {
        self.rejected.contains(tracking_id)
    }
}

/// 产品名 → 资产类型。
pub fn classify_product(product: &str) -> Option<AssetKind> {
    match product {
        "Smart Badge" | "Asset Tag 2" => Some(AssetKind::Badge),
        "Nano Tag" => Some(AssetKind::Tag),
        "Anchor Beacon 2" | "Puck Beacon" => Some(AssetKind::Beacon),
        "Portal Beam" => Some(AssetKind::PortalBeam),
        _ => None,
    }
}

/// 对设备清单建索引并过滤。
///
/// 过滤出错的设备单独丢弃并记录 error 日志，不影响其他设备。
/// 同一 tracking id 出现多次时保留第一条。
pub fn index_metadata(rule_set: &FilterRuleSet, metadata: Vec<DeviceMetadata>) -> MetadataIndex {
    let filter = CompiledFilter::new(rule_set);
    let mut index = MetadataIndex::default();
    for item in metadata {
        let tracking_id = item.tracking_id();
        if tracking_id.is_empty() {
            tracing::debug!(
                target: "kio.merge",
                device_id = %item.id,
                "device_without_tracking_id"
            );
            continue;
        }
        match filter.matches(&item.filter_attributes()) {
            Ok(true) => {
                index.devices.entry(tracking_id).or_insert(item);
            }
            Ok(false) => {
                tracing::debug!(
                    target: "kio.merge",
                    tracking_id = %tracking_id,
                    product = %item.product,
                    "device_filtered_out"
                );
                index.rejected.insert(tracking_id);
                index.filtered += 1;
            }
            Err(err) => {
                tracing::error!(
                    target: "kio.merge",
                    tracking_id = %tracking_id,
                    error = %err,
                    "device_filter_failed"
                );
                index.rejected.insert(tracking_id);
                index.filter_errors += 1;
            }
        }
    }
    index
}

#[derive(Default)]
struct PartialDevice {
    readings: Readings,
    captured_at: Option<DateTime<Utc>>,
    position: Option<LocalPosition>,
    positioned_at: Option<DateTime<Utc>>,
}

fn is_newer(candidate: DateTime<Utc>, current: Option<DateTime<Utc>>) -> bool {
    current.is_none_or(|current| candidate > current)
}

/// 合并三路数据。
pub fn merge(
    rule_set: &FilterRuleSet,
    metadata: Vec<DeviceMetadata>,
    telemetry: Vec<TelemetryRecord>,
    positions: Vec<PositionRecord>,
) -> MergeOutcome {
    merge_indexed(index_metadata(rule_set, metadata), telemetry, positions)
}

/// 基于已过滤的设备清单索引合并遥测与定位。
pub fn merge_indexed(
    index: MetadataIndex,
    telemetry: Vec<TelemetryRecord>,
    positions: Vec<PositionRecord>,
) -> MergeOutcome {
    let mut stats = MergeStats {
        filtered: index.filtered,
        filter_errors: index.filter_errors,
        ..MergeStats::default()
    };

    let mut partials: BTreeMap<String, PartialDevice> = BTreeMap::new();
    for record in telemetry {
        let tracking_id = normalize_tracking_id(&record.tracking_id);
        let partial = partials.entry(tracking_id).or_default();
        if is_newer(record.timestamp, partial.captured_at) {
            partial.readings = record.readings;
            partial.captured_at = Some(record.timestamp);
        }
    }
    for record in positions {
        let tracking_id = normalize_tracking_id(&record.tracking_id);
        let partial = partials.entry(tracking_id).or_default();
        if is_newer(record.timestamp, partial.positioned_at) {
            partial.position = Some(record.position);
            partial.positioned_at = Some(record.timestamp);
        }
    }

    let mut devices = Vec::with_capacity(partials.len());
    for (tracking_id, partial) in partials {
        let Some(metadata) = index.devices.get(&tracking_id) else {
            if index.is_rejected(&tracking_id) {
                continue;
            }
            tracing::debug!(
                target: "kio.merge",
                tracking_id = %tracking_id,
                "tracking_id_unmatched"
            );
            stats.unmatched += 1;
            continue;
        };
        let Some(kind) = classify_product(&metadata.product) else {
            tracing::debug!(
                target: "kio.merge",
                tracking_id = %tracking_id,
                product = %metadata.product,
                "unsupported_product"
            );
            stats.unsupported += 1;
            continue;
        };
        devices.push(Device {
            tracking_id,
            name: metadata.name.clone(),
            kind,
            product: metadata.product.clone(),
            model: metadata.model.clone(),
            firmware: metadata.firmware.clone(),
            battery_level: metadata.battery_level,
            room_number_hint: metadata.room_number_ir,
            readings: partial.readings,
            captured_at: partial.captured_at,
            position: partial.position,
            positioned_at: partial.positioned_at,
            world_position: None,
        });
    }
    stats.merged = devices.len() as u64;
    MergeOutcome { devices, stats }
}
