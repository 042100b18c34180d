#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use domain::{
    AssetId, AssetKind, Building, DeviceMetadata, Floor, LocalPosition, PositionRecord, Readings,
    Room, TelemetryRecord,
};
use kio_reconcile::{
    AssetDescriptor, AssetSink, AttributeSnapshot, FeedError, FeedSource, SinkError, TimeWindow,
};
use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI32, Ordering};

/// 记录调用的写入端：按调用顺序分配资产 ID。
pub struct CountingSink {
    next_id: AtomicI32,
    pub created: Mutex<Vec<AssetDescriptor>>,
    pub snapshots: Mutex<Vec<AttributeSnapshot>>,
    pub failing_kinds: Mutex<HashSet<AssetKind>>,
    pub omit_ids: bool,
}

impl CountingSink {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI32::new(100),
            created: Mutex::new(Vec::new()),
            snapshots: Mutex::new(Vec::new()),
            failing_kinds: Mutex::new(HashSet::new()),
            omit_ids: false,
        }
    }

    pub fn without_ids() -> Self {
        Self {
            omit_ids: true,
            ..Self::new()
        }
    }

    pub fn fail_kind(&self, kind: AssetKind) {
        self.failing_kinds.lock().unwrap().insert(kind);
    }

    pub fn create_count(&self) -> usize {
        self.created.lock().unwrap().len()
    }

    pub fn created_with(&self, identifier: &str) -> Option<AssetDescriptor> {
        self.created
            .lock()
            .unwrap()
            .iter()
            .find(|item| item.global_identifier == identifier)
            .cloned()
    }

    pub fn snapshot_count(&self) -> usize {
        self.snapshots.lock().unwrap().len()
    }
}

#[async_trait]
impl AssetSink for CountingSink {
    async fn upsert_asset(
        &self,
        descriptor: &AssetDescriptor,
    ) -> Result<Option<AssetId>, SinkError> {
        if self.failing_kinds.lock().unwrap().contains(&descriptor.kind) {
            return Err(SinkError::Rejected(descriptor.global_identifier.clone()));
        }
        self.created.lock().unwrap().push(descriptor.clone());
        if self.omit_ids {
            return Ok(None);
        }
        Ok(Some(self.next_id.fetch_add(1, Ordering::SeqCst)))
    }

    async fn push_attribute_snapshot(&self, snapshot: &AttributeSnapshot) -> Result<(), SinkError> {
        self.snapshots.lock().unwrap().push(snapshot.clone());
        Ok(())
    }
}

/// 固定返回的数据源。
#[derive(Default)]
pub struct StaticFeed {
    pub devices: Vec<DeviceMetadata>,
    pub telemetry: Vec<TelemetryRecord>,
    pub positions: Vec<PositionRecord>,
    pub rooms: Vec<Room>,
    pub fail_positions: bool,
    pub telemetry_requests: Mutex<Vec<Vec<String>>>,
}

#[async_trait]
impl FeedSource for StaticFeed {
    async fn list_devices(&self) -> Result<Vec<DeviceMetadata>, FeedError> {
        Ok(self.devices.clone())
    }

    async fn list_telemetry(
        &self,
        tracking_ids: &[String],
        _window: TimeWindow,
    ) -> Result<Vec<TelemetryRecord>, FeedError> {
        self.telemetry_requests
            .lock()
            .unwrap()
            .push(tracking_ids.to_vec());
        Ok(self.telemetry.clone())
    }

    async fn list_positions(&self) -> Result<Vec<PositionRecord>, FeedError> {
        if self.fail_positions {
            return Err(FeedError::Timeout("positions".to_string()));
        }
        Ok(self.positions.clone())
    }

    async fn list_rooms(&self) -> Result<Vec<Room>, FeedError> {
        Ok(self.rooms.clone())
    }
}

pub fn at(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + seconds, 0).unwrap()
}

pub fn window() -> TimeWindow {
    TimeWindow::trailing(at(0), std::time::Duration::from_secs(120))
}

pub fn metadata(mac: &str, product: &str, name: &str) -> DeviceMetadata {
    DeviceMetadata {
        id: format!("id-{}", name),
        mac: mac.to_string(),
        name: name.to_string(),
        model: "model".to_string(),
        product: product.to_string(),
        firmware: "1.0".to_string(),
        battery_level: 80,
        room_number_ir: None,
    }
}

pub fn telemetry(tracking_id: &str, seconds: i64, temperature: f64) -> TelemetryRecord {
    TelemetryRecord {
        tracking_id: tracking_id.to_string(),
        timestamp: at(seconds),
        readings: Readings {
            temperature: Some(temperature),
            ..Readings::default()
        },
    }
}

pub fn position(tracking_id: &str, seconds: i64, x: f64, y: f64, floor_id: i64) -> PositionRecord {
    PositionRecord {
        tracking_id: tracking_id.to_string(),
        timestamp: at(seconds),
        position: LocalPosition { x, y, floor_id },
    }
}

pub fn room(id: i64, room_number: Option<i32>, floor_id: i64, building_id: i64) -> Room {
    Room {
        id,
        name: format!("Room {}", id),
        room_number,
        floor: Floor {
            id: floor_id,
            name: format!("Floor {}", floor_id),
            level: 1,
            building: Building {
                id: building_id,
                name: format!("Building {}", building_id),
                address: "Street 1".to_string(),
                description: String::new(),
            },
        },
    }
}
