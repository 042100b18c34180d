//! 资产层级构建：根 → 楼宇 → 楼层 → 房间 → 设备。
//!
//! 每一层的资产 ID 作为下一层的父节点，周期内缓存。
//! 失败隔离：根失败中止该项目；楼宇或楼层失败跳过其下级；房间或设备失败只跳过自身。

use crate::identity::{AssetRequest, IdentityError, IdentityResolver};
use domain::{AssetId, AssetKind, Building, Device, Floor, Room, UnresolvedParentPolicy};
use std::collections::{BTreeMap, HashMap};

/// 根资产的逻辑键。
pub const ROOT_LOGICAL_KEY: &str = "root";
/// 根资产名称。
pub const ROOT_NAME: &str = "Kontakt.io";

/// 由房间列表反推的位置树。
#[derive(Debug, Clone, Default)]
pub struct LocationTree {
    pub buildings: BTreeMap<i64, Building>,
    pub floors: BTreeMap<i64, Floor>,
    pub rooms: BTreeMap<i64, Room>,
}

impl LocationTree {
    pub fn from_rooms(rooms: &[Room]) -> Self {
        let mut tree = Self::default();
        for room in rooms {
            let floor = &room.floor;
            tree.buildings
                .entry(floor.building.id)
                .or_insert_with(|| floor.building.clone());
            tree.floors.entry(floor.id).or_insert_with(|| floor.clone());
            tree.rooms.entry(room.id).or_insert_with(|| room.clone());
        }
        tree
    }
}

/// 一个项目内已解析的位置资产 ID。
#[derive(Debug, Clone, Default)]
pub struct ScopeAssets {
    pub root: AssetId,
    pub buildings: HashMap<i64, AssetId>,
    pub floors: HashMap<i64, AssetId>,
    pub rooms: HashMap<i64, AssetId>,
    room_numbers: HashMap<i32, AssetId>,
}

impl ScopeAssets {
    /// 按房间号查找房间资产。
    pub fn room_by_number(&self, room_number: i32) -> Option<AssetId> {
        self.room_numbers.get(&room_number).copied()
    }

    /// 设备父节点：房间号命中的房间，否则按策略挂根或丢弃。
    pub fn device_parent(
        &self,
        device: &Device,
        policy: UnresolvedParentPolicy,
    ) -> Option<AssetId> {
        if let Some(room) = device
            .room_number_hint
            .and_then(|number| self.room_by_number(number))
        {
            return Some(room);
        }
        match policy {
            UnresolvedParentPolicy::AttachToRoot => Some(self.root),
            UnresolvedParentPolicy::Drop => None,
        }
    }
}

/// 单个项目的资产计数。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeReport {
    pub scope: String,
    pub created: u64,
    pub reused: u64,
    pub failed: u64,
    pub dropped: u64,
    /// 根资产失败导致整个项目跳过。
    pub aborted: bool,
}

impl ScopeReport {
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            ..Self::default()
        }
    }

    fn record(&mut self, created: bool) {
        if created {
            self.created += 1;
        } else {
            self.reused += 1;
        }
    }

    fn record_failure(&mut self, request: &AssetRequest, err: &IdentityError) {
        self.failed += 1;
        kio_telemetry::record_asset_failure();
        tracing::error!(
            target: "kio.identity",
            scope = %request.scope,
            kind = %request.kind,
            logical_key = %request.logical_key,
            error = %err,
            "asset_ensure_failed"
        );
    }
}

/// 层级构建器（按项目调用）。
pub struct HierarchyBuilder<'a> {
    resolver: &'a IdentityResolver,
    scope: &'a str,
}

impl<'a> HierarchyBuilder<'a> {
    pub fn new(resolver: &'a IdentityResolver, scope: &'a str) -> Self {
        Self { resolver, scope }
    }

    async fn ensure(
        &self,
        request: AssetRequest,
        report: &mut ScopeReport,
    ) -> Option<AssetId> {
        match self.resolver.ensure_asset(&request).await {
            Ok((asset_id, created)) => {
                report.record(created);
                Some(asset_id)
            }
            Err(err) => {
                report.record_failure(&request, &err);
                None
            }
        }
    }

    /// 建立位置资产。根资产失败时返回错误，调用方跳过该项目。
    pub async fn build_locations(
        &self,
        tree: &LocationTree,
        report: &mut ScopeReport,
    ) -> Result<ScopeAssets, IdentityError> {
        let root_request = AssetRequest::new(
            self.scope,
            AssetKind::Root,
            ROOT_LOGICAL_KEY,
            None,
            ROOT_NAME,
        );
        let root = match self.resolver.ensure_asset(&root_request).await {
            Ok((asset_id, created)) => {
                report.record(created);
                asset_id
            }
            Err(err) => {
                report.record_failure(&root_request, &err);
                report.aborted = true;
                return Err(err);
            }
        };

        let mut assets = ScopeAssets {
            root,
            ..ScopeAssets::default()
        };
        for building in tree.buildings.values() {
            let request = AssetRequest::new(
                self.scope,
                AssetKind::Building,
                building.id.to_string(),
                Some(root),
                building.name.clone(),
            );
            if let Some(asset_id) = self.ensure(request, report).await {
                assets.buildings.insert(building.id, asset_id);
            }
        }
        for floor in tree.floors.values() {
            let Some(parent) = assets.buildings.get(&floor.building.id).copied() else {
                report.dropped += 1;
                continue;
            };
            let request = AssetRequest::new(
                self.scope,
                AssetKind::Floor,
                floor.id.to_string(),
                Some(parent),
                floor.name.clone(),
            );
            if let Some(asset_id) = self.ensure(request, report).await {
                assets.floors.insert(floor.id, asset_id);
            }
        }
        for room in tree.rooms.values() {
            let Some(parent) = assets.floors.get(&room.floor.id).copied() else {
                report.dropped += 1;
                continue;
            };
            let request = AssetRequest::new(
                self.scope,
                AssetKind::Room,
                room.id.to_string(),
                Some(parent),
                room.name.clone(),
            );
            if let Some(asset_id) = self.ensure(request, report).await {
                assets.rooms.insert(room.id, asset_id);
                if let Some(number) = room.room_number {
                    assets.room_numbers.entry(number).or_insert(asset_id);
                }
            }
        }
        Ok(assets)
    }

    /// 建立设备资产，返回 `(资产 ID, 设备)`。
    pub async fn build_devices<'d>(
        &self,
        assets: &ScopeAssets,
        devices: &'d [Device],
        policy: UnresolvedParentPolicy,
        report: &mut ScopeReport,
    ) -> Vec<(AssetId, &'d Device)> {
        let mut resolved = Vec::with_capacity(devices.len());
        for device in devices {
            let Some(parent) = assets.device_parent(device, policy) else {
                tracing::debug!(
                    target: "kio.identity",
                    scope = %self.scope,
                    tracking_id = %device.tracking_id,
                    "device_parent_unresolved"
                );
                report.dropped += 1;
                continue;
            };
            let request = AssetRequest::new(
                self.scope,
                device.kind,
                device.tracking_id.clone(),
                Some(parent),
                device.display_name(),
            );
            if let Some(asset_id) = self.ensure(request, report).await {
                resolved.push((asset_id, device));
            }
        }
        resolved
    }
}
