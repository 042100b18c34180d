//! 本地坐标 → 世界坐标。
//!
//! `x = local_x - origin.x`，`y = local_y - origin.y`，`z` 取楼层高度；
//! 楼层存在但未设置高度时 `z = 0`。

use domain::{Device, Origin, Room};
use kio_storage::{FloorHeightStore, StorageError};
use std::collections::BTreeMap;

/// 楼层高度查询结果。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FloorHeight {
    /// 位置树中没有该楼层。
    Unknown,
    /// 楼层存在但尚未设置高度。
    Unset,
    Height(f64),
}

/// 楼层高度查询。
pub trait FloorLookup {
    fn floor_height(&self, floor_id: i64) -> FloorHeight;
}

/// 坐标换算错误。
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    #[error("device has no position")]
    NoPosition,
    #[error("unknown floor: {0}")]
    UnknownFloor(i64),
}

/// 周期内的楼层索引：已知楼层来自房间列表，高度来自楼层高度存储。
#[derive(Debug, Clone, Default)]
pub struct FloorIndex {
    floors: BTreeMap<i64, Option<f64>>,
}

impl FloorIndex {
    pub async fn load(
        rooms: &[Room],
        store: &dyn FloorHeightStore,
    ) -> Result<Self, StorageError> {
        let mut floors = BTreeMap::new();
        for room in rooms {
            let floor_id = room.floor.id;
            if floors.contains_key(&floor_id) {
                continue;
            }
            let height = store.get(&floor_id.to_string()).await?;
            floors.insert(floor_id, height);
        }
        Ok(Self { floors })
    }

    /// 直接由 `(楼层 ID, 高度)` 构造。
    pub fn from_floors<I>(floors: I) -> Self
    where
        I: IntoIterator<Item = (i64, Option<f64>)>,
    {
        Self {
            floors: floors.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.floors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.floors.is_empty()
    }
}

impl FloorLookup for FloorIndex {
    fn floor_height(&self, floor_id: i64) -> FloorHeight {
        match self.floors.get(&floor_id) {
            None => FloorHeight::Unknown,
            Some(None) => FloorHeight::Unset,
            Some(Some(height)) => FloorHeight::Height(*height),
        }
    }
}

/// 计算设备世界坐标。
pub fn resolve_world_position(
    device: &Device,
    origin: Origin,
    floors: &impl FloorLookup,
) -> Result<[f64; 3], PositionError> {
    let position = device.position.ok_or(PositionError::NoPosition)?;
    let z = match floors.floor_height(position.floor_id) {
        FloorHeight::Unknown => return Err(PositionError::UnknownFloor(position.floor_id)),
        FloorHeight::Unset => {
            tracing::info!(
                target: "kio.sync",
                floor_id = position.floor_id,
                "floor_height_unset_assuming_zero"
            );
            0.0
        }
        FloorHeight::Height(height) => height,
    };
    Ok([position.x - origin.x, position.y - origin.y, z])
}

/// 为一批设备写入世界坐标，返回成功换算的数量。
///
/// 楼层未知的设备记录 warn 日志，保留其他属性，不写入世界坐标。
pub fn attach_world_positions(
    devices: &mut [Device],
    origin: Origin,
    floors: &impl FloorLookup,
) -> u64 {
    let mut resolved = 0;
    for device in devices.iter_mut() {
        match resolve_world_position(device, origin, floors) {
            Ok(world) => {
                device.world_position = Some(world);
                resolved += 1;
            }
            Err(PositionError::NoPosition) => {
                device.world_position = None;
            }
            Err(err @ PositionError::UnknownFloor(_)) => {
                tracing::warn!(
                    target: "kio.sync",
                    tracking_id = %device.tracking_id,
                    error = %err,
                    "world_position_unresolved"
                );
                device.world_position = None;
            }
        }
    }
    resolved
}
