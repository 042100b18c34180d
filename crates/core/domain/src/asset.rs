//! 资产类型定义。
//!
//! 对账引擎与 Eliona 写入适配器共用同一个 [`AssetKind`]，资产类型字符串只在这里出现一次。

use serde::{Deserialize, Serialize};
use std::fmt;

/// Eliona 资产 ID。
pub type AssetId = i32;

/// 资产类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Root,
    Building,
    Floor,
    Room,
    Tag,
    Badge,
    Beacon,
    PortalBeam,
}

impl AssetKind {
    pub const ALL: [AssetKind; 8] = [
        AssetKind::Root,
        AssetKind::Building,
        AssetKind::Floor,
        AssetKind::Room,
        AssetKind::Tag,
        AssetKind::Badge,
        AssetKind::Beacon,
        AssetKind::PortalBeam,
    ];

    /// Eliona 侧的资产类型名。
    pub fn as_str(self) -> &'static str {
        match self {
            AssetKind::Root => "kontakt_io_root",
            AssetKind::Building => "kontakt_io_building",
            AssetKind::Floor => "kontakt_io_floor",
            AssetKind::Room => "kontakt_io_room",
            AssetKind::Tag => "kontakt_io_tag",
            AssetKind::Badge => "kontakt_io_badge",
            AssetKind::Beacon => "kontakt_io_beacon",
            AssetKind::PortalBeam => "kontakt_io_portal_beam",
        }
    }

    pub fn from_type_name(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }

    /// 楼宇 / 楼层 / 房间。
    pub fn is_location(self) -> bool {
        matches!(self, AssetKind::Building | AssetKind::Floor | AssetKind::Room)
    }

    /// 可移动的追踪设备（标签、工牌）。
    pub fn is_tracker(self) -> bool {
        matches!(self, AssetKind::Tag | AssetKind::Badge)
    }

    pub fn is_device(self) -> bool {
        matches!(
            self,
            AssetKind::Tag | AssetKind::Badge | AssetKind::Beacon | AssetKind::PortalBeam
        )
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 属性数据子类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSubtype {
    Info,
    Status,
    Input,
    Output,
}

impl DataSubtype {
    pub fn as_str(self) -> &'static str {
        match self {
            DataSubtype::Info => "info",
            DataSubtype::Status => "status",
            DataSubtype::Input => "input",
            DataSubtype::Output => "output",
        }
    }
}
