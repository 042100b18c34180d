//! 数据模型
//!
//! - 资产映射：MappingKey, MappingRecord
//!
//! 数据源配置直接使用 `domain::SourceConfig`。

use domain::{AssetId, AssetKind};

/// 资产映射键：`(项目, 资产类型, 逻辑键)`。
///
/// 逻辑键为 Kontakt.io 侧的原始 ID（楼宇/楼层/房间的数字 ID，设备的 tracking id），
/// 资产类型作为键的一部分，不同类型的同名 ID 不会冲突。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MappingKey {
    pub scope: String,
    pub kind: AssetKind,
    pub logical_key: String,
}

impl MappingKey {
    pub fn new(scope: impl Into<String>, kind: AssetKind, logical_key: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            kind,
            logical_key: logical_key.into(),
        }
    }

    /// Eliona 全局资产标识：`{资产类型}{逻辑键}`，根资产只用资产类型。
    pub fn global_identifier(&self) -> String {
        match self.kind {
            AssetKind::Root => self.kind.as_str().to_string(),
            _ => format!("{}{}", self.kind.as_str(), self.logical_key),
        }
    }
}

/// 资产映射记录。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRecord {
    pub key: MappingKey,
    pub asset_id: AssetId,
}
