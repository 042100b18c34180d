//! 跨模块共享的领域模型。
//!
//! - [`asset`]：资产类型、资产 ID、属性数据子类型
//! - [`device`]：设备元数据、遥测、定位与合并后的设备记录
//! - [`location`]：楼宇 → 楼层 → 房间
//! - [`filter`]：资产过滤规则
//! - [`config`]：数据源配置

pub mod asset;
pub mod config;
pub mod device;
pub mod filter;
pub mod location;

pub use asset::{AssetId, AssetKind, DataSubtype};
pub use config::{Origin, SourceConfig, UnresolvedParentPolicy};
pub use device::{
    Device, DeviceMetadata, LocalPosition, PositionRecord, Readings, TelemetryRecord,
    normalize_tracking_id,
};
pub use filter::{FilterRule, FilterRuleSet};
pub use location::{Building, Floor, Room};
