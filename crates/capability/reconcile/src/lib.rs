//! Kontakt.io → Eliona 对账引擎。
//!
//! 每个同步周期执行一次：
//! 1. 从 [`FeedSource`] 拉取设备清单、遥测、定位与房间；
//! 2. [`merge`] 合并三路数据，[`filter`] 剔除范围外的设备；
//! 3. [`position`] 计算世界坐标；
//! 4. [`hierarchy`] 与 [`identity`] 按 根 → 楼宇 → 楼层 → 房间 → 设备 建立资产并记录映射；
//! 5. [`snapshot`] 生成属性快照写入 [`AssetSink`]。
//!
//! 入口为 [`Reconciler::run_cycle`]。

pub mod cycle;
pub mod filter;
pub mod hierarchy;
pub mod identity;
pub mod merge;
pub mod position;
pub mod snapshot;
pub mod sources;

pub use cycle::{CycleError, CycleReport, Reconciler};
pub use filter::{CompiledFilter, FilterError, matches};
pub use hierarchy::{HierarchyBuilder, LocationTree, ScopeAssets, ScopeReport};
pub use identity::{AssetRequest, IdentityError, IdentityResolver};
pub use merge::{
    MergeOutcome, MergeStats, MetadataIndex, classify_product, index_metadata, merge, merge_indexed,
};
pub use position::{
    FloorHeight, FloorIndex, FloorLookup, PositionError, attach_world_positions,
    resolve_world_position,
};
pub use sources::{
    AssetDescriptor, AssetParent, AssetSink, AttributeSnapshot, DeadlineSink, FeedError, FeedSource,
    SinkError, TimeWindow,
};
