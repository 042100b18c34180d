//! 外部协作方抽象：数据源（Kontakt.io）与资产写入端（Eliona）。

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use domain::{AssetId, AssetKind, DataSubtype, DeviceMetadata, PositionRecord, Room, TelemetryRecord};
use serde_json::{Map, Value};
use std::sync::Arc;

/// 遥测查询时间窗口 `[start, end]`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// 以 `end` 为终点、向前 `length` 的窗口。
    pub fn trailing(end: DateTime<Utc>, length: std::time::Duration) -> Self {
        let length = Duration::from_std(length).unwrap_or_else(|_| Duration::zero());
        Self {
            start: end - length,
            end,
        }
    }
}

/// 数据源错误。任一错误都会中止当前周期，由下一次调度重试。
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("decode error: {0}")]
    Decode(String),
}

/// 数据源抽象。
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// 设备清单。
    async fn list_devices(&self) -> Result<Vec<DeviceMetadata>, FeedError>;

    /// 指定设备在时间窗口内的遥测。
    async fn list_telemetry(
        &self,
        tracking_ids: &[String],
        window: TimeWindow,
    ) -> Result<Vec<TelemetryRecord>, FeedError>;

    /// 设备当前定位。
    async fn list_positions(&self) -> Result<Vec<PositionRecord>, FeedError>;

    /// 房间列表（内嵌楼层与楼宇）。
    async fn list_rooms(&self) -> Result<Vec<Room>, FeedError>;
}

/// 资产父节点。位置类资产挂在位置树上，设备挂在功能树上。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetParent {
    None,
    Locational(AssetId),
    Functional(AssetId),
}

impl AssetParent {
    pub fn locational(&self) -> Option<AssetId> {
        match self {
            AssetParent::Locational(id) => Some(*id),
            _ => None,
        }
    }

    pub fn functional(&self) -> Option<AssetId> {
        match self {
            AssetParent::Functional(id) => Some(*id),
            _ => None,
        }
    }
}

/// 资产创建请求。
#[derive(Debug, Clone, PartialEq)]
pub struct AssetDescriptor {
    pub scope: String,
    pub kind: AssetKind,
    pub global_identifier: String,
    pub name: String,
    pub description: String,
    pub parent: AssetParent,
    pub is_tracker: bool,
}

/// 属性快照。
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSnapshot {
    pub asset_id: AssetId,
    pub subtype: DataSubtype,
    pub timestamp: DateTime<Utc>,
    pub data: Map<String, Value>,
}

/// 资产写入端错误。
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("rejected: {0}")]
    Rejected(String),
    #[error("decode error: {0}")]
    Decode(String),
}

/// 资产写入端抽象。
#[async_trait]
pub trait AssetSink: Send + Sync {
    /// 创建或更新资产，返回资产 ID；写入端未返回 ID 时为 `None`。
    async fn upsert_asset(&self, descriptor: &AssetDescriptor)
    -> Result<Option<AssetId>, SinkError>;

    /// 写入一条属性快照。
    async fn push_attribute_snapshot(&self, snapshot: &AttributeSnapshot) -> Result<(), SinkError>;
}

/// 为每次写入调用加上截止时间（数据源配置的请求超时）。
pub struct DeadlineSink {
    inner: Arc<dyn AssetSink>,
    timeout: std::time::Duration,
}

impl DeadlineSink {
    pub fn new(inner: Arc<dyn AssetSink>, timeout: std::time::Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl AssetSink for DeadlineSink {
    async fn upsert_asset(
        &self,
        descriptor: &AssetDescriptor,
    ) -> Result<Option<AssetId>, SinkError> {
        tokio::time::timeout(self.timeout, self.inner.upsert_asset(descriptor))
            .await
            .map_err(|_| SinkError::Timeout(self.timeout))?
    }

    async fn push_attribute_snapshot(&self, snapshot: &AttributeSnapshot) -> Result<(), SinkError> {
        tokio::time::timeout(self.timeout, self.inner.push_attribute_snapshot(snapshot))
            .await
            .map_err(|_| SinkError::Timeout(self.timeout))?
    }
}
