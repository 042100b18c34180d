//! 存储接口 Trait 定义
//!
//! - MappingStore：资产映射（对账引擎读写）
//! - FloorHeightStore：楼层高度（对账引擎只读，回写监听写入）
//! - ConfigStore：数据源配置（配置 API 与调度器使用）
//!
//! 设计原则：
//! - 所有接口返回 StorageError
//! - 使用 async_trait 支持动态分发

use crate::error::StorageError;
use crate::models::{MappingKey, MappingRecord};
use async_trait::async_trait;
use domain::{AssetId, SourceConfig};

/// 资产映射存储接口
///
/// 同一个 `MappingKey` 至多对应一个资产 ID，写入后不再改写。
#[async_trait]
pub trait MappingStore: Send + Sync {
    /// 查找映射
    async fn get(&self, key: &MappingKey) -> Result<Option<AssetId>, StorageError>;

    /// 写入映射；键已存在且资产 ID 不同则返回错误
    async fn put(&self, record: MappingRecord) -> Result<(), StorageError>;

    /// 删除映射（管理操作，对账引擎不调用）
    async fn delete(&self, key: &MappingKey) -> Result<bool, StorageError>;

    /// 按资产 ID 反查映射
    async fn find_by_asset_id(
        &self,
        asset_id: AssetId,
    ) -> Result<Option<MappingRecord>, StorageError>;

    /// 列出项目下的全部映射
    async fn list_scope(&self, scope: &str) -> Result<Vec<MappingRecord>, StorageError>;
}

/// 楼层高度存储接口
#[async_trait]
pub trait FloorHeightStore: Send + Sync {
    /// 读取楼层高度；未设置返回 None
    async fn get(&self, floor_key: &str) -> Result<Option<f64>, StorageError>;

    /// 设置楼层高度
    async fn set(&self, floor_key: &str, height: f64) -> Result<(), StorageError>;
}

/// 数据源配置存储接口
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// 列出全部配置
    async fn list_configs(&self) -> Result<Vec<SourceConfig>, StorageError>;

    /// 查找指定配置
    async fn find_config(&self, id: i64) -> Result<Option<SourceConfig>, StorageError>;

    /// 创建配置（忽略传入 ID，由存储分配）
    async fn create_config(&self, config: SourceConfig) -> Result<SourceConfig, StorageError>;

    /// 整体更新配置
    async fn update_config(
        &self,
        config: SourceConfig,
    ) -> Result<Option<SourceConfig>, StorageError>;

    /// 删除配置
    async fn delete_config(&self, id: i64) -> Result<bool, StorageError>;

    /// 设置运行状态
    async fn set_active(&self, id: i64, active: bool) -> Result<bool, StorageError>;

    /// 全部置为未运行（启动时调用）
    async fn set_all_inactive(&self) -> Result<u64, StorageError>;
}
