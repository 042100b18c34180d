//! 数据源配置内存存储实现
//!
//! 功能：
//! - 配置 CRUD 操作
//! - 自增 ID 分配
//! - 运行状态维护

use crate::error::StorageError;
use crate::traits::ConfigStore;
use crate::validation::ensure_source_config;
use domain::SourceConfig;
use std::collections::BTreeMap;
use std::sync::RwLock;

struct ConfigTable {
    next_id: i64,
    configs: BTreeMap<i64, SourceConfig>,
}

/// 数据源配置内存存储
pub struct InMemoryConfigStore {
    table: RwLock<ConfigTable>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(ConfigTable {
                next_id: 1,
                configs: BTreeMap::new(),
            }),
        }
    }
}

impl Default for InMemoryConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ConfigStore for InMemoryConfigStore {
    async fn list_configs(&self) -> Result<Vec<SourceConfig>, StorageError> {
        let items = self
            .table
            .read()
            .map(|table| table.configs.values().cloned().collect())
            .unwrap_or_default();
        Ok(items)
    }

    async fn find_config(&self, id: i64) -> Result<Option<SourceConfig>, StorageError> {
        let item = self
            .table
            .read()
            .ok()
            .and_then(|table| table.configs.get(&id).cloned());
        Ok(item)
    }

    async fn create_config(&self, mut config: SourceConfig) -> Result<SourceConfig, StorageError> {
        ensure_source_config(&config)?;
        let mut table = self
            .table
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        config.id = table.next_id;
        table.next_id += 1;
        table.configs.insert(config.id, config.clone());
        Ok(config)
    }

    async fn update_config(
        &self,
        config: SourceConfig,
    ) -> Result<Option<SourceConfig>, StorageError> {
        ensure_source_config(&config)?;
        let mut table = self
            .table
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let Some(existing) = table.configs.get_mut(&config.id) else {
            return Ok(None);
        };
        *existing = config;
        Ok(Some(existing.clone()))
    }

    async fn delete_config(&self, id: i64) -> Result<bool, StorageError> {
        let mut table = self
            .table
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(table.configs.remove(&id).is_some())
    }

    async fn set_active(&self, id: i64, active: bool) -> Result<bool, StorageError> {
        let mut table = self
            .table
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        match table.configs.get_mut(&id) {
            Some(config) => {
                config.active = active;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_all_inactive(&self) -> Result<u64, StorageError> {
        let mut table = self
            .table
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let mut count = 0;
        for config in table.configs.values_mut() {
            config.active = false;
            count += 1;
        }
        Ok(count)
    }
}
