//! 资产映射内存存储实现
//!
//! 用于测试与未配置数据库时的本地运行。

use crate::error::StorageError;
use crate::models::{MappingKey, MappingRecord};
use crate::traits::MappingStore;
use crate::validation::{ensure_mapping_key, ensure_scope};
use domain::AssetId;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// 资产映射内存存储
///
/// 使用 RwLock + BTreeMap，列表结果按键有序。
pub struct InMemoryMappingStore {
    mappings: RwLock<BTreeMap<MappingKey, AssetId>>,
}

impl InMemoryMappingStore {
    pub fn new() -> Self {
        Self {
            mappings: RwLock::new(BTreeMap::new()),
        }
    }

    /// 当前映射条数。
    pub fn len(&self) -> usize {
        self.mappings.read().map(|map| map.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryMappingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl MappingStore for InMemoryMappingStore {
    async fn get(&self, key: &MappingKey) -> Result<Option<AssetId>, StorageError> {
        ensure_mapping_key(key)?;
        let item = self
            .mappings
            .read()
            .map_err(|_| StorageError::new("lock failed"))?
            .get(key)
            .copied();
        Ok(item)
    }

    async fn put(&self, record: MappingRecord) -> Result<(), StorageError> {
        ensure_mapping_key(&record.key)?;
        let mut map = self
            .mappings
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        match map.get(&record.key) {
            Some(existing) if *existing == record.asset_id => Ok(()),
            Some(existing) => Err(StorageError::conflict(format!(
                "mapping {} already bound to asset {}",
                record.key.global_identifier(),
                existing
            ))),
            None => {
                map.insert(record.key, record.asset_id);
                Ok(())
            }
        }
    }

    async fn delete(&self, key: &MappingKey) -> Result<bool, StorageError> {
        ensure_mapping_key(key)?;
        let mut map = self
            .mappings
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(map.remove(key).is_some())
    }

    async fn find_by_asset_id(
        &self,
        asset_id: AssetId,
    ) -> Result<Option<MappingRecord>, StorageError> {
        let item = self
            .mappings
            .read()
            .map_err(|_| StorageError::new("lock failed"))?
            .iter()
            .find(|(_, id)| **id == asset_id)
            .map(|(key, id)| MappingRecord {
                key: key.clone(),
                asset_id: *id,
            });
        Ok(item)
    }

    async fn list_scope(&self, scope: &str) -> Result<Vec<MappingRecord>, StorageError> {
        ensure_scope(scope)?;
        let items = self
            .mappings
            .read()
            .map(|map| {
                map.iter()
                    .filter(|(key, _)| key.scope == scope)
                    .map(|(key, id)| MappingRecord {
                        key: key.clone(),
                        asset_id: *id,
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(items)
    }
}
