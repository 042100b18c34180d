//! 楼层高度内存存储实现

use crate::error::StorageError;
use crate::traits::FloorHeightStore;
use std::collections::HashMap;
use std::sync::RwLock;

pub struct InMemoryFloorHeightStore {
    heights: RwLock<HashMap<String, f64>>,
}

impl InMemoryFloorHeightStore {
    pub fn new() -> Self {
        Self {
            heights: RwLock::new(HashMap::new()),
        }
    }

    /// 预置楼层高度（测试用）。
    pub fn with_heights<I, K>(heights: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        Self {
            heights: RwLock::new(
                heights
                    .into_iter()
                    .map(|(key, height)| (key.into(), height))
                    .collect(),
            ),
        }
    }
}

impl Default for InMemoryFloorHeightStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl FloorHeightStore for InMemoryFloorHeightStore {
    async fn get(&self, floor_key: &str) -> Result<Option<f64>, StorageError> {
        let height = self
            .heights
            .read()
            .map_err(|_| StorageError::new("lock failed"))?
            .get(floor_key)
            .copied();
        Ok(height)
    }

    async fn set(&self, floor_key: &str, height: f64) -> Result<(), StorageError> {
        if !height.is_finite() {
            return Err(StorageError::new("height must be finite"));
        }
        self.heights
            .write()
            .map_err(|_| StorageError::new("lock failed"))?
            .insert(floor_key.to_string(), height);
        Ok(())
    }
}
