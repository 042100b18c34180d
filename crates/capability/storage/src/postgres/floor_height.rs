//! Postgres 楼层高度存储实现

use crate::error::StorageError;
use crate::traits::FloorHeightStore;
use sqlx::{PgPool, Row};

pub struct PgFloorHeightStore {
    pub pool: PgPool,
}

impl PgFloorHeightStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl FloorHeightStore for PgFloorHeightStore {
    async fn get(&self, floor_key: &str) -> Result<Option<f64>, StorageError> {
        let row = sqlx::query("select height from floor_height where floor_key = $1")
            .bind(floor_key)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(row.try_get("height")?)
    }

    async fn set(&self, floor_key: &str, height: f64) -> Result<(), StorageError> {
        if !height.is_finite() {
            return Err(StorageError::new("height must be finite"));
        }
        sqlx::query(
            "insert into floor_height (floor_key, height) values ($1, $2) \
             on conflict (floor_key) do update set height = excluded.height",
        )
        .bind(floor_key)
        .bind(height)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
