//! Postgres 资产映射存储实现
//!
//! 表 `asset_mapping` 以 `(scope, kind, logical_key)` 为主键，`asset_id` 唯一。
//! 写入使用 `on conflict do nothing`，并校验已存在记录的资产 ID 一致。

use crate::error::StorageError;
use crate::models::{MappingKey, MappingRecord};
use crate::traits::MappingStore;
use crate::validation::{ensure_mapping_key, ensure_scope};
use domain::{AssetId, AssetKind};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

pub struct PgMappingStore {
    pub pool: PgPool,
}

impl PgMappingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = crate::connection::connect_pool(database_url).await?;
        Ok(Self { pool })
    }
}

fn record_from_row(row: &PgRow) -> Result<MappingRecord, StorageError> {
    let kind: String = row.try_get("kind")?;
    let kind = AssetKind::from_type_name(&kind)
        .ok_or_else(|| StorageError::new(format!("unknown asset kind: {}", kind)))?;
    Ok(MappingRecord {
        key: MappingKey {
            scope: row.try_get("scope")?,
            kind,
            logical_key: row.try_get("logical_key")?,
        },
        asset_id: row.try_get("asset_id")?,
    })
}

#[async_trait::async_trait]
impl MappingStore for PgMappingStore {
    async fn get(&self, key: &MappingKey) -> Result<Option<AssetId>, StorageError> {
        ensure_mapping_key(key)?;
        let row = sqlx::query(
            "select asset_id from asset_mapping \
             where scope = $1 and kind = $2 and logical_key = $3",
        )
        .bind(&key.scope)
        .bind(key.kind.as_str())
        .bind(&key.logical_key)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(row.try_get("asset_id")?))
    }

    async fn put(&self, record: MappingRecord) -> Result<(), StorageError> {
        ensure_mapping_key(&record.key)?;
        let result = sqlx::query(
            "insert into asset_mapping (scope, kind, logical_key, asset_id) \
             values ($1, $2, $3, $4) \
             on conflict (scope, kind, logical_key) do nothing",
        )
        .bind(&record.key.scope)
        .bind(record.key.kind.as_str())
        .bind(&record.key.logical_key)
        .bind(record.asset_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() > 0 {
            return Ok(());
        }
        match self.get(&record.key).await? {
            Some(existing) if existing == record.asset_id => Ok(()),
            Some(existing) => Err(StorageError::conflict(format!(
                "mapping {} already bound to asset {}",
                record.key.global_identifier(),
                existing
            ))),
            None => Err(StorageError::new("mapping insert skipped")),
        }
    }

    async fn delete(&self, key: &MappingKey) -> Result<bool, StorageError> {
        ensure_mapping_key(key)?;
        let result = sqlx::query(
            "delete from asset_mapping where scope = $1 and kind = $2 and logical_key = $3",
        )
        .bind(&key.scope)
        .bind(key.kind.as_str())
        .bind(&key.logical_key)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_asset_id(
        &self,
        asset_id: AssetId,
    ) -> Result<Option<MappingRecord>, StorageError> {
        let row = sqlx::query(
            "select scope, kind, logical_key, asset_id from asset_mapping where asset_id = $1",
        )
        .bind(asset_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(record_from_row).transpose()
    }

    async fn list_scope(&self, scope: &str) -> Result<Vec<MappingRecord>, StorageError> {
        ensure_scope(scope)?;
        let rows = sqlx::query(
            "select scope, kind, logical_key, asset_id from asset_mapping \
             where scope = $1 order by kind, logical_key",
        )
        .bind(scope)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(record_from_row).collect()
    }
}
