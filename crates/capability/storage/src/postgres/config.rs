//! Postgres 数据源配置存储实现
//!
//! 过滤规则以 JSON 文本存放在 `asset_filter` 列，项目列表为 `text[]`。

use crate::error::StorageError;
use crate::traits::ConfigStore;
use crate::validation::ensure_source_config;
use domain::{FilterRuleSet, SourceConfig, UnresolvedParentPolicy};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

const SELECT_COLUMNS: &str = "select id, api_key, enable, refresh_interval, request_timeout, \
     asset_filter, active, project_ids, absolute_x, absolute_y, unresolved_parent \
     from configuration";

pub struct PgConfigStore {
    pub pool: PgPool,
}

impl PgConfigStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn config_from_row(row: &PgRow) -> Result<SourceConfig, StorageError> {
    let asset_filter: Option<String> = row.try_get("asset_filter")?;
    let asset_filter = match asset_filter.as_deref() {
        Some(json) if !json.is_empty() => serde_json::from_str::<FilterRuleSet>(json)?,
        _ => FilterRuleSet::default(),
    };
    let unresolved_parent: String = row.try_get("unresolved_parent")?;
    let unresolved_parent = UnresolvedParentPolicy::parse(&unresolved_parent).ok_or_else(|| {
        StorageError::new(format!("unknown unresolved_parent: {}", unresolved_parent))
    })?;
    let refresh_interval: i64 = row.try_get("refresh_interval")?;
    let request_timeout: i64 = row.try_get("request_timeout")?;
    Ok(SourceConfig {
        id: row.try_get("id")?,
        api_key: row.try_get("api_key")?,
        enable: row.try_get("enable")?,
        refresh_interval_secs: u64::try_from(refresh_interval)
            .map_err(|_| StorageError::new("negative refresh_interval"))?,
        request_timeout_secs: u64::try_from(request_timeout)
            .map_err(|_| StorageError::new("negative request_timeout"))?,
        asset_filter,
        active: row.try_get("active")?,
        project_ids: row.try_get("project_ids")?,
        absolute_x: row.try_get("absolute_x")?,
        absolute_y: row.try_get("absolute_y")?,
        unresolved_parent,
    })
}

fn to_i64(value: u64, field: &str) -> Result<i64, StorageError> {
    i64::try_from(value).map_err(|_| StorageError::new(format!("{} out of range", field)))
}

#[async_trait::async_trait]
impl ConfigStore for PgConfigStore {
    async fn list_configs(&self) -> Result<Vec<SourceConfig>, StorageError> {
        let rows = sqlx::query(&format!("{} order by id", SELECT_COLUMNS))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(config_from_row).collect()
    }

    async fn find_config(&self, id: i64) -> Result<Option<SourceConfig>, StorageError> {
        let row = sqlx::query(&format!("{} where id = $1", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(config_from_row).transpose()
    }

    async fn create_config(&self, mut config: SourceConfig) -> Result<SourceConfig, StorageError> {
        ensure_source_config(&config)?;
        let asset_filter = serde_json::to_string(&config.asset_filter)?;
        let row = sqlx::query(
            "insert into configuration (api_key, enable, refresh_interval, request_timeout, \
             asset_filter, active, project_ids, absolute_x, absolute_y, unresolved_parent) \
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) returning id",
        )
        .bind(&config.api_key)
        .bind(config.enable)
        .bind(to_i64(config.refresh_interval_secs, "refresh_interval")?)
        .bind(to_i64(config.request_timeout_secs, "request_timeout")?)
        .bind(asset_filter)
        .bind(config.active)
        .bind(&config.project_ids)
        .bind(config.absolute_x)
        .bind(config.absolute_y)
        .bind(config.unresolved_parent.as_str())
        .fetch_one(&self.pool)
        .await?;
        config.id = row.try_get("id")?;
        Ok(config)
    }

    async fn update_config(
        &self,
        config: SourceConfig,
    ) -> Result<Option<SourceConfig>, StorageError> {
        ensure_source_config(&config)?;
        let asset_filter = serde_json::to_string(&config.asset_filter)?;
        let result = sqlx::query(
            "update configuration set api_key = $2, enable = $3, refresh_interval = $4, \
             request_timeout = $5, asset_filter = $6, active = $7, project_ids = $8, \
             absolute_x = $9, absolute_y = $10, unresolved_parent = $11 where id = $1",
        )
        .bind(config.id)
        .bind(&config.api_key)
        .bind(config.enable)
        .bind(to_i64(config.refresh_interval_secs, "refresh_interval")?)
        .bind(to_i64(config.request_timeout_secs, "request_timeout")?)
        .bind(asset_filter)
        .bind(config.active)
        .bind(&config.project_ids)
        .bind(config.absolute_x)
        .bind(config.absolute_y)
        .bind(config.unresolved_parent.as_str())
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(config))
    }

    async fn delete_config(&self, id: i64) -> Result<bool, StorageError> {
        let result = sqlx::query("delete from configuration where id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_active(&self, id: i64, active: bool) -> Result<bool, StorageError> {
        let result = sqlx::query("update configuration set active = $2 where id = $1")
            .bind(id)
            .bind(active)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_all_inactive(&self) -> Result<u64, StorageError> {
        let result = sqlx::query("update configuration set active = false")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
