//! 验证辅助函数
//!
//! - ensure_scope：项目 ID 非空
//! - ensure_mapping_key：映射键完整
//! - ensure_source_config：数据源配置取值合法

use crate::error::StorageError;
use crate::models::MappingKey;
use domain::SourceConfig;

/// 验证项目 ID 非空
pub fn ensure_scope(scope: &str) -> Result<(), StorageError> {
    if scope.trim().is_empty() {
        return Err(StorageError::new("scope required"));
    }
    Ok(())
}

/// 验证映射键
pub fn ensure_mapping_key(key: &MappingKey) -> Result<(), StorageError> {
    ensure_scope(&key.scope)?;
    if key.logical_key.is_empty() {
        return Err(StorageError::new("logical_key required"));
    }
    Ok(())
}

/// 验证数据源配置
///
/// 刷新间隔与请求超时必须为正，项目 ID 不能为空串。
pub fn ensure_source_config(config: &SourceConfig) -> Result<(), StorageError> {
    if config.refresh_interval_secs == 0 {
        return Err(StorageError::new("refresh_interval must be positive"));
    }
    if config.request_timeout_secs == 0 {
        return Err(StorageError::new("request_timeout must be positive"));
    }
    for project_id in &config.project_ids {
        ensure_scope(project_id)?;
    }
    Ok(())
}
