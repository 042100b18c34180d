//! HTTP 响应辅助函数和 DTO 转换
//!
//! - 错误响应：bad_request_error, not_found_error, storage_error
//! - DTO 转换：config_to_dto, mapping_to_dto

use api_contract::{ApiResponse, ConfigurationDto, FilterRuleDto, MappingDto};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use domain::SourceConfig;
use kio_storage::{MappingRecord, StorageError};

/// 错误请求响应
pub fn bad_request_error(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::error("INVALID.REQUEST", message.into())),
    )
        .into_response()
}

/// 资源未找到错误响应
pub fn not_found_error() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::error("RESOURCE.NOT_FOUND", "not found")),
    )
        .into_response()
}

/// 存储错误响应；映射冲突返回 409
pub fn storage_error(err: StorageError) -> Response {
    let status = if err.is_conflict() {
        StatusCode::CONFLICT
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    let code = if err.is_conflict() {
        "RESOURCE.CONFLICT"
    } else {
        "INTERNAL.ERROR"
    };
    (status, Json(ApiResponse::<()>::error(code, err.to_string()))).into_response()
}

pub fn config_to_dto(config: SourceConfig) -> ConfigurationDto {
    let asset_filter = config
        .asset_filter
        .groups
        .into_iter()
        .map(|group| {
            group
                .into_iter()
                .map(|rule| FilterRuleDto {
                    parameter: rule.parameter,
                    regex: rule.regex,
                })
                .collect()
        })
        .collect();
    ConfigurationDto {
        id: Some(config.id),
        api_key: config.api_key,
        enable: Some(config.enable),
        refresh_interval: Some(config.refresh_interval_secs),
        request_timeout: Some(config.request_timeout_secs),
        asset_filter: Some(asset_filter),
        active: Some(config.active),
        project_ids: Some(config.project_ids),
        absolute_x: Some(config.absolute_x),
        absolute_y: Some(config.absolute_y),
        unresolved_parent: Some(config.unresolved_parent.as_str().to_string()),
    }
}

pub fn mapping_to_dto(record: MappingRecord) -> MappingDto {
    MappingDto {
        global_asset_identifier: record.key.global_identifier(),
        asset_type: record.key.kind.as_str().to_string(),
        scope: record.key.scope,
        logical_key: record.key.logical_key,
        asset_id: record.asset_id,
    }
}
