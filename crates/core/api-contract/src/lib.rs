//! 配置接口的 DTO 与 API 响应契约。

use serde::{Deserialize, Serialize};

/// 标准 API 响应封装。
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

/// 失败响应的错误体。
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

/// 单条过滤规则。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRuleDto {
    pub parameter: String,
    pub regex: String,
}

/// 数据源配置（请求与响应共用）。
///
/// 外层数组各组之间为或，组内规则为与。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub api_key: String,
    #[serde(default)]
    pub enable: Option<bool>,
    #[serde(default)]
    pub refresh_interval: Option<u64>,
    #[serde(default)]
    pub request_timeout: Option<u64>,
    #[serde(default)]
    pub asset_filter: Option<Vec<Vec<FilterRuleDto>>>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default, rename = "projectIDs")]
    pub project_ids: Option<Vec<String>>,
    #[serde(default)]
    pub absolute_x: Option<f64>,
    #[serde(default)]
    pub absolute_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unresolved_parent: Option<String>,
}

/// 资产映射返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingDto {
    pub scope: String,
    pub asset_type: String,
    pub logical_key: String,
    pub global_asset_identifier: String,
    pub asset_id: i32,
}

/// 运行指标快照。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshotDto {
    pub cycles_started: u64,
    pub cycles_succeeded: u64,
    pub cycles_failed: u64,
    pub devices_merged: u64,
    pub devices_filtered: u64,
    pub devices_unmatched: u64,
    pub devices_unsupported: u64,
    pub assets_created: u64,
    pub asset_failures: u64,
    pub snapshots_pushed: u64,
    pub snapshot_failures: u64,
    pub floor_heights_updated: u64,
}
