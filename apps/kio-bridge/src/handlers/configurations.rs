//! 数据源配置 CRUD。
//!
//! - GET/POST /v1/configurations
//! - GET/PUT/DELETE /v1/configurations/:id

use api_contract::{ApiResponse, ConfigurationDto};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::info;

use crate::AppState;
use crate::utils::{response::*, validation::config_from_dto};

#[derive(serde::Deserialize)]
pub struct ConfigPath {
    pub id: i64,
}

pub async fn list_configurations(State(state): State<AppState>) -> Response {
    match state.configs.list_configs().await {
        Ok(items) => {
            let data: Vec<_> = items.into_iter().map(config_to_dto).collect();
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(err) => storage_error(err),
    }
}

pub async fn get_configuration(
    State(state): State<AppState>,
    Path(path): Path<ConfigPath>,
) -> Response {
    match state.configs.find_config(path.id).await {
        Ok(Some(config)) => {
            (StatusCode::OK, Json(ApiResponse::success(config_to_dto(config)))).into_response()
        }
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

pub async fn create_configuration(
    State(state): State<AppState>,
    Json(req): Json<ConfigurationDto>,
) -> Response {
    let mut config = match config_from_dto(req, 0) {
        Ok(config) => config,
        Err(response) => return response,
    };
    // 运行状态只由调度器设置
    config.active = false;
    match state.configs.create_config(config).await {
        Ok(created) => {
            info!(target: "kio.api", config_id = created.id, "configuration_created");
            (
                StatusCode::CREATED,
                Json(ApiResponse::success(config_to_dto(created))),
            )
                .into_response()
        }
        Err(err) => storage_error(err),
    }
}

pub async fn update_configuration(
    State(state): State<AppState>,
    Path(path): Path<ConfigPath>,
    Json(req): Json<ConfigurationDto>,
) -> Response {
    let keep_active = req.active.is_none();
    let mut config = match config_from_dto(req, path.id) {
        Ok(config) => config,
        Err(response) => return response,
    };
    if keep_active {
        match state.configs.find_config(path.id).await {
            Ok(Some(existing)) => config.active = existing.active,
            Ok(None) => return not_found_error(),
            Err(err) => return storage_error(err),
        }
    }
    match state.configs.update_config(config).await {
        Ok(Some(updated)) => {
            info!(target: "kio.api", config_id = updated.id, "configuration_updated");
            (StatusCode::OK, Json(ApiResponse::success(config_to_dto(updated)))).into_response()
        }
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

pub async fn delete_configuration(
    State(state): State<AppState>,
    Path(path): Path<ConfigPath>,
) -> Response {
    match state.configs.delete_config(path.id).await {
        Ok(true) => {
            info!(target: "kio.api", config_id = path.id, "configuration_deleted");
            (StatusCode::OK, Json(ApiResponse::success(true))).into_response()
        }
        Ok(false) => not_found_error(),
        Err(err) => storage_error(err),
    }
}
