//! 资产映射查询（只读）。
//!
//! - GET /v1/mappings/:scope

use api_contract::ApiResponse;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::AppState;
use crate::utils::{response::*, validation::normalize_required};

#[derive(serde::Deserialize)]
pub struct MappingPath {
    pub scope: String,
}

pub async fn list_mappings(
    State(state): State<AppState>,
    Path(path): Path<MappingPath>,
) -> Response {
    let scope = match normalize_required(path.scope, "scope") {
        Ok(scope) => scope,
        Err(response) => return response,
    };
    match state.mappings.list_scope(&scope).await {
        Ok(items) => {
            let data: Vec<_> = items.into_iter().map(mapping_to_dto).collect();
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(err) => storage_error(err),
    }
}
