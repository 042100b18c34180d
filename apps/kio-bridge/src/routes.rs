//! 路由定义
//!
//! - 健康检查与指标：/health, /metrics
//! - 数据源配置：/v1/configurations/*
//! - 资产映射查询：/v1/mappings/:scope

use super::AppState;
use super::handlers::*;
use axum::{Router, routing::get};

/// 创建 API 路由
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(get_metrics))
        .route(
            "/v1/configurations",
            get(list_configurations).post(create_configuration),
        )
        .route(
            "/v1/configurations/:id",
            get(get_configuration)
                .put(update_configuration)
                .delete(delete_configuration),
        )
        .route("/v1/mappings/:scope", get(list_mappings))
}
