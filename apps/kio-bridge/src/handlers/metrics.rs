//! 健康检查与同步指标。
//!
//! - GET /health
//! - GET /metrics

use api_contract::{ApiResponse, MetricsSnapshotDto};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use kio_telemetry::metrics;

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true }))
}

pub async fn get_metrics() -> Response {
    let snapshot = metrics().snapshot();
    (
        StatusCode::OK,
        Json(ApiResponse::success(MetricsSnapshotDto {
            cycles_started: snapshot.cycles_started,
            cycles_succeeded: snapshot.cycles_succeeded,
            cycles_failed: snapshot.cycles_failed,
            devices_merged: snapshot.devices_merged,
            devices_filtered: snapshot.devices_filtered,
            devices_unmatched: snapshot.devices_unmatched,
            devices_unsupported: snapshot.devices_unsupported,
            assets_created: snapshot.assets_created,
            asset_failures: snapshot.asset_failures,
            snapshots_pushed: snapshot.snapshots_pushed,
            snapshot_failures: snapshot.snapshot_failures,
            floor_heights_updated: snapshot.floor_heights_updated,
        })),
    )
        .into_response()
}
