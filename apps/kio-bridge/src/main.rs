//! Kontakt.io → Eliona 同步服务：配置 API、周期同步与楼层高度回写监听。

mod feedback;
mod handlers;
mod routes;
mod sync;
mod utils;

use axum::{
    Router,
    body::Body,
    http::{HeaderValue, Request},
    middleware::{self, Next},
    response::Response,
};
use kio_config::AppConfig;
use kio_eliona::ElionaClient;
use kio_kontakt::KontaktEndpoints;
use kio_reconcile::Reconciler;
use kio_storage::{
    ConfigStore, FloorHeightStore, InMemoryConfigStore, InMemoryFloorHeightStore,
    InMemoryMappingStore, MappingStore, PgConfigStore, PgFloorHeightStore, PgMappingStore,
    connect_pool,
};
use kio_telemetry::{init_tracing, new_request_ids};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{Instrument, info, warn};

use crate::sync::{KontaktFeeds, SyncService};

/// 配置 API 共享状态。
#[derive(Clone)]
pub struct AppState {
    pub configs: Arc<dyn ConfigStore>,
    pub mappings: Arc<dyn MappingStore>,
}

/// 三类存储。
struct Stores {
    configs: Arc<dyn ConfigStore>,
    mappings: Arc<dyn MappingStore>,
    floor_heights: Arc<dyn FloorHeightStore>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    init_tracing();

    let stores = build_stores(&config).await?;
    let http = reqwest::Client::new();

    // 周期同步：Eliona 写入端 + 每个数据源一个 Kontakt.io 客户端
    let sink = Arc::new(ElionaClient::new(
        http.clone(),
        config.eliona_api_url.clone(),
        config.eliona_api_token.clone(),
    ));
    // 资产类型先于任何资产写入创建
    let type_timeout = std::time::Duration::from_secs(domain::config::DEFAULT_REQUEST_TIMEOUT_SECS);
    match sink.ensure_asset_types(type_timeout).await {
        Ok(count) => info!(target: "kio.sync", count, "asset_types_ready"),
        Err(err) => warn!(target: "kio.sync", error = %err, "asset_types_failed"),
    }
    let reconciler = Arc::new(Reconciler::new(
        sink,
        stores.mappings.clone(),
        stores.floor_heights.clone(),
    ));
    let feeds = Arc::new(KontaktFeeds::new(
        http,
        KontaktEndpoints {
            apps_url: config.kontakt_apps_url.clone(),
            device_url: config.kontakt_device_url.clone(),
        },
    ));
    let sync = SyncService::new(
        stores.configs.clone(),
        reconciler,
        feeds,
        config.telemetry_window(),
    );
    let _sync_task = sync.spawn(config.scheduler_tick());
    let _feedback_task = feedback::spawn_feedback(
        &config,
        stores.mappings.clone(),
        stores.floor_heights.clone(),
    );

    let state = AppState {
        configs: stores.configs,
        mappings: stores.mappings,
    };
    let app = build_app(state);

    info!(target: "kio.api", addr = %config.http_addr, "http_listening");
    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// 按配置选择 Postgres 或内存存储。
async fn build_stores(config: &AppConfig) -> Result<Stores, kio_storage::StorageError> {
    match config.database_url.as_deref() {
        Some(url) => {
            let pool = connect_pool(url).await?;
            info!(target: "kio.api", "storage_postgres");
            Ok(Stores {
                configs: Arc::new(PgConfigStore::new(pool.clone())),
                mappings: Arc::new(PgMappingStore::new(pool.clone())),
                floor_heights: Arc::new(PgFloorHeightStore::new(pool)),
            })
        }
        None => {
            warn!(target: "kio.api", "storage_in_memory");
            Ok(Stores {
                configs: Arc::new(InMemoryConfigStore::new()),
                mappings: Arc::new(InMemoryMappingStore::new()),
                floor_heights: Arc::new(InMemoryFloorHeightStore::new()),
            })
        }
    }
}

/// 组装路由与中间件。
pub fn build_app(state: AppState) -> Router {
    routes::create_api_router().with_state(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            // 注入 request_id/trace_id
            .layer(middleware::from_fn(request_context)),
    )
}

async fn request_context(mut req: Request<Body>, next: Next) -> Response {
    let ids = new_request_ids();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    req.extensions_mut().insert(ids.clone());

    let span = tracing::info_span!(
        "request",
        request_id = %ids.request_id,
        trace_id = %ids.trace_id,
        method = %method,
        path = %path
    );

    let mut response = next.run(req).instrument(span).await;
    response.headers_mut().insert(
        "x-request-id",
        HeaderValue::from_str(&ids.request_id).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    response.headers_mut().insert(
        "x-trace-id",
        HeaderValue::from_str(&ids.trace_id).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    response
}
