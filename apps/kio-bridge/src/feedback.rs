//! 楼层高度回写装配
//!
//! 开启 `KIO_FEEDBACK` 时监听 Eliona output 数据，把楼层资产上的高度写入楼层高度存储。

use kio_config::AppConfig;
use kio_feedback::{FloorHeightHandler, OutputListener, OutputListenerConfig};
use kio_storage::{FloorHeightStore, MappingStore};
use std::sync::Arc;
use tracing::info;

/// 启动回写监听；未开启时返回 None。
pub fn spawn_feedback(
    config: &AppConfig,
    mappings: Arc<dyn MappingStore>,
    floor_heights: Arc<dyn FloorHeightStore>,
) -> Option<tokio::task::JoinHandle<()>> {
    if !config.feedback_enabled {
        info!(target: "kio.feedback", "feedback_disabled");
        return None;
    }
    let listener = OutputListener::new(listener_config(config));
    info!(
        target: "kio.feedback",
        url = %listener.config().listener_url(),
        "feedback_listening"
    );
    let handler = Arc::new(FloorHeightHandler::new(mappings, floor_heights));
    Some(tokio::spawn(async move { listener.run(handler).await }))
}

fn listener_config(config: &AppConfig) -> OutputListenerConfig {
    let mut listener = OutputListenerConfig::new(
        config.eliona_api_url.clone(),
        config.eliona_api_token.clone(),
    );
    listener.retry_delay = config.feedback_retry();
    listener.max_retry_delay = config.feedback_max_retry();
    listener
}
