//! Eliona output 数据回写监听。
//!
//! 通过 WebSocket 监听 Eliona 推送的 output 数据（`{api}/data-listener?dataSubtype=output`），
//! 把楼层资产上设置的 `height` 写入楼层高度存储，下一个同步周期的世界坐标即使用新高度。
//! 连接断开或建立失败时按指数退避重连。

use async_trait::async_trait;
use domain::{AssetId, AssetKind, DataSubtype};
use futures::{Stream, StreamExt};
use kio_storage::{FloorHeightStore, MappingStore};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{info, warn};

type ElionaStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// 回写错误。
#[derive(Debug, thiserror::Error)]
pub enum FeedbackError {
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("source error: {0}")]
    Source(String),
}

/// Eliona output 消息：`{"assetId": 1, "subtype": "output", "data": {"height": 3.5}}`。
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputMessage {
    pub asset_id: AssetId,
    pub subtype: DataSubtype,
    #[serde(default)]
    pub data: Map<String, Value>,
}

/// 解析消息负载。
pub fn parse_output(payload: &[u8]) -> Result<OutputMessage, FeedbackError> {
    serde_json::from_slice(payload).map_err(|err| FeedbackError::InvalidPayload(err.to_string()))
}

/// 处理结果。
#[derive(Debug, Clone, PartialEq)]
pub enum FeedbackOutcome {
    HeightUpdated { floor_key: String, height: f64 },
    NotOutput,
    NotFloor,
    NoHeight,
}

/// output 消息处理器。
#[async_trait]
pub trait OutputHandler: Send + Sync {
    async fn handle(&self, message: OutputMessage) -> Result<FeedbackOutcome, FeedbackError>;
}

/// 楼层高度回写。
#[derive(Clone)]
pub struct FloorHeightHandler {
    mappings: Arc<dyn MappingStore>,
    floor_heights: Arc<dyn FloorHeightStore>,
}

impl FloorHeightHandler {
    pub fn new(mappings: Arc<dyn MappingStore>, floor_heights: Arc<dyn FloorHeightStore>) -> Self {
        Self {
            mappings,
            floor_heights,
        }
    }
}

#[async_trait]
impl OutputHandler for FloorHeightHandler {
    async fn handle(&self, message: OutputMessage) -> Result<FeedbackOutcome, FeedbackError> {
        if message.subtype != DataSubtype::Output {
            return Ok(FeedbackOutcome::NotOutput);
        }
        let Some(height) = message.data.get("height").and_then(Value::as_f64) else {
            return Ok(FeedbackOutcome::NoHeight);
        };
        let record = self
            .mappings
            .find_by_asset_id(message.asset_id)
            .await
            .map_err(|err| FeedbackError::Storage(err.to_string()))?;
        let Some(record) = record.filter(|record| record.key.kind == AssetKind::Floor) else {
            return Ok(FeedbackOutcome::NotFloor);
        };
        let floor_key = record.key.logical_key;
        self.floor_heights
            .set(&floor_key, height)
            .await
            .map_err(|err| FeedbackError::Storage(err.to_string()))?;
        kio_telemetry::record_floor_height_updated();
        tracing::info!(
            target: "kio.feedback",
            asset_id = message.asset_id,
            floor_key = %floor_key,
            height,
            "floor_height_updated"
        );
        Ok(FeedbackOutcome::HeightUpdated { floor_key, height })
    }
}

/// 默认首次重连等待。
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);
/// 默认最长重连等待。
pub const DEFAULT_MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

/// WebSocket 监听配置。
#[derive(Debug, Clone)]
pub struct OutputListenerConfig {
    /// Eliona API 地址（http/https）。
    pub api_url: String,
    pub api_token: String,
    pub retry_delay: Duration,
    pub max_retry_delay: Duration,
}

impl OutputListenerConfig {
    pub fn new(api_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_token: api_token.into(),
            retry_delay: DEFAULT_RETRY_DELAY,
            max_retry_delay: DEFAULT_MAX_RETRY_DELAY,
        }
    }

    /// 监听地址：http → ws，https → wss，并追加 `/data-listener?dataSubtype=output`。
    pub fn listener_url(&self) -> String {
        let base = self.api_url.trim_end_matches('/');
        let base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            base.to_string()
        };
        format!("{}/data-listener?dataSubtype=output", base)
    }

    /// 下一次重连等待：翻倍，不超过上限。
    pub fn next_delay(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.max_retry_delay)
    }
}

/// Eliona output 数据监听器。
#[derive(Debug, Clone)]
pub struct OutputListener {
    config: OutputListenerConfig,
}

impl OutputListener {
    pub fn new(config: OutputListenerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OutputListenerConfig {
        &self.config
    }

    /// 持续监听；连接失败或断开后退避重连，永不返回。
    pub async fn run(&self, handler: Arc<dyn OutputHandler>) {
        let mut delay = self.config.retry_delay;
        loop {
            match self.connect().await {
                Ok(stream) => {
                    info!(target: "kio.feedback", url = %self.config.listener_url(), "feedback_connected");
                    delay = self.config.retry_delay;
                    match consume(stream, handler.as_ref()).await {
                        Ok(()) => info!(target: "kio.feedback", "feedback_disconnected"),
                        Err(err) => {
                            warn!(target: "kio.feedback", error = %err, "feedback_stream_failed")
                        }
                    }
                }
                Err(err) => {
                    warn!(target: "kio.feedback", error = %err, "feedback_connect_failed");
                }
            }
            warn!(
                target: "kio.feedback",
                retry_in_ms = delay.as_millis() as u64,
                "feedback_reconnecting"
            );
            tokio::time::sleep(delay).await;
            delay = self.config.next_delay(delay);
        }
    }

    async fn connect(&self) -> Result<ElionaStream, FeedbackError> {
        let mut request = self
            .config
            .listener_url()
            .into_client_request()
            .map_err(|err| FeedbackError::Source(err.to_string()))?;
        let token = HeaderValue::from_str(&self.config.api_token)
            .map_err(|err| FeedbackError::Source(err.to_string()))?;
        request.headers_mut().insert("X-API-Key", token);
        let (stream, _) = tokio_tungstenite::connect_async(request)
            .await
            .map_err(|err| FeedbackError::Source(err.to_string()))?;
        Ok(stream)
    }
}

/// 读取消息直到连接关闭；单条消息的错误只记录日志。
async fn consume<S>(mut stream: S, handler: &dyn OutputHandler) -> Result<(), FeedbackError>
where
    S: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    while let Some(message) = stream.next().await {
        let message = message.map_err(|err| FeedbackError::Source(err.to_string()))?;
        let payload: &[u8] = match &message {
            Message::Text(text) => text.as_bytes(),
            Message::Binary(data) => &data[..],
            Message::Close(_) => {
                info!(target: "kio.feedback", "feedback_close_received");
                continue;
            }
            _ => continue,
        };
        let output = match parse_output(payload) {
            Ok(output) => output,
            Err(err) => {
                warn!(target: "kio.feedback", error = %err, "output_payload_skipped");
                continue;
            }
        };
        if let Err(err) = handler.handle(output).await {
            warn!(target: "kio.feedback", error = %err, "output_handler_failed");
        }
    }
    Ok(())
}
