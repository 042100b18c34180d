//! Kontakt.io HTTP 客户端。
//!
//! 所有请求携带 `API-Key` 头与数据源配置的请求超时。

use crate::wire::{DeviceList, Page, PositionWire, RoomWire, TelemetryWire};
use async_trait::async_trait;
use chrono::SecondsFormat;
use domain::{DeviceMetadata, PositionRecord, Room, SourceConfig, TelemetryRecord};
use kio_reconcile::{FeedError, FeedSource, TimeWindow};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// 单页最大条数（接口上限）。
pub const PAGE_SIZE: &str = "2000";
/// 设备清单接口要求的 Accept 头。
pub const DEVICE_ACCEPT: &str = "application/vnd.com.kontakt+json;version=10";

/// 接口地址。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KontaktEndpoints {
    /// 房间、遥测、定位接口根地址。
    pub apps_url: String,
    /// 设备清单接口根地址。
    pub device_url: String,
}

impl KontaktEndpoints {
    pub fn rooms(&self) -> String {
        format!("{}/v2/locations/rooms", self.apps_url)
    }

    pub fn devices(&self) -> String {
        format!("{}/device", self.device_url)
    }

    pub fn telemetry(&self) -> String {
        format!("{}/v3/telemetry", self.apps_url)
    }

    pub fn positions(&self) -> String {
        format!("{}/v2/positions", self.apps_url)
    }
}

/// 单个数据源配置对应的客户端。
#[derive(Clone)]
pub struct KontaktClient {
    http: reqwest::Client,
    endpoints: KontaktEndpoints,
    api_key: String,
    timeout: Duration,
}

impl KontaktClient {
    pub fn new(
        http: reqwest::Client,
        endpoints: KontaktEndpoints,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            endpoints,
            api_key: api_key.into(),
            timeout,
        }
    }

    /// 按数据源配置构造（API Key 与请求超时）。
    pub fn for_config(
        http: reqwest::Client,
        endpoints: KontaktEndpoints,
        config: &SourceConfig,
    ) -> Self {
        Self::new(http, endpoints, config.api_key.clone(), config.request_timeout())
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.http
            .get(url)
            .header("API-Key", &self.api_key)
            .timeout(self.timeout)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        url: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, FeedError> {
        let response = request
            .send()
            .await
            .map_err(|err| transport_error(url, err))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Transport(format!("{} returned {}", url, status)));
        }
        let body = response
            .bytes()
            .await
            .map_err(|err| transport_error(url, err))?;
        serde_json::from_slice(&body).map_err(|err| FeedError::Decode(format!("{}: {}", url, err)))
    }
}

fn transport_error(url: &str, err: reqwest::Error) -> FeedError {
    if err.is_timeout() {
        FeedError::Timeout(url.to_string())
    } else {
        FeedError::Transport(format!("{}: {}", url, err))
    }
}

/// 遥测查询参数。
pub fn telemetry_query(tracking_ids: &[String], window: TimeWindow) -> Vec<(&'static str, String)> {
    vec![
        ("trackingId", tracking_ids.join(",")),
        (
            "startTime",
            window.start.to_rfc3339_opts(SecondsFormat::Secs, true),
        ),
        (
            "endTime",
            window.end.to_rfc3339_opts(SecondsFormat::Secs, true),
        ),
        ("size", PAGE_SIZE.to_string()),
    ]
}

#[async_trait]
impl FeedSource for KontaktClient {
    async fn list_devices(&self) -> Result<Vec<DeviceMetadata>, FeedError> {
        let url = self.endpoints.devices();
        let request = self.get(&url).header("Accept", DEVICE_ACCEPT);
        let list: DeviceList = self.fetch(&url, request).await?;
        tracing::debug!(target: "kio.sync", count = list.devices.len(), "devices_fetched");
        Ok(list.devices.into_iter().map(Into::into).collect())
    }

    async fn list_telemetry(
        &self,
        tracking_ids: &[String],
        window: TimeWindow,
    ) -> Result<Vec<TelemetryRecord>, FeedError> {
        let url = self.endpoints.telemetry();
        let request = self.get(&url).query(&telemetry_query(tracking_ids, window));
        let page: Page<TelemetryWire> = self.fetch(&url, request).await?;
        tracing::debug!(target: "kio.sync", count = page.content.len(), "telemetry_fetched");
        Ok(page.content.into_iter().map(Into::into).collect())
    }

    async fn list_positions(&self) -> Result<Vec<PositionRecord>, FeedError> {
        let url = self.endpoints.positions();
        let request = self.get(&url).query(&[("size", PAGE_SIZE)]);
        let page: Page<PositionWire> = self.fetch(&url, request).await?;
        tracing::debug!(target: "kio.sync", count = page.content.len(), "positions_fetched");
        Ok(page.content.into_iter().map(Into::into).collect())
    }

    async fn list_rooms(&self) -> Result<Vec<Room>, FeedError> {
        let url = self.endpoints.rooms();
        let request = self.get(&url).query(&[("size", PAGE_SIZE)]);
        let page: Page<RoomWire> = self.fetch(&url, request).await?;
        tracing::debug!(target: "kio.sync", count = page.content.len(), "rooms_fetched");
        Ok(page.content.into_iter().map(Into::into).collect())
    }
}
