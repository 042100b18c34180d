//! Eliona HTTP 客户端。
//!
//! 资产创建使用 `PUT {base}/assets`（按全局标识 upsert），属性数据使用 `PUT {base}/data`。
//! 请求超时由调用方按数据源配置施加（见 [`kio_reconcile::DeadlineSink`]）。

use crate::body::{AssetBody, AssetResponse, DataBody, asset_types};
use async_trait::async_trait;
use domain::AssetId;
use kio_reconcile::{AssetDescriptor, AssetSink, AttributeSnapshot, SinkError};
use std::time::Duration;

#[derive(Clone)]
pub struct ElionaClient {
    http: reqwest::Client,
    base_url: String,
    api_token: String,
}

impl ElionaClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_token: api_token.into(),
        }
    }

    pub fn assets_url(&self) -> String {
        format!("{}/assets", self.base_url)
    }

    pub fn data_url(&self) -> String {
        format!("{}/data", self.base_url)
    }

    pub fn asset_types_url(&self) -> String {
        format!("{}/asset-types", self.base_url)
    }

    fn put(&self, url: &str) -> reqwest::RequestBuilder {
        self.http.put(url).header("X-API-Key", &self.api_token)
    }

    /// 创建或更新全部 Kontakt.io 资产类型，返回写入的类型数。
    pub async fn ensure_asset_types(&self, timeout: Duration) -> Result<usize, SinkError> {
        let url = self.asset_types_url();
        let types = asset_types();
        for body in &types {
            self.send(&url, self.put(&url).timeout(timeout).json(body))
                .await?;
            tracing::debug!(target: "kio.identity", asset_type = body.name, "asset_type_upserted");
        }
        Ok(types.len())
    }

    /// 发送请求，返回响应体；非 2xx 视为拒绝。
    async fn send(&self, url: &str, request: reqwest::RequestBuilder) -> Result<Vec<u8>, SinkError> {
        let response = request
            .send()
            .await
            .map_err(|err| SinkError::Transport(format!("{}: {}", url, err)))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| SinkError::Transport(format!("{}: {}", url, err)))?;
        if !status.is_success() {
            let message = String::from_utf8_lossy(&body);
            return Err(SinkError::Rejected(format!(
                "{} returned {}: {}",
                url, status, message
            )));
        }
        Ok(body.to_vec())
    }
}

#[async_trait]
impl AssetSink for ElionaClient {
    async fn upsert_asset(
        &self,
        descriptor: &AssetDescriptor,
    ) -> Result<Option<AssetId>, SinkError> {
        let url = self.assets_url();
        let body = AssetBody::from(descriptor);
        let response = self.send(&url, self.put(&url).json(&body)).await?;
        if response.is_empty() {
            return Ok(None);
        }
        let asset: AssetResponse = serde_json::from_slice(&response)
            .map_err(|err| SinkError::Decode(format!("{}: {}", url, err)))?;
        tracing::debug!(
            target: "kio.identity",
            identifier = %descriptor.global_identifier,
            asset_id = ?asset.id,
            "asset_upserted"
        );
        Ok(asset.id)
    }

    async fn push_attribute_snapshot(&self, snapshot: &AttributeSnapshot) -> Result<(), SinkError> {
        let url = self.data_url();
        let body = DataBody::from(snapshot);
        self.send(&url, self.put(&url).json(&body)).await?;
        Ok(())
    }
}
