//! 身份解析：`(项目, 资产类型, 逻辑键)` → Eliona 资产 ID。
//!
//! 已有映射直接复用；否则调用写入端创建资产，并在返回前持久化映射。

use crate::sources::{AssetDescriptor, AssetParent, AssetSink};
use domain::{AssetId, AssetKind};
use kio_storage::{MappingKey, MappingRecord, MappingStore};
use std::sync::Arc;

/// 资产解析请求。
#[derive(Debug, Clone, PartialEq)]
pub struct AssetRequest {
    pub scope: String,
    pub kind: AssetKind,
    pub logical_key: String,
    pub parent: Option<AssetId>,
    pub display_name: String,
    pub description: String,
}

impl AssetRequest {
    /// 描述默认为 `{名称} ({逻辑键})`。
    pub fn new(
        scope: impl Into<String>,
        kind: AssetKind,
        logical_key: impl Into<String>,
        parent: Option<AssetId>,
        display_name: impl Into<String>,
    ) -> Self {
        let logical_key = logical_key.into();
        let display_name = display_name.into();
        let description = format!("{} ({})", display_name, logical_key);
        Self {
            scope: scope.into(),
            kind,
            logical_key,
            parent,
            display_name,
            description,
        }
    }

    pub fn mapping_key(&self) -> MappingKey {
        MappingKey::new(self.scope.clone(), self.kind, self.logical_key.clone())
    }

    fn descriptor(&self) -> AssetDescriptor {
        let parent = match (self.parent, self.kind.is_device()) {
            (None, _) => AssetParent::None,
            (Some(id), true) => AssetParent::Functional(id),
            (Some(id), false) => AssetParent::Locational(id),
        };
        AssetDescriptor {
            scope: self.scope.clone(),
            kind: self.kind,
            global_identifier: self.mapping_key().global_identifier(),
            name: self.display_name.clone(),
            description: self.description.clone(),
            parent,
            is_tracker: self.kind.is_tracker(),
        }
    }
}

/// 身份解析错误。
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("mapping store error: {0}")]
    Storage(String),
    #[error("asset sink error: {0}")]
    Sink(String),
    #[error("asset sink returned no id for {0}")]
    MissingAssetId(String),
}

/// 身份解析与资产创建协调。
#[derive(Clone)]
pub struct IdentityResolver {
    mappings: Arc<dyn MappingStore>,
    sink: Arc<dyn AssetSink>,
}

impl IdentityResolver {
    pub fn new(mappings: Arc<dyn MappingStore>, sink: Arc<dyn AssetSink>) -> Self {
        Self { mappings, sink }
    }

    /// 返回 `(资产 ID, 是否新建)`。
    pub async fn ensure_asset(
        &self,
        request: &AssetRequest,
    ) -> Result<(AssetId, bool), IdentityError> {
        let key = request.mapping_key();
        if let Some(asset_id) = self
            .mappings
            .get(&key)
            .await
            .map_err(|err| IdentityError::Storage(err.to_string()))?
        {
            return Ok((asset_id, false));
        }

        let descriptor = request.descriptor();
        let asset_id = self
            .sink
            .upsert_asset(&descriptor)
            .await
            .map_err(|err| IdentityError::Sink(err.to_string()))?
            .ok_or_else(|| IdentityError::MissingAssetId(descriptor.global_identifier.clone()))?;

        self.mappings
            .put(MappingRecord { key, asset_id })
            .await
            .map_err(|err| IdentityError::Storage(err.to_string()))?;
        kio_telemetry::record_asset_created();
        tracing::debug!(
            target: "kio.identity",
            scope = %request.scope,
            identifier = %descriptor.global_identifier,
            asset_id,
            "asset_created"
        );
        Ok((asset_id, true))
    }
}
