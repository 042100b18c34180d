//! Eliona 接口请求/响应体。

use chrono::{DateTime, Utc};
use domain::{AssetId, AssetKind, DataSubtype};
use kio_reconcile::{AssetDescriptor, AttributeSnapshot};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `PUT /assets` 请求体。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetBody {
    pub project_id: String,
    pub global_asset_identifier: String,
    pub name: String,
    pub asset_type: String,
    pub description: String,
    pub parent_functional_asset_id: Option<AssetId>,
    pub parent_locational_asset_id: Option<AssetId>,
    pub is_tracker: bool,
}

impl From<&AssetDescriptor> for AssetBody {
    fn from(descriptor: &AssetDescriptor) -> Self {
        Self {
            project_id: descriptor.scope.clone(),
            global_asset_identifier: descriptor.global_identifier.clone(),
            name: descriptor.name.clone(),
            asset_type: descriptor.kind.as_str().to_string(),
            description: descriptor.description.clone(),
            parent_functional_asset_id: descriptor.parent.functional(),
            parent_locational_asset_id: descriptor.parent.locational(),
            is_tracker: descriptor.is_tracker,
        }
    }
}

/// `PUT /assets` 响应体，只关心资产 ID。
#[derive(Debug, Clone, Deserialize)]
pub struct AssetResponse {
    #[serde(default)]
    pub id: Option<AssetId>,
}

/// `PUT /data` 请求体。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataBody {
    pub asset_id: AssetId,
    pub subtype: &'static str,
    pub timestamp: DateTime<Utc>,
    pub data: Map<String, Value>,
}

impl From<&AttributeSnapshot> for DataBody {
    fn from(snapshot: &AttributeSnapshot) -> Self {
        Self {
            asset_id: snapshot.asset_id,
            subtype: snapshot.subtype.as_str(),
            timestamp: snapshot.timestamp,
            data: snapshot.data.clone(),
        }
    }
}

/// `PUT /asset-types` 请求体。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetTypeBody {
    pub name: &'static str,
    pub custom: bool,
    pub vendor: &'static str,
    pub translation: Translation,
    pub attributes: Vec<AssetTypeAttribute>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Translation {
    pub de: String,
    pub en: String,
}

impl Translation {
    fn same(text: &str) -> Self {
        Self {
            de: text.to_string(),
            en: text.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetTypeAttribute {
    pub subtype: &'static str,
    pub name: &'static str,
    pub enable: bool,
    pub translation: Translation,
}

const BUILDING_INFO: &[&str] = &["id", "name", "address", "description"];
const FLOOR_INFO: &[&str] = &["id", "name", "level"];
const FLOOR_OUTPUT: &[&str] = &["height"];
const ROOM_INFO: &[&str] = &["id", "name", "room_number"];
const DEVICE_INFO: &[&str] = &["id", "name", "firmware", "model", "product"];
const DEVICE_STATUS: &[&str] = &["battery_level"];
const DEVICE_INPUT: &[&str] = &[
    "pos_x",
    "pos_y",
    "floor_id",
    "pos_world",
    "temperature",
    "humidity",
    "light_intensity",
    "air_quality",
    "air_pressure",
    "people_count",
];

fn display_name(kind: AssetKind) -> &'static str {
    match kind {
        AssetKind::Root => "Kontakt.io",
        AssetKind::Building => "Kontakt.io Building",
        AssetKind::Floor => "Kontakt.io Floor",
        AssetKind::Room => "Kontakt.io Room",
        AssetKind::Tag => "Kontakt.io Tag",
        AssetKind::Badge => "Kontakt.io Badge",
        AssetKind::Beacon => "Kontakt.io Beacon",
        AssetKind::PortalBeam => "Kontakt.io Portal Beam",
    }
}

/// 资产类型的属性：与写入的快照字段一一对应，楼层另有回写的 `height`。
fn attribute_groups(kind: AssetKind) -> Vec<(DataSubtype, &'static [&'static str])> {
    match kind {
        AssetKind::Root => Vec::new(),
        AssetKind::Building => vec![(DataSubtype::Info, BUILDING_INFO)],
        AssetKind::Floor => vec![
            (DataSubtype::Info, FLOOR_INFO),
            (DataSubtype::Output, FLOOR_OUTPUT),
        ],
        AssetKind::Room => vec![(DataSubtype::Info, ROOM_INFO)],
        AssetKind::Tag | AssetKind::Badge | AssetKind::Beacon | AssetKind::PortalBeam => vec![
            (DataSubtype::Info, DEVICE_INFO),
            (DataSubtype::Status, DEVICE_STATUS),
            (DataSubtype::Input, DEVICE_INPUT),
        ],
    }
}

impl From<AssetKind> for AssetTypeBody {
    fn from(kind: AssetKind) -> Self {
        let attributes = attribute_groups(kind)
            .into_iter()
            .flat_map(|(subtype, names)| {
                names.iter().map(move |name| AssetTypeAttribute {
                    subtype: subtype.as_str(),
                    name: *name,
                    enable: true,
                    translation: Translation::same(name),
                })
            })
            .collect();
        Self {
            name: kind.as_str(),
            custom: true,
            vendor: "Kontakt.io",
            translation: Translation::same(display_name(kind)),
            attributes,
        }
    }
}

/// 全部资产类型定义。
pub fn asset_types() -> Vec<AssetTypeBody> {
    AssetKind::ALL.into_iter().map(AssetTypeBody::from).collect()
}
