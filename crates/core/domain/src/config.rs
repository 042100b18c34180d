//! 数据源配置（每条配置对应一个 Kontakt.io API Key 与若干 Eliona 项目）。

use crate::filter::FilterRuleSet;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// 房间号无法解析时设备资产的挂载策略。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedParentPolicy {
    /// 挂到项目根资产下。
    #[default]
    AttachToRoot,
    /// 本项目内不创建该设备。
    Drop,
}

impl UnresolvedParentPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            UnresolvedParentPolicy::AttachToRoot => "attach_to_root",
            UnresolvedParentPolicy::Drop => "drop",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "attach_to_root" => Some(UnresolvedParentPolicy::AttachToRoot),
            "drop" => Some(UnresolvedParentPolicy::Drop),
            _ => None,
        }
    }
}

/// Kontakt.io 坐标原点在 Eliona 坐标系中的位置。
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Origin {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub id: i64,
    pub api_key: String,
    pub enable: bool,
    pub refresh_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub asset_filter: FilterRuleSet,
    /// 运行中由同步服务置为 true，停用后置为 false。
    pub active: bool,
    pub project_ids: Vec<String>,
    pub absolute_x: f64,
    pub absolute_y: f64,
    pub unresolved_parent: UnresolvedParentPolicy,
}

impl SourceConfig {
    pub fn new(id: i64, api_key: impl Into<String>) -> Self {
        Self {
            id,
            api_key: api_key.into(),
            enable: true,
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            asset_filter: FilterRuleSet::default(),
            active: false,
            project_ids: Vec::new(),
            absolute_x: 0.0,
            absolute_y: 0.0,
            unresolved_parent: UnresolvedParentPolicy::default(),
        }
    }

    pub fn origin(&self) -> Origin {
        Origin {
            x: self.absolute_x,
            y: self.absolute_y,
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
