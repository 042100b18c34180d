//! 资产过滤规则。
//!
//! 规则集是若干 AND 组的 OR 组合：设备满足任意一组内的全部规则即视为在范围内。
//! 持久化与 API 中的 JSON 形态为 `[[{"parameter": "...", "regex": "..."}]]`。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 过滤规则可见的设备字段（字段名 → 字符串值）。
pub type FilterAttributes = BTreeMap<&'static str, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRule {
    pub parameter: String,
    pub regex: String,
}

impl FilterRule {
    pub fn new(parameter: impl Into<String>, regex: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
            regex: regex.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterRuleSet {
    pub groups: Vec<Vec<FilterRule>>,
}

impl FilterRuleSet {
    pub fn new(groups: Vec<Vec<FilterRule>>) -> Self {
        Self { groups }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
