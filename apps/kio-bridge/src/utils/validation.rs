//! 输入验证辅助函数
//!
//! - normalize_required：必填字段去除首尾空格并检查非空
//! - config_from_dto：配置请求体转换为 `SourceConfig`，取值非法返回 400

use crate::utils::response::bad_request_error;
use api_contract::ConfigurationDto;
use axum::response::Response;
use domain::{FilterRule, FilterRuleSet, SourceConfig, UnresolvedParentPolicy};

/// 验证必填字段，去除空格并检查非空
pub fn normalize_required(value: String, field: &str) -> Result<String, Response> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(bad_request_error(format!("{field} required")));
    }
    Ok(trimmed.to_string())
}

fn positive(value: Option<u64>, default: u64, field: &str) -> Result<u64, Response> {
    match value {
        Some(0) => Err(bad_request_error(format!("{field} must be positive"))),
        Some(value) => Ok(value),
        None => Ok(default),
    }
}

/// 请求体转换为数据源配置
///
/// 未提供的字段取默认值；`active` 由调度器维护，这里只在显式提供时采用。
pub fn config_from_dto(dto: ConfigurationDto, id: i64) -> Result<SourceConfig, Response> {
    let api_key = normalize_required(dto.api_key, "apiKey")?;
    let mut config = SourceConfig::new(id, api_key);
    if let Some(enable) = dto.enable {
        config.enable = enable;
    }
    config.refresh_interval_secs = positive(
        dto.refresh_interval,
        config.refresh_interval_secs,
        "refreshInterval",
    )?;
    config.request_timeout_secs = positive(
        dto.request_timeout,
        config.request_timeout_secs,
        "requestTimeout",
    )?;
    if let Some(groups) = dto.asset_filter {
        let mut rule_groups = Vec::with_capacity(groups.len());
        for group in groups {
            let mut rules = Vec::with_capacity(group.len());
            for rule in group {
                let parameter = normalize_required(rule.parameter, "assetFilter.parameter")?;
                rules.push(FilterRule::new(parameter, rule.regex));
            }
            rule_groups.push(rules);
        }
        config.asset_filter = FilterRuleSet::new(rule_groups);
    }
    if let Some(active) = dto.active {
        config.active = active;
    }
    if let Some(project_ids) = dto.project_ids {
        config.project_ids = project_ids
            .into_iter()
            .map(|item| normalize_required(item, "projectIDs"))
            .collect::<Result<_, _>>()?;
    }
    config.absolute_x = dto.absolute_x.unwrap_or_default();
    config.absolute_y = dto.absolute_y.unwrap_or_default();
    if !config.absolute_x.is_finite() || !config.absolute_y.is_finite() {
        return Err(bad_request_error("absoluteX/absoluteY must be finite"));
    }
    if let Some(policy) = dto.unresolved_parent {
        config.unresolved_parent = UnresolvedParentPolicy::parse(policy.trim())
            .ok_or_else(|| bad_request_error(format!("unknown unresolvedParent: {policy}")))?;
    }
    Ok(config)
}
