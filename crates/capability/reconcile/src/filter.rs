//! 资产过滤规则求值。
//!
//! 规则集为 AND 组的 OR：任意一组内的规则全部满足即返回 true。
//! 空规则集、空组均视为满足。正则需匹配字段的完整值。

use domain::FilterRuleSet;
use domain::filter::FilterAttributes;
use regex::Regex;

/// 过滤规则求值错误。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    #[error("unknown filter field: {0}")]
    UnknownField(String),
    #[error("invalid regex {pattern}: {message}")]
    InvalidRegex { pattern: String, message: String },
}

struct CompiledRule {
    parameter: String,
    pattern: String,
    regex: Result<Regex, String>,
}

impl CompiledRule {
    fn evaluate(&self, attributes: &FilterAttributes) -> Result<bool, FilterError> {
        let value = attributes
            .get(self.parameter.as_str())
            .ok_or_else(|| FilterError::UnknownField(self.parameter.clone()))?;
        let regex = self.regex.as_ref().map_err(|message| FilterError::InvalidRegex {
            pattern: self.pattern.clone(),
            message: message.clone(),
        })?;
        Ok(regex.is_match(value))
    }
}

/// 预编译的规则集，一个周期内对所有设备复用。
///
/// 正则编译失败不会在这里报错，而是在求值到该规则时返回 [`FilterError::InvalidRegex`]。
pub struct CompiledFilter {
    groups: Vec<Vec<CompiledRule>>,
}

impl CompiledFilter {
    pub fn new(rule_set: &FilterRuleSet) -> Self {
        let groups = rule_set
            .groups
            .iter()
            .map(|group| {
                group
                    .iter()
                    .map(|rule| CompiledRule {
                        parameter: rule.parameter.clone(),
                        pattern: rule.regex.clone(),
                        regex: Regex::new(&format!("^(?:{})$", rule.regex))
                            .map_err(|err| err.to_string()),
                    })
                    .collect()
            })
            .collect();
        Self { groups }
    }

    pub fn matches(&self, attributes: &FilterAttributes) -> Result<bool, FilterError> {
        if self.groups.is_empty() {
            return Ok(true);
        }
        for group in &self.groups {
            let mut satisfied = true;
            for rule in group {
                if !rule.evaluate(attributes)? {
                    satisfied = false;
                    break;
                }
            }
            if satisfied {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// 对单个设备求值规则集。
pub fn matches(rule_set: &FilterRuleSet, attributes: &FilterAttributes) -> Result<bool, FilterError> {
    CompiledFilter::new(rule_set).matches(attributes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::FilterRule;

    fn attributes() -> FilterAttributes {
        let mut attributes = FilterAttributes::new();
        attributes.insert("product", "Nano Tag".to_string());
        attributes.insert("name", "tag-001".to_string());
        attributes.insert("battery_level", "87".to_string());
        attributes
    }

    #[test]
    fn empty_rule_set_matches() {
        assert_eq!(matches(&FilterRuleSet::default(), &attributes()), Ok(true));
    }

    #[test]
    fn empty_group_matches() {
        let rules = FilterRuleSet::new(vec![vec![]]);
        assert_eq!(matches(&rules, &attributes()), Ok(true));
    }

    #[test]
    fn group_requires_all_rules() {
        let rules = FilterRuleSet::new(vec![vec![
            FilterRule::new("product", "Nano.*"),
            FilterRule::new("name", "badge-.*"),
        ]]);
        assert_eq!(matches(&rules, &attributes()), Ok(false));
    }

    #[test]
    fn any_group_is_enough() {
        let rules = FilterRuleSet::new(vec![
            vec![FilterRule::new("name", "badge-.*")],
            vec![FilterRule::new("battery_level", "[0-9]+")],
        ]);
        assert_eq!(matches(&rules, &attributes()), Ok(true));
    }

    #[test]
    fn regex_must_match_whole_value() {
        let rules = FilterRuleSet::new(vec![vec![FilterRule::new("product", "Nano")]]);
        assert_eq!(matches(&rules, &attributes()), Ok(false));
        let rules = FilterRuleSet::new(vec![vec![FilterRule::new("product", "Nano|Nano Tag")]]);
        assert_eq!(matches(&rules, &attributes()), Ok(true));
    }

    #[test]
    fn unknown_field_is_error() {
        let rules = FilterRuleSet::new(vec![vec![FilterRule::new("colour", ".*")]]);
        assert_eq!(
            matches(&rules, &attributes()),
            Err(FilterError::UnknownField("colour".to_string()))
        );
    }

    #[test]
    fn invalid_regex_is_error() {
        let rules = FilterRuleSet::new(vec![vec![FilterRule::new("name", "(")]]);
        assert!(matches!(
            matches(&rules, &attributes()),
            Err(FilterError::InvalidRegex { .. })
        ));
    }
}
