//! 应用运行配置加载。
//!
//! 进程级配置来自环境变量；每个数据源的配置（API Key、过滤规则、项目列表等）
//! 存放在 `ConfigStore` 中，由配置 API 维护。

use std::env;
use std::time::Duration;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env: {0}")]
    Missing(String),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: String,
    /// 未配置时使用内存存储（仅用于本地演示）。
    pub database_url: Option<String>,
    pub eliona_api_url: String,
    pub eliona_api_token: String,
    pub kontakt_apps_url: String,
    pub kontakt_device_url: String,
    pub scheduler_tick_seconds: u64,
    pub telemetry_window_seconds: u64,
    pub feedback_enabled: bool,
    /// 回写监听首次重连等待（秒）。
    pub feedback_retry_seconds: u64,
    /// 回写监听最长重连等待（秒）。
    pub feedback_max_retry_seconds: u64,
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let eliona_api_url = env::var("KIO_ELIONA_API_URL")
            .map_err(|_| ConfigError::Missing("KIO_ELIONA_API_URL".to_string()))?;
        let eliona_api_token = env::var("KIO_ELIONA_API_TOKEN")
            .map_err(|_| ConfigError::Missing("KIO_ELIONA_API_TOKEN".to_string()))?;
        let http_addr = env::var("KIO_HTTP_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
        let database_url = read_optional("KIO_DATABASE_URL");
        let kontakt_apps_url = env::var("KIO_KONTAKT_APPS_URL")
            .unwrap_or_else(|_| "https://apps.cloud.us.kontakt.io".to_string());
        let kontakt_device_url = env::var("KIO_KONTAKT_DEVICE_URL")
            .unwrap_or_else(|_| "https://api.kontakt.io".to_string());
        let scheduler_tick_seconds = read_u64_with_default("KIO_SCHEDULER_TICK_SECONDS", 5)?;
        if scheduler_tick_seconds == 0 {
            return Err(ConfigError::Invalid(
                "KIO_SCHEDULER_TICK_SECONDS".to_string(),
                "0".to_string(),
            ));
        }
        let telemetry_window_seconds = read_u64_with_default("KIO_TELEMETRY_WINDOW_SECONDS", 120)?;
        let feedback_enabled = read_bool_with_default("KIO_FEEDBACK", false);
        let feedback_retry_seconds = read_u64_with_default("KIO_FEEDBACK_RETRY_SECONDS", 1)?;
        let feedback_max_retry_seconds =
            read_u64_with_default("KIO_FEEDBACK_MAX_RETRY_SECONDS", 60)?;
        if feedback_retry_seconds == 0 || feedback_max_retry_seconds < feedback_retry_seconds {
            return Err(ConfigError::Invalid(
                "KIO_FEEDBACK_RETRY_SECONDS".to_string(),
                format!("{}..{}", feedback_retry_seconds, feedback_max_retry_seconds),
            ));
        }

        Ok(Self {
            http_addr,
            database_url,
            eliona_api_url: eliona_api_url.trim_end_matches('/').to_string(),
            eliona_api_token,
            kontakt_apps_url: kontakt_apps_url.trim_end_matches('/').to_string(),
            kontakt_device_url: kontakt_device_url.trim_end_matches('/').to_string(),
            scheduler_tick_seconds,
            telemetry_window_seconds,
            feedback_enabled,
            feedback_retry_seconds,
            feedback_max_retry_seconds,
        })
    }

    pub fn scheduler_tick(&self) -> Duration {
        Duration::from_secs(self.scheduler_tick_seconds)
    }

    pub fn telemetry_window(&self) -> Duration {
        Duration::from_secs(self.telemetry_window_seconds)
    }

    pub fn feedback_retry(&self) -> Duration {
        Duration::from_secs(self.feedback_retry_seconds)
    }

    pub fn feedback_max_retry(&self) -> Duration {
        Duration::from_secs(self.feedback_max_retry_seconds)
    }
}

fn read_u64_with_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}

fn read_bool_with_default(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "on"),
        Err(_) => default,
    }
}
