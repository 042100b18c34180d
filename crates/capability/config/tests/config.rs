use kio_config::{AppConfig, ConfigError};
use std::time::Duration;

#[test]
fn load_config_from_env() {
    // Rust 2024 中 set_var 需要显式标注 unsafe（测试进程内可控）。
    unsafe {
        std::env::remove_var("KIO_ELIONA_API_URL");
        std::env::set_var("KIO_ELIONA_API_TOKEN", "token");
    }
    let err = AppConfig::from_env().expect_err("missing url");
    assert!(matches!(err, ConfigError::Missing(key) if key == "KIO_ELIONA_API_URL"));

    unsafe {
        std::env::set_var("KIO_ELIONA_API_URL", "http://eliona.local/v2/");
        std::env::set_var("KIO_HTTP_ADDR", "127.0.0.1:3001");
        std::env::set_var("KIO_TELEMETRY_WINDOW_SECONDS", "180");
        std::env::set_var("KIO_FEEDBACK", "on");
    }
    let config = AppConfig::from_env().expect("config");
    assert_eq!(config.http_addr, "127.0.0.1:3001");
    assert_eq!(config.eliona_api_url, "http://eliona.local/v2");
    assert_eq!(config.telemetry_window(), Duration::from_secs(180));
    assert_eq!(config.scheduler_tick(), Duration::from_secs(5));
    assert!(config.feedback_enabled);
    assert_eq!(config.feedback_retry(), Duration::from_secs(1));
    assert_eq!(config.feedback_max_retry(), Duration::from_secs(60));

    unsafe {
        std::env::set_var("KIO_FEEDBACK_MAX_RETRY_SECONDS", "not-a-number");
    }
    let err = AppConfig::from_env().expect_err("invalid retry");
    assert!(matches!(err, ConfigError::Invalid(key, _) if key == "KIO_FEEDBACK_MAX_RETRY_SECONDS"));

    unsafe {
        std::env::set_var("KIO_FEEDBACK_RETRY_SECONDS", "30");
        std::env::set_var("KIO_FEEDBACK_MAX_RETRY_SECONDS", "10");
    }
    let err = AppConfig::from_env().expect_err("retry above max");
    assert!(matches!(err, ConfigError::Invalid(key, _) if key == "KIO_FEEDBACK_RETRY_SECONDS"));
    unsafe {
        std::env::remove_var("KIO_FEEDBACK_RETRY_SECONDS");
        std::env::remove_var("KIO_FEEDBACK_MAX_RETRY_SECONDS");
    }
}
