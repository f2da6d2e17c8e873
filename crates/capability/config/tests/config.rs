use domain::{TimestampFormat, WindowMode};
use std::time::Duration;
use trendlog_config::{AppConfig, ConfigError};

#[test]
fn load_config_from_env() {
    // Rust 2024 中 set_var 需要显式标注 unsafe（测试进程内可控）。
    unsafe {
        std::env::set_var("TRENDLOG_LOGIN_URL", "http://127.0.0.1:9/api/v1/login");
        std::env::set_var("TRENDLOG_COLLECT_URL", "http://127.0.0.1:9/api/v1/collect");
        std::env::set_var("TRENDLOG_EMAIL", "ops@example.com");
        std::env::set_var("TRENDLOG_PASSWORD", "secret");
        std::env::set_var("TRENDLOG_CATALOG_PATH", "/etc/trendlog/catalog.json");
        std::env::set_var("TRENDLOG_WINDOW_HOURS", "24");
        std::env::set_var("TRENDLOG_WINDOW_LIMIT", "500");
        std::env::set_var("TRENDLOG_TIMESTAMP_FORMAT", "rfc3339");
    }

    let config = AppConfig::from_env().expect("config");
    assert_eq!(config.collect_success_status, 200);
    assert_eq!(config.timestamp_format, TimestampFormat::Rfc3339);
    assert_eq!(
        config.window,
        WindowMode::Recent {
            duration: Duration::from_secs(24 * 3600),
            limit: Some(500),
        }
    );
    assert_eq!(config.http_timeout(), Duration::from_secs(30));
    assert!(config.server.is_none());
    assert!(config.run_interval_seconds.is_none());
    assert!(!format!("{config:?}").contains("secret"));

    unsafe {
        std::env::set_var("TRENDLOG_COLLECT_SUCCESS_STATUS", "201");
        std::env::set_var("TRENDLOG_WINDOW", "all");
        std::env::set_var("TRENDLOG_SERVER_HOST", "db.local");
        std::env::set_var("TRENDLOG_SERVER_DATABASE", "trend");
        std::env::set_var("TRENDLOG_SERVER_USER", "reader");
    }
    let config = AppConfig::from_env().expect("config");
    assert_eq!(config.collect_success_status, 201);
    assert_eq!(config.window, WindowMode::All);
    let server = config.server.expect("server");
    assert_eq!(server.port, 5432);
    assert_eq!(server.database, "trend");

    unsafe {
        std::env::set_var("TRENDLOG_COLLECT_SUCCESS_STATUS", "abc");
    }
    let err = AppConfig::from_env().expect_err("invalid status");
    assert!(matches!(err, ConfigError::Invalid(key, _) if key == "TRENDLOG_COLLECT_SUCCESS_STATUS"));

    unsafe {
        std::env::set_var("TRENDLOG_COLLECT_SUCCESS_STATUS", "200");
        std::env::set_var("TRENDLOG_EXTENDED_COLUMNS", "ON");
    }
    assert!(AppConfig::from_env().expect("config").extended_columns);

    unsafe {
        std::env::set_var("TRENDLOG_EXTENDED_COLUMNS", "yes");
    }
    let err = AppConfig::from_env().expect_err("invalid flag");
    assert!(matches!(err, ConfigError::Invalid(key, value)
        if key == "TRENDLOG_EXTENDED_COLUMNS" && value == "yes"));

    unsafe {
        std::env::set_var("TRENDLOG_EXTENDED_COLUMNS", "0");
        std::env::remove_var("TRENDLOG_EMAIL");
    }
    let err = AppConfig::from_env().expect_err("missing email");
    assert!(matches!(err, ConfigError::Missing(key) if key == "TRENDLOG_EMAIL"));
}
