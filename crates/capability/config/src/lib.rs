//! 转发程序运行配置加载：环境变量 + 参数目录文件。

mod catalog;

use domain::{TimestampFormat, WindowMode};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub use catalog::{load_catalog, parse_catalog, validate_catalog};

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env: {0}")]
    Missing(String),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
    #[error("cannot read catalog {path}: {message}")]
    CatalogIo { path: String, message: String },
    #[error("invalid catalog: {0}")]
    Catalog(String),
}

/// 服务器型数据源的共享连接参数。
#[derive(Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: Option<String>,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// 应用运行配置。
#[derive(Clone)]
pub struct AppConfig {
    pub login_url: String,
    pub collect_url: String,
    pub email: String,
    pub password: String,
    pub catalog_path: PathBuf,
    pub collect_success_status: u16,
    pub timestamp_format: TimestampFormat,
    pub window: WindowMode,
    pub extended_columns: bool,
    pub http_timeout_seconds: u64,
    pub query_timeout_seconds: u64,
    pub run_interval_seconds: Option<u64>,
    pub server: Option<ServerConfig>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("login_url", &self.login_url)
            .field("collect_url", &self.collect_url)
            .field("email", &self.email)
            .field("catalog_path", &self.catalog_path)
            .field("collect_success_status", &self.collect_success_status)
            .field("timestamp_format", &self.timestamp_format)
            .field("window", &self.window)
            .field("extended_columns", &self.extended_columns)
            .field("http_timeout_seconds", &self.http_timeout_seconds)
            .field("query_timeout_seconds", &self.query_timeout_seconds)
            .field("run_interval_seconds", &self.run_interval_seconds)
            .field("server", &self.server)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let login_url = read_required("TRENDLOG_LOGIN_URL")?;
        let collect_url = read_required("TRENDLOG_COLLECT_URL")?;
        let email = read_required("TRENDLOG_EMAIL")?;
        let password = read_required("TRENDLOG_PASSWORD")?;
        let catalog_path = PathBuf::from(read_required("TRENDLOG_CATALOG_PATH")?);

        let collect_success_status = read_u16_with_default("TRENDLOG_COLLECT_SUCCESS_STATUS", 200)?;
        if !(100..=599).contains(&collect_success_status) {
            return Err(ConfigError::Invalid(
                "TRENDLOG_COLLECT_SUCCESS_STATUS".to_string(),
                collect_success_status.to_string(),
            ));
        }
        let timestamp_format = match read_optional("TRENDLOG_TIMESTAMP_FORMAT") {
            Some(value) => value.parse::<TimestampFormat>().map_err(|_| {
                ConfigError::Invalid("TRENDLOG_TIMESTAMP_FORMAT".to_string(), value)
            })?,
            None => TimestampFormat::default(),
        };
        let window = read_window()?;
        let extended_columns = read_bool_with_default("TRENDLOG_EXTENDED_COLUMNS", false)?;
        let http_timeout_seconds = read_positive_u64_with_default("TRENDLOG_HTTP_TIMEOUT_SECONDS", 30)?;
        let query_timeout_seconds =
            read_positive_u64_with_default("TRENDLOG_QUERY_TIMEOUT_SECONDS", 60)?;
        let run_interval_seconds =
            read_optional_u64("TRENDLOG_RUN_INTERVAL_SECONDS")?.filter(|value| *value > 0);
        let server = read_server()?;

        Ok(Self {
            login_url,
            collect_url,
            email,
            password,
            catalog_path,
            collect_success_status,
            timestamp_format,
            window,
            extended_columns,
            http_timeout_seconds,
            query_timeout_seconds,
            run_interval_seconds,
            server,
        })
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_seconds)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_seconds)
    }
}

fn read_window() -> Result<WindowMode, ConfigError> {
    let mode = env::var("TRENDLOG_WINDOW").unwrap_or_else(|_| "recent".to_string());
    match mode.to_ascii_lowercase().as_str() {
        "all" => Ok(WindowMode::All),
        "recent" => {
            let hours = read_positive_u64_with_default("TRENDLOG_WINDOW_HOURS", 48)?;
            let limit = match read_optional_u64("TRENDLOG_WINDOW_LIMIT")? {
                Some(0) | None => None,
                Some(value) => Some(u32::try_from(value).map_err(|_| {
                    ConfigError::Invalid("TRENDLOG_WINDOW_LIMIT".to_string(), value.to_string())
                })?),
            };
            Ok(WindowMode::Recent {
                duration: Duration::from_secs(hours.saturating_mul(3600)),
                limit,
            })
        }
        _ => Err(ConfigError::Invalid("TRENDLOG_WINDOW".to_string(), mode)),
    }
}

/// 仅当设置了 TRENDLOG_SERVER_HOST 时才读取服务器参数。
fn read_server() -> Result<Option<ServerConfig>, ConfigError> {
    let host = match read_optional("TRENDLOG_SERVER_HOST") {
        Some(host) => host,
        None => return Ok(None),
    };
    Ok(Some(ServerConfig {
        host,
        port: read_u16_with_default("TRENDLOG_SERVER_PORT", 5432)?,
        database: read_required("TRENDLOG_SERVER_DATABASE")?,
        username: read_required("TRENDLOG_SERVER_USER")?,
        password: read_optional("TRENDLOG_SERVER_PASSWORD"),
    }))
}

fn read_required(key: &str) -> Result<String, ConfigError> {
    read_optional(key).ok_or_else(|| ConfigError::Missing(key.to_string()))
}

fn read_u16_with_default(key: &str, default: u16) -> Result<u16, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u16>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_positive_u64_with_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    match value.parse::<u64>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(ConfigError::Invalid(key.to_string(), value)),
    }
}

fn read_optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}

fn read_optional_u64(key: &str) -> Result<Option<u64>, ConfigError> {
    match env::var(key) {
        Ok(value) if value.is_empty() => Ok(None),
        Ok(value) => value
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(key.to_string(), value)),
        Err(_) => Ok(None),
    }
}

fn read_bool_with_default(key: &str, default: bool) -> Result<bool, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" => Ok(true),
        "0" | "false" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid(key.to_string(), value)),
    }
}
