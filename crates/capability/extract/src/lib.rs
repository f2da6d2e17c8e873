//! 趋势日志读取：打开数据源、按时间窗口查询、返回 `Reading` 序列。
//!
//! ## 数据源
//!
//! - 文件型：本地 SQLite 文件，只读打开，连接前先检查文件存在
//! - 服务器型：共享 Postgres 服务器，连接失败即视为不可用
//!
//! 查询结果为空时返回空序列而不是错误；连接在所有退出路径上关闭。

mod error;
mod postgres;
mod query;
mod row;
mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{Reading, SourceLocator, WindowMode};
use std::time::Duration;
use tracing::debug;

pub use error::ExtractError;
pub use query::Projection;

/// 服务器型数据源连接参数。
#[derive(Clone)]
pub struct ServerSourceConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: Option<String>,
}

impl std::fmt::Debug for ServerSourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerSourceConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// 读取器配置。
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub projection: Projection,
    pub query_timeout: Duration,
    pub server: Option<ServerSourceConfig>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            projection: Projection::Basic,
            query_timeout: Duration::from_secs(60),
            server: None,
        }
    }
}

/// 读取器抽象。
#[async_trait]
pub trait ReadingExtractor: Send + Sync {
    async fn extract(
        &self,
        source: &SourceLocator,
        window: &WindowMode,
    ) -> Result<Vec<Reading>, ExtractError>;
}

/// 基于 sqlx 的读取器。
#[derive(Debug, Clone, Default)]
pub struct SqlExtractor {
    config: ExtractorConfig,
}

impl SqlExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    async fn fetch(
        &self,
        source: &SourceLocator,
        window: &WindowMode,
        cutoff: Option<DateTime<Utc>>,
    ) -> Result<Vec<Reading>, ExtractError> {
        match source {
            SourceLocator::File { path, table } => {
                sqlite::fetch(path, table, window, cutoff, self.config.projection).await
            }
            SourceLocator::Server { table } => {
                let server = self.config.server.as_ref().ok_or_else(|| {
                    ExtractError::SourceUnavailable("no server source configured".to_string())
                })?;
                postgres::fetch(server, table, window, cutoff, self.config.projection).await
            }
        }
    }
}

#[async_trait]
impl ReadingExtractor for SqlExtractor {
    async fn extract(
        &self,
        source: &SourceLocator,
        window: &WindowMode,
    ) -> Result<Vec<Reading>, ExtractError> {
        let cutoff = window.cutoff(Utc::now());
        debug!(kind = source.kind(), table = source.table(), ?cutoff, "extracting");
        tokio::time::timeout(self.config.query_timeout, self.fetch(source, window, cutoff))
            .await
            .map_err(|_| ExtractError::Timeout(self.config.query_timeout))?
    }
}
