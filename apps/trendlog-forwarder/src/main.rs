//! 趋势日志转发程序：读取楼宇控制器的趋势日志并上报到采集接口。

use domain::Parameter;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use trendlog_auth::{Credentials, HttpAuthenticator};
use trendlog_config::{AppConfig, ServerConfig, load_catalog, validate_catalog};
use trendlog_extract::{ExtractorConfig, Projection, ServerSourceConfig, SqlExtractor};
use trendlog_pipeline::RunOrchestrator;
use trendlog_telemetry::init_tracing;
use trendlog_upload::{HttpUploader, UploaderConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    init_tracing();
    // 从环境变量加载运行配置，并在首轮运行前校验参数目录
    let config = AppConfig::from_env()?;
    let catalog = load_catalog(&config.catalog_path)?;
    validate_catalog(&catalog, config.server.is_some())?;
    info!(
        parameters = catalog.len(),
        catalog = %config.catalog_path.display(),
        "catalog loaded"
    );

    let orchestrator = build_orchestrator(&config)?;

    match config.run_interval_seconds {
        None => {
            orchestrator.run(&catalog).await?;
        }
        Some(seconds) => {
            run_periodically(
                &orchestrator,
                &catalog,
                Duration::from_secs(seconds),
                tokio::signal::ctrl_c(),
            )
            .await;
        }
    }
    Ok(())
}

fn build_orchestrator(config: &AppConfig) -> Result<RunOrchestrator, reqwest::Error> {
    // 认证与上报共用一个带超时的 HTTP 客户端
    let client = reqwest::Client::builder()
        .timeout(config.http_timeout())
        .build()?;

    let authenticator = HttpAuthenticator::new(
        client.clone(),
        config.login_url.clone(),
        Credentials::new(config.email.clone(), config.password.clone()),
    );
    let extractor = SqlExtractor::new(ExtractorConfig {
        projection: if config.extended_columns {
            Projection::Extended
        } else {
            Projection::Basic
        },
        query_timeout: config.query_timeout(),
        server: config.server.as_ref().map(server_source),
    });
    let uploader = HttpUploader::new(
        client,
        UploaderConfig {
            collect_url: config.collect_url.clone(),
            success_status: config.collect_success_status,
            timestamp_format: config.timestamp_format,
        },
    );

    Ok(RunOrchestrator::new(
        Arc::new(authenticator),
        Arc::new(extractor),
        Arc::new(uploader),
        config.window,
    ))
}

fn server_source(server: &ServerConfig) -> ServerSourceConfig {
    ServerSourceConfig {
        host: server.host.clone(),
        port: server.port,
        database: server.database.clone(),
        username: server.username.clone(),
        password: server.password.clone(),
    }
}

/// 周期模式：每个 tick 跑一轮，认证失败只记录，等下一轮。
///
/// `shutdown` 完成即退出，正在进行的一轮也会被放弃。
async fn run_periodically<F>(
    orchestrator: &RunOrchestrator,
    catalog: &[Parameter],
    period: Duration,
    shutdown: F,
) where
    F: Future,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    tokio::pin!(shutdown);
    info!(period_seconds = period.as_secs(), "periodic mode");
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                tokio::select! {
                    result = orchestrator.run(catalog) => {
                        if let Err(err) = result {
                            error!("run aborted: {}", err);
                        }
                    }
                    _ = &mut shutdown => {
                        warn!("shutdown requested, abandoning current run");
                        break;
                    }
                }
            }
            _ = &mut shutdown => {
                info!("shutdown requested");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{run_periodically, server_source};
    use async_trait::async_trait;
    use domain::{Destination, Parameter, Reading, SessionToken, SourceLocator, WindowMode};
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use trendlog_auth::{AuthError, Authenticator};
    use trendlog_config::ServerConfig;
    use trendlog_extract::{ExtractError, ReadingExtractor};
    use trendlog_pipeline::RunOrchestrator;
    use trendlog_upload::{UploadError, UploadResult, Uploader};

    /// 登录永不返回，模拟卡住的一轮。
    #[derive(Default)]
    struct HangingAuthenticator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Authenticator for HangingAuthenticator {
        async fn authenticate(&self) -> Result<SessionToken, AuthError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::future::pending().await
        }
    }

    struct NoExtractor;

    #[async_trait]
    impl ReadingExtractor for NoExtractor {
        async fn extract(
            &self,
            _source: &SourceLocator,
            _window: &WindowMode,
        ) -> Result<Vec<Reading>, ExtractError> {
            Ok(Vec::new())
        }
    }

    struct NoUploader;

    #[async_trait]
    impl Uploader for NoUploader {
        async fn upload(
            &self,
            readings: &[Reading],
            _parameter: &Parameter,
            _token: &SessionToken,
        ) -> Result<UploadResult, UploadError> {
            Ok(UploadResult {
                status: 200,
                sent: readings.len(),
            })
        }
    }

    fn catalog() -> Vec<Parameter> {
        vec![Parameter {
            id_parameter: 2,
            name: "VFD_RETURN_MODULATION".to_string(),
            unit: Some("%".to_string()),
            source: SourceLocator::File {
                path: PathBuf::from("/data/trend.db"),
                table: "tblTrendlog_2013000_0000000012".to_string(),
            },
            destination: Destination {
                host_device: 2013009,
                device: 2013000,
                log: 12.0,
                point: "AO-1".to_string(),
                id_equipment: 3,
            },
        }]
    }

    #[tokio::test]
    async fn shutdown_interrupts_a_run_in_progress() {
        let authenticator = Arc::new(HangingAuthenticator::default());
        let orchestrator = RunOrchestrator::new(
            authenticator.clone(),
            Arc::new(NoExtractor),
            Arc::new(NoUploader),
            WindowMode::All,
        );

        let finished = tokio::time::timeout(
            Duration::from_secs(5),
            run_periodically(
                &orchestrator,
                &catalog(),
                Duration::from_secs(3600),
                tokio::time::sleep(Duration::from_millis(100)),
            ),
        )
        .await;
        assert!(finished.is_ok());
        assert_eq!(authenticator.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn server_settings_map_to_source_config() {
        let source = server_source(&ServerConfig {
            host: "db.local".to_string(),
            port: 5433,
            database: "trend".to_string(),
            username: "reader".to_string(),
            password: Some("pw".to_string()),
        });
        assert_eq!(source.host, "db.local");
        assert_eq!(source.port, 5433);
        assert_eq!(source.database, "trend");
        assert_eq!(source.password.as_deref(), Some("pw"));
        assert!(!format!("{source:?}").contains("pw"));
    }
}
