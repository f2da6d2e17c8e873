//! 运行编排：认证 → 按目录顺序逐个参数读取并上报。
//!
//! 状态流转：`Init → Authenticated → (逐参数) → Complete`，认证失败直接进入
//! `RunFailed`，不处理任何参数。参数级失败只记录，不影响后续参数。

use domain::{Parameter, SessionToken, WindowMode};
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, error, info, info_span, warn};
use trendlog_auth::{AuthError, Authenticator};
use trendlog_extract::ReadingExtractor;
use trendlog_upload::Uploader;

/// 整轮运行错误：只有认证失败会让整轮失败。
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("run {run_id} failed: {source}")]
    Authentication {
        run_id: String,
        #[source]
        source: AuthError,
    },
}

/// 运行状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    Authenticated,
    Complete,
    RunFailed,
}

/// 参数失败发生的阶段。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extract,
    Upload,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Extract => "extract",
            Stage::Upload => "upload",
        }
    }
}

/// 单个参数的处理结果。
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterOutcome {
    Done { records: usize },
    Empty,
    Failed { stage: Stage, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterReport {
    pub id_parameter: i64,
    pub name: String,
    pub outcome: ParameterOutcome,
}

/// 一轮运行的汇总。
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: String,
    pub state: RunState,
    pub reports: Vec<ParameterReport>,
}

impl RunSummary {
    pub fn succeeded(&self) -> usize {
        self.count(|outcome| matches!(outcome, ParameterOutcome::Done { .. }))
    }

    pub fn empty(&self) -> usize {
        self.count(|outcome| matches!(outcome, ParameterOutcome::Empty))
    }

    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, ParameterOutcome::Failed { .. }))
    }

    /// 本轮上报的采样总数。
    pub fn records(&self) -> usize {
        self.reports
            .iter()
            .map(|report| match report.outcome {
                ParameterOutcome::Done { records } => records,
                _ => 0,
            })
            .sum()
    }

    fn count(&self, predicate: impl Fn(&ParameterOutcome) -> bool) -> usize {
        self.reports
            .iter()
            .filter(|report| predicate(&report.outcome))
            .count()
    }
}

/// 运行编排器。
#[derive(Clone)]
pub struct RunOrchestrator {
    authenticator: Arc<dyn Authenticator>,
    extractor: Arc<dyn ReadingExtractor>,
    uploader: Arc<dyn Uploader>,
    window: WindowMode,
}

impl RunOrchestrator {
    pub fn new(
        authenticator: Arc<dyn Authenticator>,
        extractor: Arc<dyn ReadingExtractor>,
        uploader: Arc<dyn Uploader>,
        window: WindowMode,
    ) -> Self {
        Self {
            authenticator,
            extractor,
            uploader,
            window,
        }
    }

    /// 执行一轮：获取 token 后按目录顺序处理每个参数。
    pub async fn run(&self, catalog: &[Parameter]) -> Result<RunSummary, RunError> {
        let run_id = trendlog_telemetry::new_run_id();
        let span = info_span!("run", run_id = %run_id);
        self.run_catalog(run_id, catalog).instrument(span).await
    }

    async fn run_catalog(
        &self,
        run_id: String,
        catalog: &[Parameter],
    ) -> Result<RunSummary, RunError> {
        trendlog_telemetry::record_run_started();
        let mut state = RunState::Init;
        info!(?state, parameters = catalog.len(), "run started");

        let token = match self.authenticator.authenticate().await {
            Ok(token) => token,
            Err(err) => {
                state = RunState::RunFailed;
                error!(?state, "authentication failed: {}", err);
                trendlog_telemetry::record_run_failed();
                return Err(RunError::Authentication {
                    run_id,
                    source: err,
                });
            }
        };
        state = RunState::Authenticated;
        info!(?state, "authenticated");

        let mut reports = Vec::with_capacity(catalog.len());
        for parameter in catalog {
            let span = info_span!("parameter", id_parameter = parameter.id_parameter);
            let outcome = self.process(parameter, &token).instrument(span).await;
            reports.push(ParameterReport {
                id_parameter: parameter.id_parameter,
                name: parameter.name.clone(),
                outcome,
            });
        }

        let summary = RunSummary {
            run_id,
            state: RunState::Complete,
            reports,
        };
        info!(
            state = ?summary.state,
            succeeded = summary.succeeded(),
            empty = summary.empty(),
            failed = summary.failed(),
            records = summary.records(),
            "run complete"
        );
        Ok(summary)
    }

    async fn process(&self, parameter: &Parameter, token: &SessionToken) -> ParameterOutcome {
        let id_parameter = parameter.id_parameter;
        let param_name = parameter.name.as_str();
        info!(
            id_parameter,
            name = param_name,
            source = parameter.source.kind(),
            "processing"
        );

        let readings = match self.extractor.extract(&parameter.source, &self.window).await {
            Ok(readings) => readings,
            Err(err) => {
                warn!(id_parameter, name = param_name, "extraction failed: {}", err);
                trendlog_telemetry::record_parameter_failed();
                return ParameterOutcome::Failed {
                    stage: Stage::Extract,
                    reason: err.to_string(),
                };
            }
        };
        if readings.is_empty() {
            info!(id_parameter, name = param_name, "no data found");
            trendlog_telemetry::record_parameter_empty();
            return ParameterOutcome::Empty;
        }

        info!(
            id_parameter,
            name = param_name,
            records = readings.len(),
            "sending to collect api"
        );
        let started = Instant::now();
        let result = self.uploader.upload(&readings, parameter, token).await;
        trendlog_telemetry::record_upload_latency_ms(started.elapsed().as_millis() as u64);
        match result {
            Ok(result) => {
                info!(
                    id_parameter,
                    name = param_name,
                    records = result.sent,
                    status = result.status,
                    "sent"
                );
                trendlog_telemetry::record_parameter_done(result.sent as u64);
                ParameterOutcome::Done {
                    records: result.sent,
                }
            }
            Err(err) => {
                warn!(id_parameter, name = param_name, "upload failed: {}", err);
                trendlog_telemetry::record_parameter_failed();
                ParameterOutcome::Failed {
                    stage: Stage::Upload,
                    reason: err.to_string(),
                }
            }
        }
    }
}
