//! 追踪初始化、运行 ID 与进程级计数器。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 计数器快照。
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub runs_started: u64,
    pub runs_failed: u64,
    pub parameters_done: u64,
    pub parameters_empty: u64,
    pub parameters_failed: u64,
    pub readings_uploaded: u64,
    pub upload_latency_ms_total: u64,
    pub upload_latency_ms_count: u64,
}

/// 进程生命周期内累计的转发计数器（周期模式下跨运行累加）。
pub struct TelemetryMetrics {
    runs_started: AtomicU64,
    runs_failed: AtomicU64,
    parameters_done: AtomicU64,
    parameters_empty: AtomicU64,
    parameters_failed: AtomicU64,
    readings_uploaded: AtomicU64,
    upload_latency_ms_total: AtomicU64,
    upload_latency_ms_count: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            runs_started: AtomicU64::new(0),
            runs_failed: AtomicU64::new(0),
            parameters_done: AtomicU64::new(0),
            parameters_empty: AtomicU64::new(0),
            parameters_failed: AtomicU64::new(0),
            readings_uploaded: AtomicU64::new(0),
            upload_latency_ms_total: AtomicU64::new(0),
            upload_latency_ms_count: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            runs_started: self.runs_started.load(Ordering::Relaxed),
            runs_failed: self.runs_failed.load(Ordering::Relaxed),
            parameters_done: self.parameters_done.load(Ordering::Relaxed),
            parameters_empty: self.parameters_empty.load(Ordering::Relaxed),
            parameters_failed: self.parameters_failed.load(Ordering::Relaxed),
            readings_uploaded: self.readings_uploaded.load(Ordering::Relaxed),
            upload_latency_ms_total: self.upload_latency_ms_total.load(Ordering::Relaxed),
            upload_latency_ms_count: self.upload_latency_ms_count.load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局指标实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 run_id。
pub fn new_run_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// 记录运行开始次数。
pub fn record_run_started() {
    metrics().runs_started.fetch_add(1, Ordering::Relaxed);
}

/// 记录认证失败导致的整轮失败。
pub fn record_run_failed() {
    metrics().runs_failed.fetch_add(1, Ordering::Relaxed);
}

/// 记录参数上报成功，并累加上报条数。
pub fn record_parameter_done(readings: u64) {
    let metrics = metrics();
    metrics.parameters_done.fetch_add(1, Ordering::Relaxed);
    metrics
        .readings_uploaded
        .fetch_add(readings, Ordering::Relaxed);
}

/// 记录参数无数据。
pub fn record_parameter_empty() {
    metrics().parameters_empty.fetch_add(1, Ordering::Relaxed);
}

/// 记录参数失败（读取或上报）。
pub fn record_parameter_failed() {
    metrics().parameters_failed.fetch_add(1, Ordering::Relaxed);
}

/// 记录单次上报耗时（毫秒）。
pub fn record_upload_latency_ms(latency_ms: u64) {
    let metrics = metrics();
    metrics
        .upload_latency_ms_total
        .fetch_add(latency_ms, Ordering::Relaxed);
    metrics
        .upload_latency_ms_count
        .fetch_add(1, Ordering::Relaxed);
}
