use chrono::{DateTime, SecondsFormat, Utc};
use std::str::FromStr;
use std::time::Duration;

/// 一条趋势日志采样。
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub value_type: Option<i64>,
    pub sequence: Option<i64>,
    pub index: Option<i64>,
}

impl Reading {
    /// 仅含时间与数值的采样（基础查询投影）。
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self {
            timestamp,
            value,
            value_type: None,
            sequence: None,
            index: None,
        }
    }
}

/// 查询时间窗口。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowMode {
    /// 全表读取，保持源的自然顺序。
    All,
    /// `TimeOfSample >= now - duration`，按时间倒序，可选条数上限。
    Recent {
        duration: Duration,
        limit: Option<u32>,
    },
}

impl WindowMode {
    /// 以给定的当前时刻计算窗口下界；`All` 无下界。
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            WindowMode::All => None,
            WindowMode::Recent { duration, .. } => Some(
                chrono::Duration::from_std(*duration)
                    .ok()
                    .and_then(|span| now.checked_sub_signed(span))
                    .unwrap_or(DateTime::<Utc>::MIN_UTC),
            ),
        }
    }

    pub fn limit(&self) -> Option<u32> {
        match self {
            WindowMode::All => None,
            WindowMode::Recent { limit, .. } => *limit,
        }
    }
}

/// 上报时间戳格式。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimestampFormat {
    /// `%Y-%m-%dT%H:%M:%SZ`
    #[default]
    UtcZ,
    /// RFC 3339 带偏移：`2024-01-01T00:00:00+00:00`
    Rfc3339,
}

impl TimestampFormat {
    pub fn format(&self, timestamp: &DateTime<Utc>) -> String {
        match self {
            TimestampFormat::UtcZ => timestamp.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            TimestampFormat::Rfc3339 => timestamp.to_rfc3339_opts(SecondsFormat::Secs, false),
        }
    }
}

impl FromStr for TimestampFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "utc_z" | "z" | "utc" => Ok(TimestampFormat::UtcZ),
            "rfc3339" | "offset" => Ok(TimestampFormat::Rfc3339),
            other => Err(other.to_string()),
        }
    }
}
