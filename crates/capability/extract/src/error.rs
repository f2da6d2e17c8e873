//! 读取错误类型定义

use std::path::PathBuf;
use std::time::Duration;

/// 参数级读取错误：由编排层捕获并跳过该参数，不影响其他参数。
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// 文件型数据源不存在
    #[error("source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// 无可用驱动，或服务器无法连接
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    /// 表名非法、查询失败或行解码失败
    #[error("query error: {0}")]
    Query(String),

    /// 超出查询时限
    #[error("query timed out after {0:?}")]
    Timeout(Duration),
}
