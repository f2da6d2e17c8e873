use std::path::PathBuf;

/// 参数数据源定位。
#[derive(Debug, Clone, PartialEq)]
pub enum SourceLocator {
    /// 本地数据库文件中的一张表。
    File { path: PathBuf, table: String },
    /// 共享数据库服务器中的一张表（连接参数由配置统一提供）。
    Server { table: String },
}

impl SourceLocator {
    pub fn table(&self) -> &str {
        match self {
            SourceLocator::File { table, .. } | SourceLocator::Server { table } => table,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SourceLocator::File { .. } => "file",
            SourceLocator::Server { .. } => "server",
        }
    }
}

/// 采集端的目标元数据。
#[derive(Debug, Clone, PartialEq)]
pub struct Destination {
    pub host_device: i64,
    pub device: i64,
    pub log: f64,
    pub point: String,
    pub id_equipment: i64,
}

/// 参数目录中的一个监测点（构造后不可变）。
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub id_parameter: i64,
    pub name: String,
    pub unit: Option<String>,
    pub source: SourceLocator,
    pub destination: Destination,
}

/// 表名/列名白名单：`[A-Za-z_][A-Za-z0-9_]*`。
pub fn is_safe_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}
