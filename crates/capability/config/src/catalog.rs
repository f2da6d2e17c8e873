//! 参数目录：JSON 文件 → 校验后的 `Parameter` 列表。

use crate::ConfigError;
use domain::{Destination, Parameter, SourceLocator, is_safe_identifier};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum SourceKind {
    #[default]
    File,
    Server,
}

/// 目录文件中的一项（字段名沿用采集端的命名）。
#[derive(Debug, Deserialize)]
struct CatalogEntry {
    id_parameter: i64,
    name: String,
    #[serde(rename = "hostDevice")]
    host_device: i64,
    device: i64,
    #[serde(default)]
    log: Option<f64>,
    #[serde(default)]
    point: Option<String>,
    id_equipment: i64,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    source: SourceKind,
    #[serde(default, alias = "mdb_path")]
    path: Option<PathBuf>,
    table_name: String,
}

impl CatalogEntry {
    fn into_parameter(self) -> Result<Parameter, ConfigError> {
        let source = match self.source {
            SourceKind::File => {
                let path = self.path.filter(|path| !path.as_os_str().is_empty()).ok_or_else(|| {
                    ConfigError::Catalog(format!("parameter {} has no file path", self.id_parameter))
                })?;
                SourceLocator::File {
                    path,
                    table: self.table_name,
                }
            }
            SourceKind::Server => SourceLocator::Server {
                table: self.table_name,
            },
        };
        Ok(Parameter {
            id_parameter: self.id_parameter,
            name: self.name,
            unit: self.unit,
            source,
            destination: Destination {
                host_device: self.host_device,
                device: self.device,
                log: self.log.unwrap_or(0.0),
                point: self.point.unwrap_or_default(),
                id_equipment: self.id_equipment,
            },
        })
    }
}

/// 读取并解析目录文件（不做跨项校验）。
pub fn load_catalog(path: &Path) -> Result<Vec<Parameter>, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|err| ConfigError::CatalogIo {
        path: path.display().to_string(),
        message: err.to_string(),
    })?;
    parse_catalog(&raw)
}

pub fn parse_catalog(raw: &str) -> Result<Vec<Parameter>, ConfigError> {
    let entries: Vec<CatalogEntry> =
        serde_json::from_str(raw).map_err(|err| ConfigError::Catalog(err.to_string()))?;
    entries
        .into_iter()
        .map(CatalogEntry::into_parameter)
        .collect()
}

/// 运行前校验目录：非空、名称非空、id 唯一、表名合法、服务器源需有服务器配置。
pub fn validate_catalog(catalog: &[Parameter], server_configured: bool) -> Result<(), ConfigError> {
    if catalog.is_empty() {
        return Err(ConfigError::Catalog("catalog is empty".to_string()));
    }
    let mut seen = HashSet::new();
    for parameter in catalog {
        if parameter.name.trim().is_empty() {
            return Err(ConfigError::Catalog(format!(
                "parameter {} has an empty name",
                parameter.id_parameter
            )));
        }
        if !seen.insert(parameter.id_parameter) {
            return Err(ConfigError::Catalog(format!(
                "duplicate id_parameter {}",
                parameter.id_parameter
            )));
        }
        if !is_safe_identifier(parameter.source.table()) {
            return Err(ConfigError::Catalog(format!(
                "parameter {} has an invalid table name: {:?}",
                parameter.id_parameter,
                parameter.source.table()
            )));
        }
        if matches!(parameter.source, SourceLocator::Server { .. }) && !server_configured {
            return Err(ConfigError::Catalog(format!(
                "parameter {} is server-based but TRENDLOG_SERVER_HOST is not set",
                parameter.id_parameter
            )));
        }
    }
    Ok(())
}
