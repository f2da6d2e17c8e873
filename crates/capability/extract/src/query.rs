//! 查询语句构造。
//!
//! 表名来自参数目录，属于受信输入；仍先经过白名单校验再加双引号拼入语句，
//! 时间下界始终以绑定参数传入。

use crate::ExtractError;
use domain::{WindowMode, is_safe_identifier};

/// 查询投影。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Projection {
    /// TimeOfSample, SampleValue
    #[default]
    Basic,
    /// 额外读取 ValueType, Sequence, Index
    Extended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Dialect {
    Sqlite,
    Postgres,
}

impl Dialect {
    fn real(self) -> &'static str {
        match self {
            Dialect::Sqlite => "REAL",
            Dialect::Postgres => "DOUBLE PRECISION",
        }
    }

    fn integer(self) -> &'static str {
        match self {
            Dialect::Sqlite => "INTEGER",
            Dialect::Postgres => "BIGINT",
        }
    }

    /// 过滤与排序共用的时间键。
    ///
    /// SQLite 列无固定类型：文本交给 datetime() 归一化（`' '` 与 `'T'` 分隔都接受），
    /// 整数按 unix 秒解释，与 sqlx 的解码规则一致。
    fn time_key(self) -> &'static str {
        match self {
            Dialect::Sqlite => {
                "CASE typeof(\"TimeOfSample\") \
                 WHEN 'integer' THEN datetime(\"TimeOfSample\", 'unixepoch') \
                 ELSE datetime(\"TimeOfSample\") END"
            }
            Dialect::Postgres => "\"TimeOfSample\"",
        }
    }

    fn cutoff_param(self) -> &'static str {
        match self {
            Dialect::Sqlite => "datetime(?)",
            Dialect::Postgres => "$1",
        }
    }
}

pub(crate) fn quote_identifier(name: &str) -> Result<String, ExtractError> {
    if !is_safe_identifier(name) {
        return Err(ExtractError::Query(format!("invalid table name: {name:?}")));
    }
    Ok(format!("\"{name}\""))
}

pub(crate) fn build_select(
    table: &str,
    window: &WindowMode,
    projection: Projection,
    dialect: Dialect,
) -> Result<String, ExtractError> {
    let table = quote_identifier(table)?;
    let mut columns = format!(
        "\"TimeOfSample\", CAST(\"SampleValue\" AS {})",
        dialect.real()
    );
    if projection == Projection::Extended {
        let int = dialect.integer();
        columns.push_str(&format!(
            ", CAST(\"ValueType\" AS {int}), CAST(\"Sequence\" AS {int}), CAST(\"Index\" AS {int})"
        ));
    }

    let mut sql = format!("SELECT {columns} FROM {table}");
    if let WindowMode::Recent { limit, .. } = window {
        let key = dialect.time_key();
        sql.push_str(&format!(
            " WHERE {key} >= {} ORDER BY {key} DESC",
            dialect.cutoff_param()
        ));
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
    }
    Ok(sql)
}
