//! 文件型数据源（SQLite，只读）。

use crate::query::{Dialect, build_select};
use crate::row::readings_from_rows;
use crate::{ExtractError, Projection};
use chrono::{DateTime, Utc};
use domain::{Reading, WindowMode};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::Connection;
use std::path::Path;
use tracing::warn;

/// 可由内置 SQLite 引擎打开的扩展名。
const SQLITE_EXTENSIONS: [&str; 4] = ["db", "sqlite", "sqlite3", "db3"];

fn has_engine(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SQLITE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

pub(crate) async fn fetch(
    path: &Path,
    table: &str,
    window: &WindowMode,
    cutoff: Option<DateTime<Utc>>,
    projection: Projection,
) -> Result<Vec<Reading>, ExtractError> {
    if !path.exists() {
        return Err(ExtractError::SourceNotFound(path.to_path_buf()));
    }
    if !has_engine(path) {
        return Err(ExtractError::SourceUnavailable(format!(
            "no driver available for {}",
            path.display()
        )));
    }
    let sql = build_select(table, window, projection, Dialect::Sqlite)?;

    let options = SqliteConnectOptions::new()
        .filename(path)
        .read_only(true)
        .create_if_missing(false);
    let mut conn = SqliteConnection::connect_with(&options)
        .await
        .map_err(|err| ExtractError::SourceUnavailable(err.to_string()))?;

    let result = query(&mut conn, &sql, table, cutoff, projection).await;
    if let Err(err) = conn.close().await {
        warn!(path = %path.display(), "closing source failed: {}", err);
    }
    result
}

async fn query(
    conn: &mut SqliteConnection,
    sql: &str,
    table: &str,
    cutoff: Option<DateTime<Utc>>,
    projection: Projection,
) -> Result<Vec<Reading>, ExtractError> {
    let mut query = sqlx::query(sql);
    if let Some(cutoff) = cutoff {
        query = query.bind(cutoff.naive_utc().format("%Y-%m-%d %H:%M:%S").to_string());
    }
    let rows = query
        .fetch_all(&mut *conn)
        .await
        .map_err(|err| ExtractError::Query(err.to_string()))?;
    readings_from_rows(&rows, projection, table)
}
