//! 服务器型数据源（Postgres）。

use crate::query::{Dialect, build_select};
use crate::row::readings_from_rows;
use crate::{ExtractError, Projection, ServerSourceConfig};
use chrono::{DateTime, Utc};
use domain::{Reading, WindowMode};
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;
use tracing::warn;

fn connect_options(server: &ServerSourceConfig) -> PgConnectOptions {
    let options = PgConnectOptions::new()
        .host(&server.host)
        .port(server.port)
        .database(&server.database)
        .username(&server.username);
    match &server.password {
        Some(password) => options.password(password),
        None => options,
    }
}

pub(crate) async fn fetch(
    server: &ServerSourceConfig,
    table: &str,
    window: &WindowMode,
    cutoff: Option<DateTime<Utc>>,
    projection: Projection,
) -> Result<Vec<Reading>, ExtractError> {
    let sql = build_select(table, window, projection, Dialect::Postgres)?;
    let mut conn = PgConnection::connect_with(&connect_options(server))
        .await
        .map_err(|err| ExtractError::SourceUnavailable(err.to_string()))?;

    let result = query(&mut conn, &sql, table, cutoff, projection).await;
    if let Err(err) = conn.close().await {
        warn!(host = %server.host, "closing source failed: {}", err);
    }
    result
}

async fn query(
    conn: &mut PgConnection,
    sql: &str,
    table: &str,
    cutoff: Option<DateTime<Utc>>,
    projection: Projection,
) -> Result<Vec<Reading>, ExtractError> {
    let mut query = sqlx::query(sql);
    if let Some(cutoff) = cutoff {
        query = query.bind(cutoff.naive_utc());
    }
    let rows = query
        .fetch_all(&mut *conn)
        .await
        .map_err(|err| ExtractError::Query(err.to_string()))?;
    readings_from_rows(&rows, projection, table)
}
