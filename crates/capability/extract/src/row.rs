use crate::{ExtractError, Projection};
use chrono::NaiveDateTime;
use domain::Reading;
use sqlx::{ColumnIndex, Decode, Row, Type};
use tracing::warn;

/// 按投影顺序解码一行；TimeOfSample 视为 UTC 时间。
///
/// SampleValue 为 NULL 时返回 `None`，由调用方丢弃该行。
pub(crate) fn reading_from_row<'r, R>(
    row: &'r R,
    projection: Projection,
) -> Result<Option<Reading>, sqlx::Error>
where
    R: Row,
    usize: ColumnIndex<R>,
    NaiveDateTime: Decode<'r, R::Database> + Type<R::Database>,
    f64: Decode<'r, R::Database> + Type<R::Database>,
    i64: Decode<'r, R::Database> + Type<R::Database>,
{
    let timestamp: NaiveDateTime = row.try_get(0)?;
    let Some(value) = row.try_get::<Option<f64>, _>(1)? else {
        return Ok(None);
    };
    let mut reading = Reading::new(timestamp.and_utc(), value);
    if projection == Projection::Extended {
        reading.value_type = row.try_get::<Option<i64>, _>(2)?;
        reading.sequence = row.try_get::<Option<i64>, _>(3)?;
        reading.index = row.try_get::<Option<i64>, _>(4)?;
    }
    Ok(Some(reading))
}

/// 解码全部行，跳过无值的采样。
pub(crate) fn readings_from_rows<R>(
    rows: &[R],
    projection: Projection,
    table: &str,
) -> Result<Vec<Reading>, ExtractError>
where
    R: Row,
    usize: ColumnIndex<R>,
    for<'r> NaiveDateTime: Decode<'r, R::Database> + Type<R::Database>,
    for<'r> f64: Decode<'r, R::Database> + Type<R::Database>,
    for<'r> i64: Decode<'r, R::Database> + Type<R::Database>,
{
    let mut readings = Vec::with_capacity(rows.len());
    let mut skipped = 0usize;
    for row in rows {
        match reading_from_row(row, projection) {
            Ok(Some(reading)) => readings.push(reading),
            Ok(None) => skipped += 1,
            Err(err) => return Err(ExtractError::Query(err.to_string())),
        }
    }
    if skipped > 0 {
        warn!(table, skipped, "samples without value dropped");
    }
    Ok(readings)
}
