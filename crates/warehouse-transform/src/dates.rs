//! SAS date offsets.
//!
//! SAS stores dates as a day count from 1960-01-01. The normalizer adds the
//! (truncated) offset to that epoch; missing, non-finite and out-of-range
//! offsets become null.

use chrono::{NaiveDate, TimeDelta};
use polars::prelude::{DataFrame, DataType, IntoColumn, NamedFrom, Series};

use crate::error::{Result, TransformError};

/// Day zero of SAS date values.
pub const SAS_EPOCH: NaiveDate = match NaiveDate::from_ymd_opt(1960, 1, 1) {
    Some(date) => date,
    None => panic!("invalid SAS epoch"),
};

const UNIX_EPOCH: NaiveDate = match NaiveDate::from_ymd_opt(1970, 1, 1) {
    Some(date) => date,
    None => panic!("invalid Unix epoch"),
};

/// Calendar date for a SAS day offset. Fractional offsets truncate toward zero.
pub fn sas_offset_to_date(offset: Option<f64>) -> Option<NaiveDate> {
    let offset = offset?;
    if !offset.is_finite() {
        return None;
    }
    let days = offset.trunc();
    if days.abs() > f64::from(i32::MAX) {
        return None;
    }
    let delta = TimeDelta::try_days(days as i64)?;
    SAS_EPOCH.checked_add_signed(delta)
}

/// Replace a numeric day-offset column with a `Date` column of the same name
/// and position.
pub fn normalize_date_column(df: &mut DataFrame, column: &str) -> Result<()> {
    let source = df.column(column)?;
    if !is_numeric(source.dtype()) {
        return Err(TransformError::DateColumnType {
            column: column.to_string(),
            dtype: source.dtype().to_string(),
        });
    }
    let offsets = source.cast(&DataType::Float64)?;
    let days: Vec<Option<i32>> = offsets
        .f64()?
        .iter()
        .map(|offset| {
            sas_offset_to_date(offset)
                .and_then(|date| i32::try_from((date - UNIX_EPOCH).num_days()).ok())
        })
        .collect();
    let dates = Series::new(column.into(), days).cast(&DataType::Date)?;
    df.with_column(dates.into_column())?;
    Ok(())
}

fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}
