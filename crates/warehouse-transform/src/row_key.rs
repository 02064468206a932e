//! Null-aware row encoding used for deduplication and content hashing.

use polars::prelude::{
    Column, DataFrame, DataType, Float64Chunked, IntoColumn, IntoSeries, StringChunked,
};

use crate::error::Result;

/// Every column of `df` rendered as text; nulls stay null.
pub(crate) fn text_columns(df: &DataFrame) -> Result<Vec<StringChunked>> {
    df.get_columns().iter().map(text_column).collect()
}

/// Float columns fold `-0.0` into `0.0` first so both render alike.
fn text_column(col: &Column) -> Result<StringChunked> {
    let text = if col.dtype().is_float() {
        let floats = col.cast(&DataType::Float64)?;
        let folded: Float64Chunked = floats
            .f64()?
            .iter()
            .map(|v| v.map(|x| if x == 0.0 { 0.0 } else { x }))
            .collect();
        folded
            .into_series()
            .into_column()
            .cast(&DataType::String)?
    } else {
        col.cast(&DataType::String)?
    };
    Ok(text.str()?.clone())
}

/// Encode row `idx` so that two rows encode equally exactly when every cell
/// is equal, with null distinct from the empty string.
pub(crate) fn encode_row(columns: &[StringChunked], idx: usize, buf: &mut Vec<u8>) {
    buf.clear();
    for column in columns {
        match column.get(idx) {
            None => buf.push(0),
            Some(value) => {
                buf.push(1);
                buf.extend_from_slice(&(value.len() as u64).to_le_bytes());
                buf.extend_from_slice(value.as_bytes());
            }
        }
    }
}
