//! Strict delimited-text reader.

use std::path::Path;

use csv::ReaderBuilder;
use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};
use tracing::info;

use crate::error::{IngestError, Result};

/// Read a delimited file with a header row into a frame of string columns.
///
/// Every cell stays text exactly as written; empty cells become null. A row
/// whose field count differs from the header is an error carrying its
/// 1-based line number.
pub fn read_delimited_table(path: &Path, delimiter: u8) -> Result<DataFrame> {
    if !path.is_file() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(false)
        .from_path(path)
        .map_err(|e| delimited_error(path, &e))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| delimited_error(path, &e))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();
    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(IngestError::MissingHeader {
            path: path.to_path_buf(),
        });
    }

    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record.map_err(|e| delimited_error(path, &e))?;
        for (column, value) in cells.iter_mut().zip(record.iter()) {
            column.push(if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            });
        }
    }

    let columns: Vec<Column> = headers
        .iter()
        .zip(cells)
        .map(|(name, values)| Series::new(name.as_str().into(), values).into_column())
        .collect();
    let df = DataFrame::new(columns)?;

    info!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "read delimited table"
    );
    Ok(df)
}

fn delimited_error(path: &Path, err: &csv::Error) -> IngestError {
    let line = err.position().map_or(0, csv::Position::line);
    let message = match err.kind() {
        csv::ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => format!("expected {expected_len} fields, found {len}"),
        _ => err.to_string(),
    };
    IngestError::Delimited {
        path: path.to_path_buf(),
        line,
        message,
    }
}
