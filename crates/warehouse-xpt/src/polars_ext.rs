//! Conversion from [`XptDataset`] to a Polars [`DataFrame`].

use std::path::Path;

use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};

use crate::error::Result;
use crate::reader::read_xpt;
use crate::types::{XptDataset, XptType, XptValue};

/// Convert a dataset to a frame.
///
/// Numeric variables become `Float64` with every missing code as null.
/// Character variables become `String`, trimmed, with blank values as null.
pub fn dataset_to_dataframe(dataset: &XptDataset) -> Result<DataFrame> {
    let columns: Vec<Column> = dataset
        .columns
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            let name = column.name.as_str().into();
            let cells = dataset.rows.iter().map(|row| row.get(idx));
            match column.data_type {
                XptType::Num => {
                    let values: Vec<Option<f64>> =
                        cells.map(|cell| cell.and_then(XptValue::as_f64)).collect();
                    Series::new(name, values).into_column()
                }
                XptType::Char => {
                    let values: Vec<Option<&str>> = cells
                        .map(|cell| {
                            cell.and_then(XptValue::as_str)
                                .map(str::trim)
                                .filter(|s| !s.is_empty())
                        })
                        .collect();
                    Series::new(name, values).into_column()
                }
            }
        })
        .collect();
    Ok(DataFrame::new(columns)?)
}

/// Read an XPT file straight into a frame.
pub fn read_xpt_to_dataframe(path: &Path) -> Result<DataFrame> {
    dataset_to_dataframe(&read_xpt(path)?)
}
