//! Column projection with deduplication and positional renaming.

use std::collections::HashSet;

use polars::prelude::{BooleanChunked, Column, DataFrame, NewChunkedArray};
use tracing::debug;
use warehouse_model::{Projection, TableSpec};

use crate::error::{Result, TransformError};
use crate::row_key::{encode_row, text_columns};

/// Projects a source relation onto one table's columns.
///
/// The output holds exactly the projected columns, renamed to their target
/// names, with duplicate rows dropped (first occurrence kept, input order
/// preserved). The source frame is not modified.
#[derive(Debug, Clone)]
pub struct ColumnProjector {
    table: String,
    projection: Projection,
}

impl ColumnProjector {
    pub fn new(table: impl Into<String>, projection: Projection) -> Self {
        Self {
            table: table.into(),
            projection,
        }
    }

    pub fn for_table(spec: &TableSpec) -> Self {
        Self::new(&spec.name, spec.projection.clone())
    }

    pub fn project(&self, source: &DataFrame) -> Result<DataFrame> {
        let columns = self
            .projection
            .sources()
            .iter()
            .map(|name| {
                source
                    .column(name)
                    .cloned()
                    .map_err(|_| TransformError::MissingColumn {
                        table: self.table.clone(),
                        column: name.clone(),
                    })
            })
            .collect::<Result<Vec<Column>>>()?;

        let selected = DataFrame::new(columns)?;
        let deduped = dedupe_rows(&selected)?;
        debug!(
            table = %self.table,
            rows_in = selected.height(),
            rows_out = deduped.height(),
            "projected columns"
        );

        let renamed = deduped
            .get_columns()
            .iter()
            .zip(self.projection.targets())
            .map(|(col, target)| col.clone().with_name(target.as_str().into()))
            .collect::<Vec<Column>>();
        Ok(DataFrame::new(renamed)?)
    }
}

/// Drop rows equal to an earlier row in every column. Nulls compare equal
/// to each other and unequal to any value.
pub fn dedupe_rows(df: &DataFrame) -> Result<DataFrame> {
    if df.height() == 0 || df.width() == 0 {
        return Ok(df.clone());
    }
    let columns = text_columns(df)?;
    let mut seen = HashSet::with_capacity(df.height());
    let mut keep = Vec::with_capacity(df.height());
    let mut buf = Vec::new();
    for idx in 0..df.height() {
        encode_row(&columns, idx, &mut buf);
        keep.push(seen.insert(buf.clone()));
    }
    if keep.iter().all(|&k| k) {
        return Ok(df.clone());
    }
    let mask = BooleanChunked::from_slice("dedupe".into(), &keep);
    Ok(df.filter(&mask)?)
}
