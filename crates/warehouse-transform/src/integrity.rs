//! Orphan-code counts between the fact table and lookup tables.
//!
//! Keys are plain values, so nothing stops a fact row from carrying a code
//! that no lookup defines. This pass only measures that; it never rejects
//! data.

use std::collections::{BTreeSet, HashSet};

use polars::prelude::{Column, DataFrame, DataType};

use crate::error::Result;

const SAMPLE_LIMIT: usize = 5;

/// Fact rows whose code has no match in one lookup table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrphanReport {
    pub fact_column: String,
    pub dimension: String,
    /// Non-null fact values checked.
    pub checked_rows: usize,
    pub orphan_rows: usize,
    /// Up to five distinct orphan codes, sorted.
    pub sample: Vec<String>,
}

impl OrphanReport {
    pub fn is_clean(&self) -> bool {
        self.orphan_rows == 0
    }
}

/// Count fact rows whose `fact_column` value is missing from the
/// `dim_column` of `dimension`. Integral numbers compare by their integer
/// text (`1.0` matches `"1"`); text compares trimmed.
pub fn count_orphans(
    fact: &DataFrame,
    fact_column: &str,
    dimension_name: &str,
    dimension: &DataFrame,
    dim_column: &str,
) -> Result<OrphanReport> {
    let known: HashSet<String> = code_values(dimension.column(dim_column)?)?
        .into_iter()
        .flatten()
        .collect();

    let mut checked_rows = 0usize;
    let mut orphan_rows = 0usize;
    let mut orphans = BTreeSet::new();
    for code in code_values(fact.column(fact_column)?)?.into_iter().flatten() {
        checked_rows += 1;
        if !known.contains(&code) {
            orphan_rows += 1;
            orphans.insert(code);
        }
    }

    Ok(OrphanReport {
        fact_column: fact_column.to_string(),
        dimension: dimension_name.to_string(),
        checked_rows,
        orphan_rows,
        sample: orphans.into_iter().take(SAMPLE_LIMIT).collect(),
    })
}

fn code_values(column: &Column) -> Result<Vec<Option<String>>> {
    if matches!(column.dtype(), DataType::Float32 | DataType::Float64) {
        let floats = column.cast(&DataType::Float64)?;
        return Ok(floats
            .f64()?
            .iter()
            .map(|value| value.map(float_code))
            .collect());
    }
    let text = column.cast(&DataType::String)?;
    Ok(text
        .str()?
        .iter()
        .map(|value| value.map(|v| v.trim().to_string()))
        .collect())
}

fn float_code(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
