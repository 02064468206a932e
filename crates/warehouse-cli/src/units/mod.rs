//! The three load units.
//!
//! Each unit reads one raw source under the source root, builds its tables
//! and writes them through the shared sink. Units share nothing but the
//! surrogate key assigner, so any one of them can fail without affecting the
//! others.

mod demographics;
mod immigration;
mod reference;

use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use tracing::debug;
use warehouse_model::{ReferenceLayout, TableSpec, Unit};
use warehouse_output::ParquetSink;
use warehouse_transform::{
    ColumnProjector, SurrogateKeyAssigner, TableFrame, normalize_date_column,
};

use crate::types::TableSummary;

pub use demographics::{DEMOGRAPHICS_DELIMITER, DEMOGRAPHICS_FILE};
pub use immigration::IMMIGRATION_DIR;
pub use reference::LABELS_FILE;

/// Shared inputs handed to every unit.
pub struct UnitContext<'a> {
    pub source: &'a Path,
    pub sink: &'a ParquetSink,
    pub keys: &'a SurrogateKeyAssigner,
    pub layout: &'a ReferenceLayout,
}

/// What a unit has written so far. Frames are kept only when asked for.
#[derive(Debug, Default)]
pub struct UnitOutput {
    pub tables: Vec<TableSummary>,
    retain_frames: bool,
    frames: Vec<TableFrame>,
}

impl UnitOutput {
    pub fn new(retain_frames: bool) -> Self {
        Self {
            retain_frames,
            ..Self::default()
        }
    }

    /// Write `frame` and record the result.
    pub fn write(&mut self, sink: &ParquetSink, frame: TableFrame) -> Result<()> {
        let report = sink
            .write(&frame)
            .with_context(|| format!("write {}", frame.name))?;
        self.tables.push(TableSummary {
            name: report.table,
            rows: report.rows,
            partitions: report.partitions,
            files: report.files,
        });
        if self.retain_frames {
            self.frames.push(frame);
        }
        Ok(())
    }

    pub fn into_frames(self) -> Vec<TableFrame> {
        self.frames
    }
}

/// Run one unit to completion or to its first error.
pub fn run_unit(unit: Unit, ctx: &UnitContext<'_>, out: &mut UnitOutput) -> Result<()> {
    match unit {
        Unit::Immigration => immigration::run(ctx, out),
        Unit::Demographics => demographics::run(ctx, out),
        Unit::Reference => reference::run(ctx, out),
    }
}

/// Project, key and date-normalize one catalog table from a raw frame.
pub(crate) fn build_table(
    spec: &TableSpec,
    raw: &DataFrame,
    keys: &SurrogateKeyAssigner,
) -> Result<TableFrame> {
    let mut data = ColumnProjector::for_table(spec)
        .project(raw)
        .with_context(|| format!("project {}", spec.name))?;
    keys.assign(&spec.name, &mut data, &spec.key_column)?;
    for column in &spec.date_columns {
        normalize_date_column(&mut data, column)
            .with_context(|| format!("normalize {}.{column}", spec.name))?;
    }
    debug!(table = %spec.name, rows = data.height(), "table built");

    let frame = TableFrame::new(&spec.name, data);
    Ok(match &spec.partition_by {
        Some(column) => frame.partitioned_by(column),
        None => frame,
    })
}
