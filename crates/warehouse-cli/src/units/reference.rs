//! Label-description file to the code lookup tables.

use anyhow::{Context, Result, ensure};
use tracing::{info, warn};
use warehouse_ingest::{parse_code_table, read_reference_lines};
use warehouse_transform::TableFrame;

use super::{UnitContext, UnitOutput};

pub const LABELS_FILE: &str = "I94_SAS_Labels_Descriptions.SAS";

pub(super) fn run(ctx: &UnitContext<'_>, out: &mut UnitOutput) -> Result<()> {
    let path = ctx.source.join(LABELS_FILE);
    let lines = read_reference_lines(&path)
        .with_context(|| format!("load reference labels from {}", path.display()))?;
    info!(lines = lines.len(), tables = ctx.layout.tables.len(), "reference labels loaded");
    let required = ctx.layout.required_lines();
    ensure!(
        lines.len() >= required,
        "{} has {} lines but the reference layout reads up to line {required}; \
         the file does not match the layout",
        path.display(),
        lines.len()
    );

    for spec in &ctx.layout.tables {
        let table = parse_code_table(&lines, spec)?;
        if table.is_empty() {
            warn!(table = %spec.table_name, "reference window holds no codes");
        }
        let data = table
            .to_dataframe()
            .with_context(|| format!("materialize {}", spec.table_name))?;
        out.write(ctx.sink, TableFrame::new(&spec.table_name, data))?;
    }
    Ok(())
}
