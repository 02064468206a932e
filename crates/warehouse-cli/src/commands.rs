use anyhow::{Context, Result};
use comfy_table::Table;
use tracing::info;

use warehouse_cli::config::{Overrides, RunConfig};
use warehouse_cli::pipeline::{run_pipeline, skipped_units};
use warehouse_cli::types::RunResult;
use warehouse_model::{ReferenceLayout, Unit, output_tables};

use crate::cli::{RunArgs, TablesArgs};
use crate::summary::apply_table_style;

pub fn run_tables(args: &TablesArgs) -> Result<()> {
    let layout = match &args.reference_layout {
        Some(path) => ReferenceLayout::load(path)
            .with_context(|| format!("load reference layout {}", path.display()))?,
        None => ReferenceLayout::default(),
    };
    let mut table = Table::new();
    table.set_header(vec!["Table", "Unit", "Columns", "Partitioned by"]);
    apply_table_style(&mut table);
    for output in output_tables(&layout).context("build table catalog")? {
        table.add_row(vec![
            output.name,
            output.unit.to_string(),
            output.columns.join(", "),
            output.partition_by.unwrap_or_else(|| "-".to_string()),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_etl(args: &RunArgs) -> Result<RunResult> {
    let overrides = Overrides {
        config: args.config.clone(),
        source: args.source.clone(),
        destination: args.destination.clone(),
        key_strategy: args.key_strategy.map(Into::into),
        reference_layout: args.reference_layout.clone(),
        only: args.only.iter().copied().map(Unit::from).collect(),
        dry_run: args.dry_run,
        check_integrity: args.check_integrity,
    };
    let config =
        RunConfig::resolve(&overrides, |name| std::env::var(name).ok()).context("configuration")?;
    let skipped = skipped_units(&config);
    if !skipped.is_empty() {
        info!(skipped = ?skipped, "units skipped by --only");
    }
    Ok(run_pipeline(&config))
}
