//! Statistical records to the fact, person and airline tables.

use anyhow::{Context, Result};
use tracing::info;
use warehouse_ingest::load_xpt_shards;
use warehouse_model::{airline_dimension, fact_immigration, person_dimension};

use super::{UnitContext, UnitOutput, build_table};

/// Shard directory under the source root.
pub const IMMIGRATION_DIR: &str = "immigration/18-83510-I94-Data-2016";

pub(super) fn run(ctx: &UnitContext<'_>, out: &mut UnitOutput) -> Result<()> {
    let specs = [fact_immigration()?, person_dimension()?, airline_dimension()?];

    let dir = ctx.source.join(IMMIGRATION_DIR);
    let raw = load_xpt_shards(&dir)
        .with_context(|| format!("load immigration records from {}", dir.display()))?;
    info!(rows = raw.height(), columns = raw.width(), "immigration records loaded");

    for spec in &specs {
        let frame = build_table(spec, &raw, ctx.keys)?;
        out.write(ctx.sink, frame)?;
    }
    Ok(())
}
