//! City demographics to `dim_city_demo`.

use anyhow::{Context, Result};
use tracing::info;
use warehouse_ingest::read_delimited_table;
use warehouse_model::city_demographics;

use super::{UnitContext, UnitOutput, build_table};

pub const DEMOGRAPHICS_FILE: &str = "us-cities-demographics.csv";
pub const DEMOGRAPHICS_DELIMITER: u8 = b';';

pub(super) fn run(ctx: &UnitContext<'_>, out: &mut UnitOutput) -> Result<()> {
    let spec = city_demographics()?;

    let path = ctx.source.join(DEMOGRAPHICS_FILE);
    let raw = read_delimited_table(&path, DEMOGRAPHICS_DELIMITER)
        .with_context(|| format!("load demographics from {}", path.display()))?;
    info!(rows = raw.height(), "demographics loaded");

    let frame = build_table(&spec, &raw, ctx.keys)?;
    out.write(ctx.sink, frame)
}
