//! Runs the configured units in order and gathers their results.

use std::collections::BTreeMap;
use std::time::Instant;

use tracing::{error, info, info_span, warn};
use warehouse_model::Unit;
use warehouse_output::ParquetSink;
use warehouse_transform::{OrphanReport, SurrogateKeyAssigner, TableFrame, count_orphans};

use crate::config::RunConfig;
use crate::types::{RunResult, UnitResult};
use crate::units::{UnitContext, UnitOutput, run_unit};

/// Fact columns checked against lookup tables: `(fact column, lookup table)`.
/// Lookups are matched on their `code` column.
pub const INTEGRITY_CHECKS: [(&str, &str); 3] = [
    ("state_code", "dim_state_code"),
    ("city_code", "dim_city_code"),
    ("transportation", "dim_transport"),
];

const FACT_TABLE: &str = "fact_immigration";
const LOOKUP_CODE_COLUMN: &str = "code";

/// Run every configured unit. A failing unit is recorded and the next unit
/// still runs; nothing already written is rolled back.
pub fn run_pipeline(config: &RunConfig) -> RunResult {
    let sink = ParquetSink::new(&config.destination).with_dry_run(config.dry_run);
    let keys = SurrogateKeyAssigner::new(config.key_strategy);
    let ctx = UnitContext {
        source: &config.source,
        sink: &sink,
        keys: &keys,
        layout: &config.layout,
    };
    info!(
        source = %config.source.display(),
        destination = %config.destination.display(),
        key_strategy = %config.key_strategy,
        dry_run = config.dry_run,
        units = config.units.len(),
        "run started"
    );

    let mut units = Vec::with_capacity(config.units.len());
    let mut frames: BTreeMap<String, TableFrame> = BTreeMap::new();
    for &unit in &config.units {
        let span = info_span!("unit", unit = %unit);
        let _guard = span.enter();
        let started = Instant::now();
        let mut output = UnitOutput::new(config.check_integrity);
        let outcome = run_unit(unit, &ctx, &mut output);
        let duration = started.elapsed();

        let error = match outcome {
            Ok(()) => {
                info!(
                    tables = output.tables.len(),
                    duration_ms = duration.as_millis() as u64,
                    "unit complete"
                );
                None
            }
            Err(err) => {
                let message = format!("{err:#}");
                error!(error = %message, "unit failed");
                Some(message)
            }
        };
        let tables = std::mem::take(&mut output.tables);
        for frame in output.into_frames() {
            frames.insert(frame.name.clone(), frame);
        }
        units.push(UnitResult {
            unit,
            tables,
            error,
            duration,
        });
    }

    let integrity = if config.check_integrity {
        check_integrity(&frames)
    } else {
        Vec::new()
    };

    RunResult {
        destination: config.destination.clone(),
        dry_run: config.dry_run,
        units,
        integrity,
    }
}

/// Count orphan codes for each fact column whose lookup table was built in
/// this run. Findings are warnings only.
pub fn check_integrity(frames: &BTreeMap<String, TableFrame>) -> Vec<OrphanReport> {
    let span = info_span!("integrity");
    let _guard = span.enter();
    let Some(fact) = frames.get(FACT_TABLE) else {
        warn!(table = FACT_TABLE, "integrity check skipped: fact table not built in this run");
        return Vec::new();
    };

    let mut reports = Vec::new();
    for (fact_column, lookup) in INTEGRITY_CHECKS {
        let Some(dimension) = frames.get(lookup) else {
            warn!(table = lookup, "integrity check skipped: lookup table not built in this run");
            continue;
        };
        match count_orphans(&fact.data, fact_column, lookup, &dimension.data, LOOKUP_CODE_COLUMN) {
            Ok(report) => {
                if !report.is_clean() {
                    warn!(
                        fact_column,
                        lookup,
                        orphan_rows = report.orphan_rows,
                        checked_rows = report.checked_rows,
                        sample = ?report.sample,
                        "fact rows reference unknown codes"
                    );
                }
                reports.push(report);
            }
            Err(err) => warn!(fact_column, lookup, error = %err, "integrity check failed"),
        }
    }
    reports
}

/// Units that are skipped when `only` is set, for logging.
pub fn skipped_units(config: &RunConfig) -> Vec<Unit> {
    Unit::ALL
        .into_iter()
        .filter(|unit| !config.units.contains(unit))
        .collect()
}
