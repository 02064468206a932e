use std::path::PathBuf;
use std::time::Duration;

use warehouse_model::Unit;
use warehouse_transform::OrphanReport;

#[derive(Debug)]
pub struct RunResult {
    pub destination: PathBuf,
    pub dry_run: bool,
    pub units: Vec<UnitResult>,
    /// Orphan counts from `--check-integrity`; empty when the check is off
    /// or could not run.
    pub integrity: Vec<OrphanReport>,
}

impl RunResult {
    pub fn has_errors(&self) -> bool {
        self.units.iter().any(|unit| unit.error.is_some())
    }

    pub fn tables(&self) -> impl Iterator<Item = (Unit, &TableSummary)> {
        self.units
            .iter()
            .flat_map(|unit| unit.tables.iter().map(move |table| (unit.unit, table)))
    }
}

#[derive(Debug)]
pub struct UnitResult {
    pub unit: Unit,
    /// Tables written before the unit finished or failed.
    pub tables: Vec<TableSummary>,
    pub error: Option<String>,
    pub duration: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSummary {
    pub name: String,
    pub rows: usize,
    pub partitions: usize,
    pub files: Vec<PathBuf>,
}
