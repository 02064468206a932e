//! Parquet sink.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Instant;

use polars::prelude::{DataFrame, DataType, ParquetWriter};
use tracing::{debug, info};
use warehouse_transform::TableFrame;

use crate::error::{OutputError, Result};
use crate::hive::partition_dir_name;

/// File name of the single data file in each (partition) directory.
pub const PART_FILE_NAME: &str = "part-00000.parquet";

/// What one table write produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReport {
    pub table: String,
    pub rows: usize,
    /// Partition directories; zero for an unpartitioned table.
    pub partitions: usize,
    /// Files written. Empty on a dry run.
    pub files: Vec<PathBuf>,
}

/// Writes tables under a destination root, one directory per table.
#[derive(Debug, Clone)]
pub struct ParquetSink {
    root: PathBuf,
    dry_run: bool,
}

impl ParquetSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            dry_run: false,
        }
    }

    /// Plan writes without touching the filesystem.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn table_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Write a table, replacing any previous output for it.
    pub fn write(&self, table: &TableFrame) -> Result<WriteReport> {
        validate_table_name(&table.name)?;
        let started = Instant::now();

        let parts = match &table.partition_by {
            Some(column) => split_partitions(table, column)?,
            None => {
                let mut single = BTreeMap::new();
                single.insert(None, table.data.clone());
                single
            }
        };
        let partitions = if table.partition_by.is_some() {
            parts.len()
        } else {
            0
        };

        let mut files = Vec::new();
        if !self.dry_run {
            let dir = self.table_dir(&table.name);
            clear_dir(&dir)?;
            for (subdir, mut frame) in parts {
                let target_dir = match subdir {
                    Some(name) => dir.join(name),
                    None => dir.clone(),
                };
                create_dir(&target_dir)?;
                let path = target_dir.join(PART_FILE_NAME);
                write_parquet(&path, &mut frame)?;
                files.push(path);
            }
        }

        info!(
            table = %table.name,
            rows = table.record_count(),
            partitions,
            files = files.len(),
            dry_run = self.dry_run,
            duration_ms = started.elapsed().as_millis() as u64,
            "table written"
        );
        Ok(WriteReport {
            table: table.name.clone(),
            rows: table.record_count(),
            partitions,
            files,
        })
    }
}

fn validate_table_name(name: &str) -> Result<()> {
    let bad = name.trim().is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\']);
    if bad {
        return Err(OutputError::InvalidTableName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Group rows by partition directory, dropping the partition column.
/// Null and empty values share the default partition.
fn split_partitions(
    table: &TableFrame,
    column: &str,
) -> Result<BTreeMap<Option<String>, DataFrame>> {
    if table.data.column(column).is_err() {
        return Err(OutputError::MissingPartitionColumn {
            table: table.name.clone(),
            column: column.to_string(),
        });
    }

    let mut grouped: BTreeMap<Option<String>, DataFrame> = BTreeMap::new();
    if table.data.height() == 0 {
        return Ok(grouped);
    }

    for part in table.data.partition_by_stable([column], true)? {
        let value = part.column(column)?.cast(&DataType::String)?;
        let dir_name = partition_dir_name(column, value.str()?.get(0));
        let data = part.drop(column)?;
        match grouped.get_mut(&Some(dir_name.clone())) {
            Some(existing) => {
                existing.vstack_mut(&data)?;
            }
            None => {
                grouped.insert(Some(dir_name), data);
            }
        }
    }
    Ok(grouped)
}

fn clear_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        debug!(path = %dir.display(), "removing previous output");
        fs::remove_dir_all(dir).map_err(|source| OutputError::RemoveDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    create_dir(dir)
}

fn create_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|source| OutputError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

fn write_parquet(path: &Path, frame: &mut DataFrame) -> Result<()> {
    let file = File::create(path).map_err(|e| OutputError::WriteFile {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    ParquetWriter::new(file)
        .finish(frame)
        .map_err(|e| OutputError::WriteFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    Ok(())
}
