//! Named table frames.

use polars::prelude::DataFrame;

/// A finished warehouse table: its sink name and contents.
#[derive(Debug, Clone)]
pub struct TableFrame {
    /// Table (and sink directory) name, e.g. `dim_person`.
    pub name: String,
    pub data: DataFrame,
    /// Column to split into Hive partitions on write.
    pub partition_by: Option<String>,
}

impl TableFrame {
    pub fn new(name: impl Into<String>, data: DataFrame) -> Self {
        Self {
            name: name.into(),
            data,
            partition_by: None,
        }
    }

    #[must_use]
    pub fn partitioned_by(mut self, column: impl Into<String>) -> Self {
        self.partition_by = Some(column.into());
        self
    }

    pub fn record_count(&self) -> usize {
        self.data.height()
    }
}
