//! Error types for the Parquet sink.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("invalid table name '{name}'")]
    InvalidTableName { name: String },

    #[error("table {table}: partition column '{column}' not found")]
    MissingPartitionColumn { table: String, column: String },

    #[error("failed to clear {path}: {source}")]
    RemoveDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {message}")]
    WriteFile { path: PathBuf, message: String },

    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for OutputError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OutputError>;
