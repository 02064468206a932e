//! Error types for source loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading a source.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No file with the expected extension in the source directory.
    #[error("no .{extension} files in {path}")]
    NoSourceFiles { path: PathBuf, extension: String },

    // === Binary Dataset Errors ===
    #[error("failed to read XPT shard {path}: {source}")]
    Xpt {
        path: PathBuf,
        #[source]
        source: warehouse_xpt::XptError,
    },

    /// A shard whose columns differ from the first shard.
    #[error("schema of {path} differs from {reference}: expected [{expected}], found [{found}]")]
    SchemaMismatch {
        path: PathBuf,
        reference: PathBuf,
        expected: String,
        found: String,
    },

    // === Delimited Text Errors ===
    #[error("malformed delimited file {path} at line {line}: {message}")]
    Delimited {
        path: PathBuf,
        line: u64,
        message: String,
    },

    #[error("delimited file {path} has no header row")]
    MissingHeader { path: PathBuf },

    // === Reference File Errors ===
    /// A window reaches past the end of the label file.
    #[error(
        "reference table {table}: window [{start}, {end}) exceeds the {available} lines of the file"
    )]
    WindowOutOfRange {
        table: String,
        start: usize,
        end: usize,
        available: usize,
    },

    /// A line inside a window carries no `=`.
    #[error("reference table {table}: line {line} has no '=' separator: {text:?}")]
    MissingSeparator {
        table: String,
        line: usize,
        text: String,
    },

    // === DataFrame Errors ===
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for loading operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::MissingSeparator {
            table: "dim_country_code".to_string(),
            line: 12,
            text: "bogus".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "reference table dim_country_code: line 12 has no '=' separator: \"bogus\""
        );
    }

    #[test]
    fn test_error_from_polars() {
        let polars_err = polars::prelude::PolarsError::ColumnNotFound("cicid".into());
        let err: IngestError = polars_err.into();
        assert!(matches!(err, IngestError::DataFrame { .. }));
    }
}
