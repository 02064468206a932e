use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("table {table}: {sources} source columns but {targets} target names")]
    ProjectionLength {
        table: String,
        sources: usize,
        targets: usize,
    },
    #[error("reference table {table}: window [{start}, {end}) ends before it starts")]
    InvalidWindow {
        table: String,
        start: usize,
        end: usize,
    },
    #[error("reference layout lists table {name} more than once")]
    DuplicateTable { name: String },
    #[error("reference layout has an entry without a {field}")]
    MissingName { field: &'static str },
    #[error("unsupported reference layout version {found} (expected {expected})")]
    UnsupportedLayoutVersion { found: u32, expected: u32 },
    #[error("unknown key strategy '{0}' (expected monotonic or content-hash)")]
    UnknownKeyStrategy(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid layout JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ModelError>;
