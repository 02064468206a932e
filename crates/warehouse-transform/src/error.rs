use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("table {table}: source column '{column}' not found")]
    MissingColumn { table: String, column: String },
    #[error("table {table}: column '{column}' already exists")]
    ColumnExists { table: String, column: String },
    #[error("column '{column}' has type {dtype}, expected a numeric day offset")]
    DateColumnType { column: String, dtype: String },
    #[error("table {table}: content-hash id {id} produced by rows {first} and {second}")]
    KeyCollision {
        table: String,
        id: i64,
        first: usize,
        second: usize,
    },
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for TransformError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TransformError>;
