use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum XptError {
    #[error("{path} does not exist")]
    FileNotFound { path: PathBuf },

    /// Bytes that do not follow the V5 transport layout.
    #[error("malformed transport file: {message}")]
    Malformed { message: String },

    #[error("expected {expected} record")]
    MissingHeader { expected: &'static str },

    #[error("variable descriptor {index}: {message}")]
    InvalidNamestr { index: usize, message: String },

    #[error("dataset name '{name}' must be 1-8 characters")]
    InvalidDatasetName { name: String },

    #[error("variable name '{name}' must be 1-8 characters")]
    InvalidVariableName { name: String },

    #[error("variable {name} appears twice")]
    DuplicateVariable { name: String },

    #[error("row has {actual} values but the dataset has {expected} variables")]
    RowLengthMismatch { expected: usize, actual: usize },

    #[error("variable {name} has length 0")]
    ZeroLength { name: String },

    #[error("observation at byte {offset} runs past the end of the file")]
    RecordOutOfBounds { offset: usize },

    #[error("header field {field} is not a number")]
    NumericParse { field: String },

    #[error("observation length overflows")]
    ObservationOverflow,

    /// Observation area ends in a partial, non-blank record.
    #[error("observation area ends with a partial record")]
    TrailingBytes,

    #[cfg(feature = "polars")]
    #[error(transparent)]
    Polars(#[from] polars::prelude::PolarsError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, XptError>;

impl XptError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    pub fn missing_header(expected: &'static str) -> Self {
        Self::MissingHeader { expected }
    }

    pub fn invalid_dataset_name(name: impl Into<String>) -> Self {
        Self::InvalidDatasetName { name: name.into() }
    }

    pub fn invalid_variable_name(name: impl Into<String>) -> Self {
        Self::InvalidVariableName { name: name.into() }
    }

    pub fn duplicate_variable(name: impl Into<String>) -> Self {
        Self::DuplicateVariable { name: name.into() }
    }

    pub fn zero_length(name: impl Into<String>) -> Self {
        Self::ZeroLength { name: name.into() }
    }
}
