//! Core types for XPT file handling.
//!
//! Datasets, columns, values and the writer options.

mod column;
mod dataset;
mod missing;
mod options;
mod value;

pub use column::{XptColumn, XptType};
pub use dataset::{RowLengthError, XptDataset};
pub use missing::MissingValue;
pub use options::XptWriterOptions;
pub use value::{NumericValue, XptValue};
