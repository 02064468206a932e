//! In-memory dataset representation.

use std::fmt;

use super::{XptColumn, XptValue};

/// A row did not match the dataset's column count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowLengthError {
    pub expected: usize,
    pub actual: usize,
}

impl fmt::Display for RowLengthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "row has {} values but dataset has {} columns",
            self.actual, self.expected
        )
    }
}

impl std::error::Error for RowLengthError {}

/// One SAS dataset (member) of a transport file.
#[derive(Debug, Clone, PartialEq)]
pub struct XptDataset {
    pub name: String,
    pub label: Option<String>,
    pub columns: Vec<XptColumn>,
    pub rows: Vec<Vec<XptValue>>,
}

impl XptDataset {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_columns(name, Vec::new())
    }

    pub fn with_columns(name: impl Into<String>, columns: Vec<XptColumn>) -> Self {
        Self {
            name: name.into(),
            label: None,
            columns,
            rows: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Append a row, checking it against the column count.
    pub fn add_row(&mut self, row: Vec<XptValue>) -> Result<(), RowLengthError> {
        if row.len() != self.columns.len() {
            return Err(RowLengthError {
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Total byte width of one observation.
    #[must_use]
    pub fn observation_length(&self) -> usize {
        self.columns.iter().map(|col| col.length as usize).sum()
    }
}
