//! Line-window layout of the reference label file.
//!
//! The label file is a hand-written SAS program listing several
//! `code = 'label'` blocks. Each code table is read from a fixed, 0-indexed,
//! half-open window of lines. The windows ship as a versioned default and can
//! be replaced from a JSON file:
//!
//! ```json
//! {
//!   "version": 1,
//!   "tables": [
//!     { "table_name": "dim_transport", "label_column": "transport",
//!       "start_line": 972, "end_line": 976 }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Layout schema version this build understands.
pub const LAYOUT_VERSION: u32 = 1;

/// One code table and the window it is parsed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeTableSpec {
    pub table_name: String,
    pub label_column: String,
    pub start_line: usize,
    /// Exclusive.
    pub end_line: usize,
    /// Characters stripped from both ends of the code after trimming.
    #[serde(default)]
    pub code_quote_chars: String,
    /// Characters stripped from both ends of the label after trimming.
    #[serde(default)]
    pub label_quote_chars: String,
}

impl CodeTableSpec {
    pub fn new(
        table_name: impl Into<String>,
        label_column: impl Into<String>,
        start_line: usize,
        end_line: usize,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            label_column: label_column.into(),
            start_line,
            end_line,
            code_quote_chars: String::new(),
            label_quote_chars: String::new(),
        }
    }

    #[must_use]
    pub fn strip_code(mut self, chars: &str) -> Self {
        self.code_quote_chars = chars.to_string();
        self
    }

    #[must_use]
    pub fn strip_label(mut self, chars: &str) -> Self {
        self.label_quote_chars = chars.to_string();
        self
    }
}

/// All code-table windows of one label file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceLayout {
    pub version: u32,
    pub tables: Vec<CodeTableSpec>,
}

impl Default for ReferenceLayout {
    /// Windows of the label file published with the 2016 I94 data.
    fn default() -> Self {
        Self {
            version: LAYOUT_VERSION,
            tables: vec![
                CodeTableSpec::new("dim_country_code", "country", 10, 298).strip_label("'"),
                CodeTableSpec::new("dim_city_code", "city", 303, 962)
                    .strip_code("'")
                    .strip_label("' "),
                CodeTableSpec::new("dim_state_code", "state", 982, 1036)
                    .strip_code("'")
                    .strip_label("'"),
                CodeTableSpec::new("dim_transport", "transport", 973, 976),
            ],
        }
    }
}

impl ReferenceLayout {
    /// Parse and validate a layout from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let layout: Self = serde_json::from_str(text)?;
        layout.validate()?;
        Ok(layout)
    }

    /// Load and validate a layout file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.version != LAYOUT_VERSION {
            return Err(ModelError::UnsupportedLayoutVersion {
                found: self.version,
                expected: LAYOUT_VERSION,
            });
        }
        let mut seen = HashSet::new();
        for table in &self.tables {
            if table.table_name.trim().is_empty() {
                return Err(ModelError::MissingName {
                    field: "table_name",
                });
            }
            if table.label_column.trim().is_empty() {
                return Err(ModelError::MissingName {
                    field: "label_column",
                });
            }
            if table.start_line > table.end_line {
                return Err(ModelError::InvalidWindow {
                    table: table.table_name.clone(),
                    start: table.start_line,
                    end: table.end_line,
                });
            }
            if !seen.insert(table.table_name.as_str()) {
                return Err(ModelError::DuplicateTable {
                    name: table.table_name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Lines a label file must have to cover every window.
    pub fn required_lines(&self) -> usize {
        self.tables.iter().map(|t| t.end_line).max().unwrap_or(0)
    }
}
