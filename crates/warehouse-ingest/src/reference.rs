//! Code tables from the reference label file.
//!
//! The label file is read once into lines. Each [`CodeTableSpec`] names a
//! half-open window of those lines; every line in it is a `code = label`
//! pair. Codes are unique per table: a repeated code overwrites the earlier
//! label but keeps the position of its first appearance.

use std::collections::HashMap;
use std::path::Path;

use polars::prelude::{DataFrame, IntoColumn, NamedFrom, Series};
use tracing::debug;
use warehouse_model::CodeTableSpec;

use crate::error::{IngestError, Result};

/// Read the label file as lines, decoding invalid UTF-8 lossily.
pub fn read_reference_lines(path: &Path) -> Result<Vec<String>> {
    let bytes = std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;
    let lines: Vec<String> = String::from_utf8_lossy(&bytes)
        .lines()
        .map(str::to_string)
        .collect();
    debug!(path = %path.display(), lines = lines.len(), "read reference file");
    Ok(lines)
}

/// Ordered code-to-label mapping for one table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeTable {
    pub name: String,
    pub label_column: String,
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl CodeTable {
    pub fn new(name: impl Into<String>, label_column: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label_column: label_column.into(),
            ..Self::default()
        }
    }

    /// Insert or overwrite a code. Returns the replaced label, if any.
    pub fn insert(&mut self, code: String, label: String) -> Option<String> {
        if let Some(&pos) = self.index.get(&code) {
            return Some(std::mem::replace(&mut self.entries[pos].1, label));
        }
        self.index.insert(code.clone(), self.entries.len());
        self.entries.push((code, label));
        None
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Two string columns: `code` and the table's label column.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let codes: Vec<&str> = self.entries.iter().map(|(c, _)| c.as_str()).collect();
        let labels: Vec<&str> = self.entries.iter().map(|(_, l)| l.as_str()).collect();
        Ok(DataFrame::new(vec![
            Series::new("code".into(), codes).into_column(),
            Series::new(self.label_column.as_str().into(), labels).into_column(),
        ])?)
    }
}

/// Parse one code table out of the label file lines.
pub fn parse_code_table(lines: &[String], spec: &CodeTableSpec) -> Result<CodeTable> {
    let window = lines
        .get(spec.start_line..spec.end_line)
        .ok_or_else(|| IngestError::WindowOutOfRange {
            table: spec.table_name.clone(),
            start: spec.start_line,
            end: spec.end_line,
            available: lines.len(),
        })?;

    let mut table = CodeTable::new(&spec.table_name, &spec.label_column);
    let mut overwritten = 0usize;
    for (offset, line) in window.iter().enumerate() {
        let Some((code, label)) = line.split_once('=') else {
            return Err(IngestError::MissingSeparator {
                table: spec.table_name.clone(),
                line: spec.start_line + offset,
                text: line.clone(),
            });
        };
        let code = strip_quotes(code, &spec.code_quote_chars);
        let label = strip_quotes(label, &spec.label_quote_chars);
        if table.insert(code.to_string(), label.to_string()).is_some() {
            overwritten += 1;
        }
    }

    debug!(
        table = %spec.table_name,
        codes = table.len(),
        overwritten,
        "parsed code table"
    );
    Ok(table)
}

fn strip_quotes<'a>(value: &'a str, quotes: &str) -> &'a str {
    value.trim().trim_matches(|c: char| quotes.contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    fn label<'a>(table: &'a CodeTable, code: &str) -> Option<&'a str> {
        table.index.get(code).map(|&pos| table.entries[pos].1.as_str())
    }

    #[test]
    fn test_country_line() {
        let mut file = vec![String::new(); 10];
        file.push("   101 =  'AFGHANISTAN'".to_string());
        let spec = CodeTableSpec::new("dim_country_code", "country", 10, 11).strip_label("'");
        let table = parse_code_table(&file, &spec).unwrap();
        assert_eq!(table.entries, [("101".to_string(), "AFGHANISTAN".to_string())]);
    }

    #[test]
    fn test_city_strips_code_and_label() {
        let file = lines("\t'ALC'\t=\t'ALCAN, AK             '");
        let spec = CodeTableSpec::new("dim_city_code", "city", 0, 1)
            .strip_code("'")
            .strip_label("' ");
        let table = parse_code_table(&file, &spec).unwrap();
        assert_eq!(label(&table, "ALC"), Some("ALCAN, AK"));
    }

    #[test]
    fn test_transport_keeps_quotes() {
        let file = lines("\t1 = 'Air'");
        let spec = CodeTableSpec::new("dim_transport", "transport", 0, 1);
        let table = parse_code_table(&file, &spec).unwrap();
        assert_eq!(label(&table, "1"), Some("'Air'"));
    }

    #[test]
    fn test_last_write_wins_keeps_first_position() {
        let file = lines("'AL'='ALABAMA'\n'AK'='ALASKA'\n'AL'='ALABAMA (2)'");
        let spec = CodeTableSpec::new("dim_state_code", "state", 0, 3)
            .strip_code("'")
            .strip_label("'");
        let table = parse_code_table(&file, &spec).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.entries[0].0, "AL");
        assert_eq!(label(&table, "AL"), Some("ALABAMA (2)"));
    }

    #[test]
    fn test_label_keeps_later_equals() {
        let file = lines("5 = 'A=B'");
        let spec = CodeTableSpec::new("t", "label", 0, 1).strip_label("'");
        let table = parse_code_table(&file, &spec).unwrap();
        assert_eq!(label(&table, "5"), Some("A=B"));
    }

    #[test]
    fn test_missing_separator_names_line() {
        let file = lines("1 = 'Air'\n/* comment */");
        let spec = CodeTableSpec::new("dim_transport", "transport", 0, 2);
        let err = parse_code_table(&file, &spec).unwrap_err();
        assert!(matches!(
            err,
            IngestError::MissingSeparator { line: 1, .. }
        ));
    }

    #[test]
    fn test_window_past_end() {
        let file = lines("1 = 'Air'");
        let spec = CodeTableSpec::new("dim_transport", "transport", 0, 3);
        let err = parse_code_table(&file, &spec).unwrap_err();
        assert!(matches!(
            err,
            IngestError::WindowOutOfRange { available: 1, .. }
        ));
    }

    #[test]
    fn test_empty_window_yields_empty_table() {
        let spec = CodeTableSpec::new("t", "label", 0, 0);
        let table = parse_code_table(&[], &spec).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.to_dataframe().unwrap().shape(), (0, 2));
    }

    #[test]
    fn test_lossy_decode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.SAS");
        std::fs::write(&path, b"1 = 'Air'\n2 = 'Se\xffa'\n").unwrap();
        let file = read_reference_lines(&path).unwrap();
        assert_eq!(file.len(), 2);
        assert!(file[1].contains('\u{fffd}'));
    }
}
