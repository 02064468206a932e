//! XPT file writer.
//!
//! Used to build shard fixtures.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{Result, XptError};
use crate::float::{encode_missing, ieee_to_ibm, truncate_ibm};
use crate::header::{
    NAMESTR_LEN, RECORD_LEN, build_dscrptr_header, build_library_header, build_member_data,
    build_member_header, build_member_second, build_namestr, build_namestr_header,
    build_obs_header, build_real_header, build_second_header,
};
use crate::types::{
    MissingValue, NumericValue, XptColumn, XptDataset, XptType, XptValue, XptWriterOptions,
};

/// Writes one dataset as a SAS Transport V5 file.
pub struct XptWriter<W: Write> {
    writer: BufWriter<W>,
    options: XptWriterOptions,
}

impl<W: Write> XptWriter<W> {
    pub fn new(writer: W) -> Self {
        Self::with_options(writer, XptWriterOptions::default())
    }

    pub fn with_options(writer: W, options: XptWriterOptions) -> Self {
        Self {
            writer: BufWriter::new(writer),
            options,
        }
    }

    pub fn write_dataset(mut self, dataset: &XptDataset) -> Result<()> {
        validate_dataset(dataset)?;

        let stamp = self.options.header_timestamp();
        let version = self.options.sas_version.clone();
        let os_name = self.options.os_name.clone();

        self.writer.write_all(&build_library_header())?;
        self.writer
            .write_all(&build_real_header(&version, &os_name, &stamp))?;
        self.writer.write_all(&build_second_header(&stamp))?;

        self.writer.write_all(&build_member_header(NAMESTR_LEN))?;
        self.writer.write_all(&build_dscrptr_header())?;
        self.writer
            .write_all(&build_member_data(dataset, &version, &os_name, &stamp))?;
        self.writer
            .write_all(&build_member_second(dataset, &stamp))?;

        self.writer
            .write_all(&build_namestr_header(dataset.columns.len()))?;
        self.write_namestr_records(&dataset.columns)?;

        self.writer.write_all(&build_obs_header())?;
        self.write_observations(dataset)?;

        self.writer.flush()?;
        Ok(())
    }

    fn write_namestr_records(&mut self, columns: &[XptColumn]) -> Result<()> {
        let mut records = RecordWriter::new(&mut self.writer);
        let mut position = 0u32;
        for (idx, column) in columns.iter().enumerate() {
            records.write_bytes(&build_namestr(column, (idx + 1) as u16, position))?;
            position = position.saturating_add(u32::from(column.length));
        }
        records.finish()
    }

    fn write_observations(&mut self, dataset: &XptDataset) -> Result<()> {
        let obs_len = dataset.observation_length();
        let default_missing = self.options.default_missing;
        let mut records = RecordWriter::new(&mut self.writer);

        for row in &dataset.rows {
            let mut obs = vec![b' '; obs_len];
            let mut pos = 0usize;
            for (value, column) in row.iter().zip(&dataset.columns) {
                let bytes = encode_value(value, column, default_missing);
                obs[pos..pos + bytes.len()].copy_from_slice(&bytes);
                pos += column.length as usize;
            }
            records.write_bytes(&obs)?;
        }

        records.finish()
    }
}

impl XptWriter<File> {
    pub fn create(path: &Path) -> Result<Self> {
        Ok(Self::new(File::create(path)?))
    }
}

/// Write a dataset to an XPT file.
pub fn write_xpt(path: &Path, dataset: &XptDataset) -> Result<()> {
    XptWriter::create(path)?.write_dataset(dataset)
}

fn validate_dataset(dataset: &XptDataset) -> Result<()> {
    let name = normalize_name(&dataset.name);
    if name.is_empty() || name.len() > 8 {
        return Err(XptError::invalid_dataset_name(&dataset.name));
    }

    let mut seen = BTreeSet::new();
    for column in &dataset.columns {
        let col_name = normalize_name(&column.name);
        if col_name.is_empty() || col_name.len() > 8 {
            return Err(XptError::invalid_variable_name(&column.name));
        }
        if !seen.insert(col_name) {
            return Err(XptError::duplicate_variable(&column.name));
        }
        if column.length == 0 {
            return Err(XptError::zero_length(&column.name));
        }
    }

    if let Some(row) = dataset
        .rows
        .iter()
        .find(|row| row.len() != dataset.columns.len())
    {
        return Err(XptError::RowLengthMismatch {
            expected: dataset.columns.len(),
            actual: row.len(),
        });
    }
    Ok(())
}

fn normalize_name(name: &str) -> String {
    name.trim().to_uppercase()
}

fn encode_value(
    value: &XptValue,
    column: &XptColumn,
    default_missing: MissingValue,
) -> Vec<u8> {
    match (value, column.data_type) {
        (XptValue::Char(s), XptType::Char) => encode_char(s, column.length),
        (XptValue::Num(n), XptType::Num) => encode_numeric(n, column.length, default_missing),
        (XptValue::Char(s), XptType::Num) => {
            let num = s
                .trim()
                .parse::<f64>()
                .map_or(NumericValue::Missing(default_missing), NumericValue::Value);
            encode_numeric(&num, column.length, default_missing)
        }
        (XptValue::Num(n), XptType::Char) => {
            let text = n.value().map(|v| v.to_string()).unwrap_or_default();
            encode_char(&text, column.length)
        }
    }
}

fn encode_char(value: &str, length: u16) -> Vec<u8> {
    let len = length as usize;
    let mut out: Vec<u8> = value
        .chars()
        .take(len)
        .map(|ch| if ch.is_ascii() { ch as u8 } else { b'?' })
        .collect();
    out.resize(len, b' ');
    out
}

fn encode_numeric(
    value: &NumericValue,
    length: u16,
    default_missing: MissingValue,
) -> Vec<u8> {
    let bytes = match value {
        NumericValue::Missing(m) => encode_missing(*m),
        NumericValue::Value(v) if v.is_finite() => ieee_to_ibm(*v),
        NumericValue::Value(_) => encode_missing(default_missing),
    };
    truncate_ibm(bytes, length as usize)
}

/// Packs byte runs into blank-padded 80-byte records.
struct RecordWriter<'a, W: Write> {
    writer: &'a mut W,
    record: [u8; RECORD_LEN],
    pos: usize,
}

impl<'a, W: Write> RecordWriter<'a, W> {
    fn new(writer: &'a mut W) -> Self {
        Self {
            writer,
            record: [b' '; RECORD_LEN],
            pos: 0,
        }
    }

    fn write_bytes(&mut self, mut bytes: &[u8]) -> Result<()> {
        while !bytes.is_empty() {
            let take = (RECORD_LEN - self.pos).min(bytes.len());
            self.record[self.pos..self.pos + take].copy_from_slice(&bytes[..take]);
            self.pos += take;
            bytes = &bytes[take..];

            if self.pos == RECORD_LEN {
                self.writer.write_all(&self.record)?;
                self.record = [b' '; RECORD_LEN];
                self.pos = 0;
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if self.pos > 0 {
            self.record[self.pos..].fill(b' ');
            self.writer.write_all(&self.record)?;
            self.pos = 0;
        }
        Ok(())
    }
}
