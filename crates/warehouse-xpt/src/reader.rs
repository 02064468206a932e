//! Transport file reader.
//!
//! The whole file is buffered, then walked record by record with a
//! [`Cursor`]. Only the first member is decoded; the raw I94 shards hold one
//! dataset each.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use crate::error::{Result, XptError};
use crate::float::{ibm_to_ieee, is_missing};
use crate::header::{
    RECORD_LEN, parse_dataset_label, parse_dataset_name, parse_namestr_len,
    parse_namestr_records, parse_variable_count, validate_dscrptr_header,
    validate_library_header, validate_member_header, validate_namestr_header,
    validate_obs_header,
};
use crate::types::{MissingValue, NumericValue, XptColumn, XptDataset, XptType, XptValue};

/// Header records before the first member: library, real, modified.
const LIBRARY_RECORDS: usize = 3;
/// Smallest well-formed file: library block, member block, NAMESTR and OBS
/// headers.
const MIN_RECORDS: usize = 8;

/// Character values come back without their blank padding.
pub struct XptReader<R: Read> {
    source: R,
}

impl<R: Read> XptReader<R> {
    pub fn new(source: R) -> Self {
        Self { source }
    }

    pub fn read_dataset(mut self) -> Result<XptDataset> {
        let mut bytes = Vec::new();
        self.source.read_to_end(&mut bytes)?;
        decode_file(&bytes)
    }
}

impl XptReader<File> {
    pub fn open(path: &Path) -> Result<Self> {
        match File::open(path) {
            Ok(file) => Ok(Self::new(file)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(XptError::FileNotFound {
                path: path.to_path_buf(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}

pub fn read_xpt(path: &Path) -> Result<XptDataset> {
    XptReader::open(path)?.read_dataset()
}

/// Position in a buffered transport file.
struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .ok_or(XptError::ObservationOverflow)?;
        let slice = self
            .bytes
            .get(self.pos..end)
            .ok_or(XptError::RecordOutOfBounds { offset: self.pos })?;
        self.pos = end;
        Ok(slice)
    }

    fn record(&mut self) -> Result<&'a [u8]> {
        self.take(RECORD_LEN)
    }

    fn skip_records(&mut self, count: usize) -> Result<()> {
        self.take(RECORD_LEN * count).map(|_| ())
    }

    /// Advance to the next record boundary.
    fn align(&mut self) {
        let rem = self.pos % RECORD_LEN;
        if rem != 0 {
            self.pos = (self.pos + RECORD_LEN - rem).min(self.bytes.len());
        }
    }

    fn rest(&self) -> &'a [u8] {
        self.bytes.get(self.pos..).unwrap_or_default()
    }
}

fn decode_file(bytes: &[u8]) -> Result<XptDataset> {
    if bytes.len() < RECORD_LEN * MIN_RECORDS {
        return Err(XptError::malformed(format!(
            "{} bytes is shorter than the fixed headers",
            bytes.len()
        )));
    }
    if !bytes.len().is_multiple_of(RECORD_LEN) {
        return Err(XptError::malformed(format!(
            "length {} is not a whole number of 80-byte records",
            bytes.len()
        )));
    }

    let mut cursor = Cursor::new(bytes);
    validate_library_header(cursor.record()?)?;
    cursor.skip_records(LIBRARY_RECORDS - 1)?;

    let member = cursor.record()?;
    validate_member_header(member)?;
    let namestr_len = parse_namestr_len(member)?;
    validate_dscrptr_header(cursor.record()?)?;
    let name = parse_dataset_name(cursor.record()?)?;
    let label = parse_dataset_label(cursor.record()?);

    let namestr_header = cursor.record()?;
    validate_namestr_header(namestr_header)?;
    let var_count = parse_variable_count(namestr_header)?;
    let descriptors_len = var_count
        .checked_mul(namestr_len)
        .ok_or(XptError::ObservationOverflow)?;
    let columns = parse_namestr_records(cursor.take(descriptors_len)?, var_count, namestr_len)?;
    cursor.align();

    validate_obs_header(cursor.record()?)?;
    let rows = decode_observations(cursor.rest(), &columns)?;

    Ok(XptDataset {
        name,
        label,
        columns,
        rows,
    })
}

fn row_width(columns: &[XptColumn]) -> Result<usize> {
    columns.iter().try_fold(0usize, |width, column| {
        width
            .checked_add(usize::from(column.length))
            .ok_or(XptError::ObservationOverflow)
    })
}

/// Split the observation area into rows. The area is blank-padded to a
/// record boundary, and when a row is narrower than a record the padding can
/// look like whole blank rows. Trailing blank rows are dropped only while the
/// total padding stays under one record; anything longer is data.
fn decode_observations(area: &[u8], columns: &[XptColumn]) -> Result<Vec<Vec<XptValue>>> {
    let width = row_width(columns)?;
    if width == 0 {
        return Ok(Vec::new());
    }

    let is_blank = |bytes: &[u8]| bytes.iter().all(|&b| b == b' ');
    let full_rows = area.len() / width;
    let mut padding = area.len() - full_rows * width;
    if !is_blank(&area[full_rows * width..]) {
        return Err(XptError::TrailingBytes);
    }

    let mut rows: Vec<&[u8]> = area.chunks_exact(width).collect();
    while padding + width < RECORD_LEN && rows.last().is_some_and(|row| is_blank(row)) {
        rows.pop();
        padding += width;
    }

    Ok(rows
        .into_iter()
        .map(|row| decode_row(row, columns))
        .collect())
}

fn decode_row(row: &[u8], columns: &[XptColumn]) -> Vec<XptValue> {
    let mut rest = row;
    let mut values = Vec::with_capacity(columns.len());
    for column in columns {
        let (field, tail) = rest.split_at(usize::from(column.length));
        rest = tail;
        values.push(match column.data_type {
            XptType::Char => XptValue::Char(decode_char(field)),
            XptType::Num => XptValue::Num(decode_numeric(field)),
        });
    }
    values
}

fn decode_char(field: &[u8]) -> String {
    String::from_utf8_lossy(field).trim_end().to_string()
}

/// Numeric fields may be stored in 3-8 bytes; short fields are the leading
/// bytes of the IBM double.
fn decode_numeric(field: &[u8]) -> NumericValue {
    if field.is_empty() {
        return NumericValue::Missing(MissingValue::Standard);
    }
    if let Some(missing) = is_missing(field) {
        return NumericValue::Missing(missing);
    }
    let mut ibm = [0u8; 8];
    let len = field.len().min(ibm.len());
    ibm[..len].copy_from_slice(&field[..len]);
    NumericValue::Value(ibm_to_ieee(ibm))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_padding_is_trimmed() {
        assert_eq!(decode_char(b"CA  "), "CA");
        assert_eq!(decode_char(b"  CA"), "  CA");
        assert_eq!(decode_char(b""), "");
    }

    #[test]
    fn missing_codes_decode() {
        let dot = decode_numeric(&[b'.', 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(dot.missing_type(), Some(MissingValue::Standard));
        let special = decode_numeric(&[b'A', 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(special.missing_type(), Some(MissingValue::Special('A')));
    }

    #[test]
    fn short_numeric_field_decodes() {
        assert_eq!(decode_numeric(&[0x41, 0x10, 0x00]).value(), Some(1.0));
    }

    #[test]
    fn row_width_sums_lengths() {
        let columns = [XptColumn::numeric("CICID"), XptColumn::character("VISATYPE", 3)];
        assert_eq!(row_width(&columns).unwrap(), 11);
    }

    #[test]
    fn short_input_is_malformed() {
        let err = decode_file(&[b' '; 80]).unwrap_err();
        assert!(matches!(err, XptError::Malformed { .. }));
    }

    #[test]
    fn blank_padding_rows_are_dropped() {
        let columns = [XptColumn::character("A", 3)];
        let mut area = vec![b' '; 80];
        area[..6].copy_from_slice(b"abcdef");
        let rows = decode_observations(&area, &columns).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][0].as_str(), Some("def"));
    }

    #[test]
    fn blank_rows_beyond_one_record_are_data() {
        // 27 rows of 3 bytes need 81 bytes, padded to two records.
        let columns = [XptColumn::character("A", 3)];
        let mut area = vec![b' '; 160];
        area[..3].copy_from_slice(b"abc");
        let rows = decode_observations(&area, &columns).unwrap();
        assert_eq!(rows.len(), 27);
        assert_eq!(rows[0][0].as_str(), Some("abc"));
        assert_eq!(rows[26][0].as_str(), Some(""));
    }

    #[test]
    fn all_missing_character_rows_survive() {
        let columns = [XptColumn::character("A", 40)];
        let area = vec![b' '; 160];
        let rows = decode_observations(&area, &columns).unwrap();
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn non_blank_tail_is_rejected() {
        let columns = [XptColumn::character("A", 3)];
        let mut area = vec![b' '; 80];
        area[..6].copy_from_slice(b"abcdef");
        area[79] = b'X';
        let err = decode_observations(&area, &columns).unwrap_err();
        assert!(matches!(err, XptError::TrailingBytes));
    }

    #[test]
    fn cursor_reports_overrun_offset() {
        let bytes = [b' '; 100];
        let mut cursor = Cursor::new(&bytes);
        cursor.record().unwrap();
        assert!(matches!(
            cursor.record(),
            Err(XptError::RecordOutOfBounds { offset: 80 })
        ));
    }
}
