//! Member header records.
//!
//! 1. Member header (carries the NAMESTR length)
//! 2. DSCRPTR header
//! 3. Member data: dataset name
//! 4. Member second: modified datetime, label
//! 5. NAMESTR header (carries the variable count)
//! 6. NAMESTR records
//! 7. OBS header, then observation data

use crate::error::{Result, XptError};
use crate::types::XptDataset;

use super::library::RECORD_LEN;
use super::{build_fixed_header, read_string, write_string};

pub const MEMBER_HEADER_PREFIX: &str = "HEADER RECORD*******MEMBER  HEADER RECORD!!!!!!!";
pub const DSCRPTR_HEADER_PREFIX: &str = "HEADER RECORD*******DSCRPTR HEADER RECORD!!!!!!!";
pub const NAMESTR_HEADER_PREFIX: &str = "HEADER RECORD*******NAMESTR HEADER RECORD!!!!!!!";
pub const OBS_HEADER_PREFIX: &str = "HEADER RECORD*******OBS     HEADER RECORD!!!!!!!";

fn validate_prefix(record: &[u8], prefix: &str, expected: &'static str) -> Result<()> {
    if record.len() < RECORD_LEN {
        return Err(XptError::malformed(format!(
            "{} too short",
            expected.to_lowercase()
        )));
    }
    if !record.starts_with(prefix.as_bytes()) {
        return Err(XptError::missing_header(expected));
    }
    Ok(())
}

pub fn validate_member_header(record: &[u8]) -> Result<()> {
    validate_prefix(record, MEMBER_HEADER_PREFIX, "MEMBER HEADER")
}

pub fn validate_dscrptr_header(record: &[u8]) -> Result<()> {
    validate_prefix(record, DSCRPTR_HEADER_PREFIX, "DSCRPTR HEADER")
}

pub fn validate_namestr_header(record: &[u8]) -> Result<()> {
    validate_prefix(record, NAMESTR_HEADER_PREFIX, "NAMESTR HEADER")
}

pub fn validate_obs_header(record: &[u8]) -> Result<()> {
    validate_prefix(record, OBS_HEADER_PREFIX, "OBS HEADER")
}

/// NAMESTR length at offset 74-77 of the member header: 140, or 136 on VAX/VMS.
pub fn parse_namestr_len(record: &[u8]) -> Result<usize> {
    parse_number(record, 74, 4, "NAMESTR length")
}

/// Variable count at offset 54-57 of the NAMESTR header.
pub fn parse_variable_count(record: &[u8]) -> Result<usize> {
    parse_number(record, 54, 4, "variable count")
}

fn parse_number(record: &[u8], offset: usize, len: usize, field: &str) -> Result<usize> {
    if record.len() < offset + len {
        return Err(XptError::malformed(format!("header too short for {field}")));
    }
    read_string(record, offset, len)
        .trim()
        .parse::<usize>()
        .map_err(|_| XptError::NumericParse {
            field: field.to_string(),
        })
}

/// Dataset name at offset 8-15 of the member data record.
pub fn parse_dataset_name(record: &[u8]) -> Result<String> {
    if record.len() < 16 {
        return Err(XptError::malformed("member data too short"));
    }
    let name = read_string(record, 8, 8);
    if name.is_empty() {
        return Err(XptError::malformed("empty dataset name"));
    }
    Ok(name)
}

/// Dataset label at offset 32-71 of the member second record.
pub fn parse_dataset_label(record: &[u8]) -> Option<String> {
    if record.len() < 72 {
        return None;
    }
    let label = read_string(record, 32, 40);
    if label.is_empty() { None } else { Some(label) }
}

/// Offset rounded up to the next 80-byte boundary.
#[must_use]
pub fn align_to_record(offset: usize) -> usize {
    offset.div_ceil(RECORD_LEN) * RECORD_LEN
}

#[must_use]
pub fn build_member_header(namestr_len: usize) -> [u8; RECORD_LEN] {
    let mut record = build_fixed_header(MEMBER_HEADER_PREFIX);
    write_string(&mut record, 64, "0160", 4);
    write_string(&mut record, 74, &format!("{namestr_len:04}"), 4);
    record
}

#[must_use]
pub fn build_dscrptr_header() -> [u8; RECORD_LEN] {
    build_fixed_header(DSCRPTR_HEADER_PREFIX)
}

#[must_use]
pub fn build_member_data(
    dataset: &XptDataset,
    sas_version: &str,
    os_name: &str,
    created: &str,
) -> [u8; RECORD_LEN] {
    let mut record = [b' '; RECORD_LEN];
    write_string(&mut record, 0, "SAS", 8);
    write_string(&mut record, 8, &dataset.name.to_uppercase(), 8);
    write_string(&mut record, 16, "SASDATA", 8);
    write_string(&mut record, 24, sas_version, 8);
    write_string(&mut record, 32, os_name, 8);
    write_string(&mut record, 64, created, 16);
    record
}

#[must_use]
pub fn build_member_second(dataset: &XptDataset, modified: &str) -> [u8; RECORD_LEN] {
    let mut record = [b' '; RECORD_LEN];
    write_string(&mut record, 0, modified, 16);
    write_string(&mut record, 32, dataset.label.as_deref().unwrap_or(""), 40);
    record
}

#[must_use]
pub fn build_namestr_header(var_count: usize) -> [u8; RECORD_LEN] {
    let mut record = build_fixed_header(NAMESTR_HEADER_PREFIX);
    write_string(&mut record, 54, &format!("{var_count:04}"), 4);
    record
}

#[must_use]
pub fn build_obs_header() -> [u8; RECORD_LEN] {
    build_fixed_header(OBS_HEADER_PREFIX)
}
