//! Library header records.
//!
//! 1. Fixed header: `HEADER RECORD*******LIBRARY HEADER RECORD!!!!!!!...`
//! 2. Real header: SAS symbols, version, OS, created datetime
//! 3. Second header: modified datetime

use crate::error::{Result, XptError};

use super::{build_fixed_header, write_string};

/// Record length in bytes.
pub const RECORD_LEN: usize = 80;

pub const LIBRARY_HEADER_PREFIX: &str = "HEADER RECORD*******LIBRARY HEADER RECORD!!!!!!!";

/// Validate that a record starts with the library header prefix.
pub fn validate_library_header(record: &[u8]) -> Result<()> {
    if record.len() < RECORD_LEN {
        return Err(XptError::malformed("record too short"));
    }
    if !record.starts_with(LIBRARY_HEADER_PREFIX.as_bytes()) {
        return Err(XptError::missing_header("LIBRARY HEADER"));
    }
    Ok(())
}

#[must_use]
pub fn build_library_header() -> [u8; RECORD_LEN] {
    build_fixed_header(LIBRARY_HEADER_PREFIX)
}

/// Build the real header record.
///
/// | Offset | Length | Field    |
/// |--------|--------|----------|
/// | 0      | 8      | "SAS"    |
/// | 8      | 8      | "SAS"    |
/// | 16     | 8      | "SASLIB" |
/// | 24     | 8      | version  |
/// | 32     | 8      | OS       |
/// | 64     | 16     | created  |
#[must_use]
pub fn build_real_header(sas_version: &str, os_name: &str, created: &str) -> [u8; RECORD_LEN] {
    let mut record = [b' '; RECORD_LEN];
    write_string(&mut record, 0, "SAS", 8);
    write_string(&mut record, 8, "SAS", 8);
    write_string(&mut record, 16, "SASLIB", 8);
    write_string(&mut record, 24, sas_version, 8);
    write_string(&mut record, 32, os_name, 8);
    write_string(&mut record, 64, created, 16);
    record
}

#[must_use]
pub fn build_second_header(modified: &str) -> [u8; RECORD_LEN] {
    let mut record = [b' '; RECORD_LEN];
    write_string(&mut record, 0, modified, 16);
    record
}
