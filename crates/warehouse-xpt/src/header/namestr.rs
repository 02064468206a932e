//! NAMESTR records: one per variable, 140 bytes (136 on VAX/VMS).
//!
//! | Offset | Field  | Type     | Description                    |
//! |--------|--------|----------|--------------------------------|
//! | 0-1    | ntype  | short    | 1=NUMERIC, 2=CHAR              |
//! | 4-5    | nlng   | short    | Variable length in observation |
//! | 6-7    | nvar0  | short    | Variable number                |
//! | 8-15   | nname  | char[8]  | Variable name                  |
//! | 16-55  | nlabel | char[40] | Variable label                 |
//! | 84-87  | npos   | long     | Position in observation        |

use crate::error::{Result, XptError};
use crate::types::{XptColumn, XptType};

use super::{read_string, write_string};

/// Standard NAMESTR length.
pub const NAMESTR_LEN: usize = 140;

/// Parse a single NAMESTR record.
pub fn parse_namestr(data: &[u8], index: usize) -> Result<XptColumn> {
    if data.len() < 88 {
        return Err(XptError::InvalidNamestr {
            index,
            message: format!("data too short: {} bytes", data.len()),
        });
    }

    let ntype = read_i16(data, 0);
    let data_type = XptType::from_ntype(ntype).ok_or_else(|| XptError::InvalidNamestr {
        index,
        message: format!("invalid ntype: {ntype}"),
    })?;

    let length = read_i16(data, 4);
    if length <= 0 {
        return Err(XptError::InvalidNamestr {
            index,
            message: format!("invalid variable length: {length}"),
        });
    }

    let name = read_string(data, 8, 8);
    if name.is_empty() {
        return Err(XptError::InvalidNamestr {
            index,
            message: "empty variable name".to_string(),
        });
    }

    let label = read_string(data, 16, 40);

    Ok(XptColumn {
        name,
        label: if label.is_empty() { None } else { Some(label) },
        data_type,
        length: length as u16,
    })
}

/// Parse `var_count` consecutive NAMESTR records.
pub fn parse_namestr_records(
    data: &[u8],
    var_count: usize,
    namestr_len: usize,
) -> Result<Vec<XptColumn>> {
    let mut columns = Vec::with_capacity(var_count);
    for idx in 0..var_count {
        let offset = idx
            .checked_mul(namestr_len)
            .ok_or(XptError::ObservationOverflow)?;
        let record =
            data.get(offset..offset + namestr_len)
                .ok_or_else(|| XptError::InvalidNamestr {
                    index: idx,
                    message: "NAMESTR data out of bounds".to_string(),
                })?;
        columns.push(parse_namestr(record, idx)?);
    }
    Ok(columns)
}

/// Build a 140-byte NAMESTR record.
#[must_use]
pub fn build_namestr(column: &XptColumn, varnum: u16, position: u32) -> [u8; NAMESTR_LEN] {
    let mut buf = [0u8; NAMESTR_LEN];
    write_i16(&mut buf, 0, column.data_type.to_ntype());
    write_i16(&mut buf, 4, column.length as i16);
    write_i16(&mut buf, 6, varnum as i16);

    buf[8..16].fill(b' ');
    write_string(&mut buf, 8, &column.name.to_uppercase(), 8);

    buf[16..56].fill(b' ');
    write_string(&mut buf, 16, column.label.as_deref().unwrap_or(""), 40);

    // nform and niform stay blank
    buf[56..64].fill(b' ');
    buf[72..80].fill(b' ');

    buf[84..88].copy_from_slice(&(position as i32).to_be_bytes());
    buf
}

fn read_i16(data: &[u8], offset: usize) -> i16 {
    i16::from_be_bytes([data[offset], data[offset + 1]])
}

fn write_i16(buf: &mut [u8], offset: usize, value: i16) {
    buf[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
}
