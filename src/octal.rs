//! This module contains functions to convert Rust values into the fixed-width ASCII fields of a
//! header block, and back. Numbers are stored as zero-padded octal text, names as null-padded
//! bytes.

use std::str;

use crate::error::{Error, Result};

/// Largest value that fits in the 11 octal digits of a size or mtime field.
pub const MAX_OCTAL_11: u64 = 0o77_777_777_777;

/// Format `value` as octal, left-padded with `0` up to `width` digits. Longer values are never
/// truncated.
pub fn padded_octal(value: u64, width: usize) -> String {
    format!("{:0width$o}", value, width = width)
}

/// Convert a value into a 12 byte numeric field: 11 octal digits followed by a NUL.
pub fn u64_to_field(value: u64, field: &'static str) -> Result<[u8; 12]> {
    if value > MAX_OCTAL_11 {
        return Err(Error::FieldOverflow {
            field,
            value: value.into(),
        });
    }
    let mut buffer = [0u8; 12];
    buffer[..11].copy_from_slice(padded_octal(value, 11).as_bytes());
    Ok(buffer)
}

/// Same as [`u64_to_field`], for signed timestamps. Negative values are rejected.
pub fn i64_to_field(value: i64, field: &'static str) -> Result<[u8; 12]> {
    let unsigned = u64::try_from(value).map_err(|_| Error::FieldOverflow {
        field,
        value: value.into(),
    })?;
    u64_to_field(unsigned, field)
}

/// Parse an octal field leniently: leading spaces are skipped, digits are consumed up to the
/// first non-octal byte, and a field without any digit reads as 0.
pub fn field_to_u64(field: &[u8]) -> u64 {
    field
        .iter()
        .skip_while(|b| **b == b' ')
        .take_while(|b| (b'0'..=b'7').contains(*b))
        .fold(0u64, |acc, b| {
            acc.saturating_mul(8).saturating_add(u64::from(b - b'0'))
        })
}

/// Copy an archive name into the 100 byte name field.
pub fn name_to_field(name: &str) -> Result<[u8; 100]> {
    let bytes = name.as_bytes();
    if bytes.is_empty() {
        return Err(Error::EmptyName);
    }
    if bytes.len() > 100 {
        return Err(Error::NameTooLong(bytes.len()));
    }
    if bytes.contains(&0) {
        return Err(Error::InvalidName(name.to_string()));
    }
    let mut buffer = [0u8; 100];
    buffer[..bytes.len()].copy_from_slice(bytes);
    Ok(buffer)
}

/// Read the name field up to the first NUL. `offset` is only used for error reporting.
pub fn field_to_name(field: &[u8], offset: usize) -> Result<String> {
    let valid_length = field
        .iter()
        .position(|&byte| byte == 0)
        .unwrap_or(field.len());
    str::from_utf8(&field[..valid_length])
        .map(str::to_string)
        .map_err(|_| Error::NameEncoding(offset))
}
