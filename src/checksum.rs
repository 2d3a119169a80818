//! Header checksums.
//!
//! The checksum is the sum of every byte of the header as it stands when the checksum runs, with
//! the checksum field still holding its `"000000\0 "` placeholder, minus 64. The placeholder sums
//! to 320, so the result equals the classic tar sum with the field read as eight spaces (256).
//! The value is stored as six octal digits at offset 148.

use crate::entry::EntryType;
use crate::error::{Error, Result};
use crate::octal::{field_to_u64, padded_octal};

/// Subtracted from the raw byte sum.
pub const CORRECTION: u32 = 64;

pub const CHECKSUM_OFFSET: usize = 148;
pub const CHECKSUM_WIDTH: usize = 8;

/// Byte forced to `'0'` in directory headers once the checksum is written.
pub const DIRECTORY_PATCH_OFFSET: usize = 130;

/// Most the patch can take off the byte sum: an octal `'7'` replaced by `'0'`.
const MAX_PATCH_DELTA: u32 = (b'7' - b'0') as u32;

fn byte_sum(header: &[u8]) -> u32 {
    header.iter().map(|b| u32::from(*b)).sum()
}

/// Checksum of the header bytes as currently populated.
pub fn compute(header: &[u8; 512]) -> String {
    padded_octal(u64::from(byte_sum(header).saturating_sub(CORRECTION)), 6)
}

/// Store `checksum` at the checksum offset. The NUL and space after the digits are left alone.
pub fn write(header: &mut [u8; 512], checksum: &str) {
    let digits = checksum.as_bytes();
    header[CHECKSUM_OFFSET..CHECKSUM_OFFSET + digits.len()].copy_from_slice(digits);
}

/// Post-checksum correction for directory entries: byte 130 becomes `'0'` and, with
/// `posix_adjust`, the stored checksum is decremented by one.
pub fn patch_directory(header: &mut [u8; 512], checksum: &str, posix_adjust: bool) {
    header[DIRECTORY_PATCH_OFFSET] = b'0';
    if posix_adjust {
        let value = field_to_u64(checksum.as_bytes()).saturating_sub(1);
        write(header, &padded_octal(value, 6));
    }
}

/// The checksum a header should carry, recomputed with the checksum field read as spaces.
pub fn expected(header: &[u8; 512]) -> u32 {
    let field = CHECKSUM_OFFSET..CHECKSUM_OFFSET + CHECKSUM_WIDTH;
    byte_sum(&header[..field.start]) + byte_sum(&header[field.end..]) + 8 * u32::from(b' ')
}

/// Compare the stored checksum against a recomputed one.
///
/// Directory headers are summed before byte 130 is forced to `'0'`, so the digit that stood
/// there (at most `'7'`) may be missing from the recomputed sum. They may also carry the
/// POSIX-adjusted value, one below the sum.
pub fn verify(header: &[u8; 512], entry_type: EntryType, offset: usize) -> Result<()> {
    let field = &header[CHECKSUM_OFFSET..CHECKSUM_OFFSET + CHECKSUM_WIDTH];
    // parsed values are bounded by 8 octal digits
    let stored = field_to_u64(field) as u32;
    let calculated = expected(header);
    let patched = entry_type == EntryType::Directory
        && header[DIRECTORY_PATCH_OFFSET] == b'0'
        && (0..=MAX_PATCH_DELTA)
            .any(|delta| stored == calculated + delta || stored + 1 == calculated + delta);
    if stored == calculated || patched {
        Ok(())
    } else {
        log::warn!(
            "Checksum mismatch at offset {}: stored {:o}, calculated {:o}",
            offset,
            stored,
            calculated
        );
        Err(Error::ChecksumMismatch {
            offset,
            stored,
            calculated,
        })
    }
}
