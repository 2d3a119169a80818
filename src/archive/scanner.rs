//! Locating headers inside an archive buffer.

use crate::entry::EntryType;
use crate::error::{Error, Result};
use crate::header::{HeaderBlock, HEADER_SIZE, MAGIC_OFFSET};
use crate::options::ScanMode;
use crate::padding::padded_len;

/// Start offsets of every header in `archive`, in archive order. `total_size` bounds the scan;
/// without it (or when it exceeds the buffer) the whole buffer is scanned.
pub fn find_header_offsets(
    archive: &[u8],
    total_size: Option<u64>,
    mode: ScanMode,
) -> Result<Vec<usize>> {
    let limit = scan_limit(archive.len(), total_size);
    let offsets = match mode {
        ScanMode::Walk => walk(archive, limit)?,
        ScanMode::Magic => magic_scan(archive, limit),
    };
    log::debug!("Found {} headers ({:?} scan)", offsets.len(), mode);
    Ok(offsets)
}

fn scan_limit(len: usize, total_size: Option<u64>) -> usize {
    match total_size.map(usize::try_from) {
        Some(Ok(size)) if size <= len => size,
        Some(_) => {
            log::warn!(
                "Given archive size {:?} exceeds the {} bytes available; scanning all of them",
                total_size,
                len
            );
            len
        }
        None => len,
    }
}

/// Decode each header and jump over its data. An all-zero block ends the archive.
fn walk(archive: &[u8], limit: usize) -> Result<Vec<usize>> {
    let mut offsets = Vec::new();
    let mut offset = 0;
    while offset + HEADER_SIZE <= limit {
        let header = HeaderBlock::read(archive, offset)?;
        if header.is_zero() {
            log::trace!("End of archive marker at offset {}", offset);
            break;
        }
        if !header.has_magic() {
            return Err(Error::MissingMagic(offset));
        }
        let descriptor = header.decode(offset)?;
        offsets.push(offset);

        let data_len = match descriptor.entry_type {
            EntryType::Directory => 0,
            EntryType::Regular => {
                let size = usize::try_from(descriptor.size).map_err(|_| Error::TruncatedData {
                    name: descriptor.archive_name.clone(),
                    offset,
                    size: descriptor.size,
                })?;
                padded_len(size)
            }
        };
        offset = match offset.checked_add(HEADER_SIZE + data_len) {
            Some(next) => next,
            None => break,
        };
    }
    Ok(offsets)
}

/// Brute force search for the magic at every position from 257 up to `limit`. A six byte
/// window, cut at its first NUL, must read `ustar` or `ustar `.
fn magic_scan(archive: &[u8], limit: usize) -> Vec<usize> {
    let mut offsets = Vec::new();
    for position in MAGIC_OFFSET..=limit {
        if position >= archive.len() {
            break;
        }
        let window = &archive[position..archive.len().min(position + 6)];
        let text = match window.iter().position(|b| *b == 0) {
            Some(nul) => &window[..nul],
            None => window,
        };
        if text == b"ustar" || text == b"ustar " {
            offsets.push((position + 249) - 506);
        }
    }
    offsets
}
