//! The 512 byte header record.

/*
 * Layout of a header block -
 *
 * +-----------+--------+-------+-------------------------------------------------+
 * | Field     | Offset | Size  | Remarks                                         |
 * +-----------+--------+-------+-------------------------------------------------+
 * | name      | 0      | 100   | archive name, null padded                       |
 * | mode      | 100    | 8     | "0100777\0" for files, "0040777\0" for dirs     |
 * | uid       | 108    | 8     | always "0000000\0"                              |
 * | gid       | 116    | 8     | always "0000000\0"                              |
 * | size      | 124    | 12    | 11 octal digits + NUL                           |
 * | mtime     | 136    | 12    | 11 octal digits + NUL                           |
 * | checksum  | 148    | 8     | 6 octal digits + NUL + space                    |
 * | typeflag  | 156    | 1     | '0' regular file, '5' directory                 |
 * | linkname  | 157    | 100   | unused, NUL                                     |
 * | magic     | 257    | 6     | "ustar\0"                                       |
 * | version   | 263    | 2     | "00"                                            |
 * +-----------+--------+-------+-------------------------------------------------+
 *
 * Everything after the version is NUL up to 512 bytes. A regular file header is followed by
 * its data, padded to a block boundary; a directory header is followed directly by the next
 * header.
 */

use std::ops::Range;

use crate::checksum;
use crate::entry::{EntryDescriptor, EntryType};
use crate::error::{Error, Result};
use crate::octal::{field_to_name, field_to_u64, i64_to_field, name_to_field, u64_to_field};

pub const HEADER_SIZE: usize = 512;

pub const MAGIC: &[u8; 6] = b"ustar\0";
pub const MAGIC_OFFSET: usize = 257;
const VERSION: &[u8; 2] = b"00";

const NAME: Range<usize> = 0..100;
const MODE: Range<usize> = 100..108;
const UID: Range<usize> = 108..116;
const GID: Range<usize> = 116..124;
const SIZE: Range<usize> = 124..136;
const MTIME: Range<usize> = 136..148;
const CHECKSUM: Range<usize> = 148..156;
const TYPEFLAG: usize = 156;
const MAGIC_FIELD: Range<usize> = MAGIC_OFFSET..MAGIC_OFFSET + 6;
const VERSION_FIELD: Range<usize> = 263..265;

const ID_FIELD: &[u8; 8] = b"0000000\0";
const CHECKSUM_PLACEHOLDER: &[u8; 8] = b"000000\0 ";

/// A raw header block, exactly as stored in the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderBlock {
    bytes: [u8; HEADER_SIZE],
}

impl HeaderBlock {
    /// Lay out every field of `descriptor`. The checksum field holds its placeholder until
    /// [`HeaderBlock::seal`] runs.
    pub fn encode(descriptor: &EntryDescriptor) -> Result<Self> {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[NAME].copy_from_slice(&name_to_field(&descriptor.archive_name)?);
        bytes[MODE].copy_from_slice(descriptor.entry_type.mode_field());
        bytes[UID].copy_from_slice(ID_FIELD);
        bytes[GID].copy_from_slice(ID_FIELD);
        bytes[SIZE].copy_from_slice(&u64_to_field(descriptor.size, "size")?);
        bytes[MTIME].copy_from_slice(&i64_to_field(descriptor.modified_time, "mtime")?);
        bytes[CHECKSUM].copy_from_slice(CHECKSUM_PLACEHOLDER);
        bytes[TYPEFLAG] = descriptor.entry_type.as_typeflag();
        bytes[MAGIC_FIELD].copy_from_slice(MAGIC);
        bytes[VERSION_FIELD].copy_from_slice(VERSION);
        Ok(Self { bytes })
    }

    /// Compute and store the checksum, then apply the directory correction when needed.
    pub fn seal(&mut self, posix_adjust: bool) {
        let checksum = checksum::compute(&self.bytes);
        log::trace!("Calculated checksum: {}", checksum);
        checksum::write(&mut self.bytes, &checksum);
        if self.bytes[TYPEFLAG] == EntryType::Directory.as_typeflag() {
            checksum::patch_directory(&mut self.bytes, &checksum, posix_adjust);
        }
    }

    /// Copy the 512 bytes starting at `offset` out of an archive buffer.
    pub fn read(archive: &[u8], offset: usize) -> Result<Self> {
        let available = archive.len().saturating_sub(offset);
        let block = archive
            .get(offset..offset + HEADER_SIZE)
            .ok_or(Error::TruncatedHeader { offset, available })?;
        let mut bytes = [0u8; HEADER_SIZE];
        bytes.copy_from_slice(block);
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8; HEADER_SIZE] {
        &self.bytes
    }

    pub fn is_zero(&self) -> bool {
        self.bytes.iter().all(|b| *b == 0)
    }

    pub fn has_magic(&self) -> bool {
        &self.bytes[MAGIC_FIELD] == MAGIC
    }

    pub fn mode(&self) -> u32 {
        // 8 byte field, at most 7 octal digits
        field_to_u64(&self.bytes[MODE]) as u32
    }

    pub fn stored_checksum(&self) -> u32 {
        field_to_u64(&self.bytes[CHECKSUM]) as u32
    }

    pub fn verify_checksum(&self, offset: usize) -> Result<()> {
        let entry_type = EntryType::from_typeflag(self.bytes[TYPEFLAG], offset)?;
        checksum::verify(&self.bytes, entry_type, offset)
    }

    /// Turn the raw fields back into a descriptor. `offset` is where this block sits in the
    /// archive, for error reporting.
    pub fn decode(&self, offset: usize) -> Result<EntryDescriptor> {
        let name = field_to_name(&self.bytes[NAME], offset)?;
        let entry_type = EntryType::from_typeflag(self.bytes[TYPEFLAG], offset)?;
        let size = field_to_u64(&self.bytes[SIZE]);
        let modified_time = i64::try_from(field_to_u64(&self.bytes[MTIME])).unwrap_or(i64::MAX);
        Ok(EntryDescriptor {
            source_ref: name.clone(),
            archive_name: name,
            size,
            modified_time,
            entry_type,
        })
    }
}

/// Encode and seal a header for `descriptor`.
pub fn encode(descriptor: &EntryDescriptor, posix_adjust: bool) -> Result<HeaderBlock> {
    let mut header = HeaderBlock::encode(descriptor)?;
    header.seal(posix_adjust);
    Ok(header)
}

/// Decode the header that starts at `offset` inside `archive`.
pub fn decode(archive: &[u8], offset: usize) -> Result<EntryDescriptor> {
    HeaderBlock::read(archive, offset)?.decode(offset)
}
