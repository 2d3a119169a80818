//! The high-level description of an archive entry, used by both the write and the read paths.

use std::fmt;

use crate::error::{Error, Result};

/// Kind of an entry. The discriminants are the numeric entry types used by manifests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EntryType {
    Regular = 0,
    Directory = 5,
}

impl EntryType {
    /// Parse the numeric entry type used in manifests and by callers.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(EntryType::Regular),
            5 => Some(EntryType::Directory),
            _ => None,
        }
    }

    pub fn as_typeflag(&self) -> u8 {
        match self {
            EntryType::Regular => b'0',
            EntryType::Directory => b'5',
        }
    }

    /// NUL is accepted as a regular file, as old tar writers leave the flag empty.
    pub fn from_typeflag(byte: u8, offset: usize) -> Result<Self> {
        match byte {
            b'0' | 0 => Ok(EntryType::Regular),
            b'5' => Ok(EntryType::Directory),
            flag => Err(Error::UnsupportedType { flag, offset }),
        }
    }

    /// The fixed mode string stored for this kind of entry.
    pub fn mode_field(&self) -> &'static [u8; 8] {
        match self {
            EntryType::Regular => b"0100777\0",
            EntryType::Directory => b"0040777\0",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryType::Regular => write!(f, "file"),
            EntryType::Directory => write!(f, "directory"),
        }
    }
}

/// Everything the writer needs to know about one entry, and everything the reader recovers from
/// a header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDescriptor {
    /// Where the entry came from: a source path or a manifest part id. Decoded entries carry
    /// their archive name here.
    pub source_ref: String,
    /// Name stored in the header. At most 100 bytes.
    pub archive_name: String,
    pub size: u64,
    /// Unix seconds.
    pub modified_time: i64,
    pub entry_type: EntryType,
}

impl EntryDescriptor {
    pub fn new(
        source_ref: impl Into<String>,
        archive_name: impl Into<String>,
        size: u64,
        modified_time: i64,
        entry_type: EntryType,
    ) -> Self {
        Self {
            source_ref: source_ref.into(),
            archive_name: archive_name.into(),
            size,
            modified_time,
            entry_type,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.entry_type == EntryType::Directory
    }
}
