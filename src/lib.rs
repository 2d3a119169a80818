//! Reading and writing ustar-style tape archives.
//!
//! An archive is a flat run of 512 byte header blocks, each regular file header followed by its
//! data padded to a block boundary, closed by zero blocks. There is no table of contents:
//! readers find entries by walking headers (or, for older archives, by scanning for the ustar
//! magic).
//!
//! The four operations are [`write_entry`], [`write_entries`], [`list_entries`] and
//! [`extract_entries`]. Errors carry a [`Error::status_code`] for callers that report numeric
//! statuses.

pub mod archive;
pub mod checksum;
pub mod entry;
pub mod error;
pub mod header;
pub mod manifest;
pub mod octal;
pub mod options;
pub mod padding;
pub mod source;

pub use archive::{
    create_archive, extract_entries, find_header_offsets, list_entries, write_entries,
    write_entry, ArchiveWriter, ExtractReport, ListedEntry,
};
pub use entry::{EntryDescriptor, EntryType};
pub use error::{Error, Result};
pub use options::{ReadOptions, ScanMode, SourceOptions, Trailer, WriteOptions};
