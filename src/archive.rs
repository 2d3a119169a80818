//! This is the main module containing the main functions to pack and unpack an archive.

pub mod compress;
pub mod extract;
pub mod file;
mod pack;
pub mod scanner;
mod unpack;
pub mod writer;

pub use extract::{EntryExtractor, ExtractReport, ListedEntry};
pub use pack::{create_archive, pack, write_entries, write_entry};
pub use scanner::find_header_offsets;
pub use unpack::{extract_entries, list_entries};
pub use writer::ArchiveWriter;
