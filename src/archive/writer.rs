//! Sequencing entries into a finished archive.
//!
//! Every entry is staged into its own buffer (header, then data padded to a block boundary for
//! regular files). The staged buffers are concatenated in order and closed with the trailer.
//! Nothing touches the filesystem until [`ArchiveWriter::finalize`].

use std::path::Path;

use crate::archive::{compress, file};
use crate::entry::{EntryDescriptor, EntryType};
use crate::error::{Error, Result};
use crate::header;
use crate::options::WriteOptions;
use crate::padding::pad_to_block;

/// Header plus padded data for one entry. Directories are header only and `data` is ignored.
pub fn stage_entry(
    descriptor: &EntryDescriptor,
    data: &[u8],
    posix_adjust: bool,
) -> Result<Vec<u8>> {
    let header = header::encode(descriptor, posix_adjust)?;
    let mut staged = header.as_bytes().to_vec();
    if descriptor.entry_type == EntryType::Regular {
        if data.len() as u64 != descriptor.size {
            return Err(Error::SizeMismatch {
                name: descriptor.archive_name.clone(),
                declared: descriptor.size,
                actual: data.len() as u64,
            });
        }
        staged.extend_from_slice(&pad_to_block(data));
    }
    Ok(staged)
}

pub struct ArchiveWriter {
    multi_entry: bool,
    options: WriteOptions,
    staged: Vec<Vec<u8>>,
}

impl ArchiveWriter {
    /// A writer for the single-entry operation.
    pub fn single(options: &WriteOptions) -> Self {
        Self {
            multi_entry: false,
            options: options.clone(),
            staged: Vec::new(),
        }
    }

    /// A writer for the multi-entry (manifest) operation.
    pub fn multi(options: &WriteOptions) -> Self {
        Self {
            multi_entry: true,
            options: options.clone(),
            staged: Vec::new(),
        }
    }

    pub fn append(&mut self, descriptor: &EntryDescriptor, data: &[u8]) -> Result<()> {
        log::debug!(
            "Staging {} {} ({} bytes) from {}",
            descriptor.entry_type,
            descriptor.archive_name,
            descriptor.size,
            descriptor.source_ref
        );
        let staged = stage_entry(descriptor, data, self.options.posix_adjust)?;
        self.staged.push(staged);
        Ok(())
    }

    pub fn entry_count(&self) -> usize {
        self.staged.len()
    }

    /// The complete, uncompressed archive.
    pub fn into_bytes(self) -> Vec<u8> {
        let trailer = self.options.trailer.len(self.multi_entry);
        let total = self.staged.iter().map(Vec::len).sum::<usize>() + trailer;
        let mut archive = Vec::with_capacity(total);
        for staged in &self.staged {
            archive.extend_from_slice(staged);
        }
        archive.resize(total, 0);
        archive
    }

    /// Write the archive to `path`, replacing whatever was there. Returns the number of bytes
    /// written.
    pub fn finalize(self, path: &Path) -> Result<usize> {
        let gzip = self.options.gzip;
        let count = self.entry_count();
        let mut bytes = self.into_bytes();
        if gzip {
            bytes = compress::gzip(&bytes).map_err(|e| Error::io(path, e))?;
        }
        file::write_file(path, &bytes)?;
        log::info!(
            "Wrote {} entries ({} bytes) to {}",
            count,
            bytes.len(),
            path.display()
        );
        Ok(bytes.len())
    }
}
