//! Utility functions for buffered file operations

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::archive::compress;
use crate::error::{Error, Result};

/// Read in 8KB of buffer for efficient reading, for large files.
const READ_BUFFER_SIZE: usize = 8192;

/// Read the entire source file (given by path) into memory, in chunks, in a buffered manner.
/// `name` and `declared_size` describe the entry it backs; a file of any other length is an
/// error, reported before anything is read.
pub fn read_source(path: &Path, name: &str, declared_size: u64) -> Result<Vec<u8>> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let on_disk = file.metadata().map_err(|e| Error::io(path, e))?.len();
    if on_disk != declared_size {
        return Err(Error::SizeMismatch {
            name: name.to_string(),
            declared: declared_size,
            actual: on_disk,
        });
    }
    let mut reader = BufReader::new(file);
    let mut data = Vec::with_capacity(usize::try_from(on_disk).unwrap_or(0));
    let mut buffer = [0u8; READ_BUFFER_SIZE];
    loop {
        let bytes_read = reader.read(&mut buffer).map_err(|e| Error::io(path, e))?;
        log::trace!("Read {} bytes of data..", bytes_read);
        if bytes_read == 0 {
            break;
        }
        data.extend_from_slice(&buffer[..bytes_read]);
    }
    log::debug!(
        "File size: {}. Total bytes read: {}",
        declared_size,
        data.len()
    );
    if data.len() as u64 != declared_size {
        return Err(Error::SizeMismatch {
            name: name.to_string(),
            declared: declared_size,
            actual: data.len() as u64,
        });
    }
    Ok(data)
}

/// Load a whole archive into memory, inflating it first when it is gzip compressed.
pub fn load_archive(path: &Path) -> Result<Vec<u8>> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut reader = BufReader::new(file);
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| Error::io(path, e))?;
    if compress::is_gzip(&bytes) {
        log::debug!("{} is gzip compressed, inflating", path.display());
        bytes = compress::gunzip(&bytes).map_err(|e| Error::io(path, e))?;
    }
    Ok(bytes)
}

/// Create (or truncate) `path` and write `data` to it.
pub fn write_file(path: &Path, data: &[u8]) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut writer = BufWriter::new(file);
    writer.write_all(data).map_err(|e| Error::io(path, e))?;
    writer.flush().map_err(|e| Error::io(path, e))?;
    Ok(())
}
