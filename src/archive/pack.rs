use std::path::{Path, PathBuf};

use crate::archive::file::read_source;
use crate::archive::writer::ArchiveWriter;
use crate::entry::{EntryDescriptor, EntryType};
use crate::error::Result;
use crate::manifest::read_manifest;
use crate::options::{SourceOptions, WriteOptions};
use crate::source::{collect_sources, SourceEntry};

/// Write a one-entry archive. `source_name` is both the stored name and, for regular files, the
/// file the content is read from (resolved against the source root).
pub fn write_entry(
    archive_path: &Path,
    source_name: &str,
    size: u64,
    modified_time: i64,
    entry_type: EntryType,
    options: &WriteOptions,
) -> Result<()> {
    let descriptor = EntryDescriptor::new(source_name, source_name, size, modified_time, entry_type);
    let entry = SourceEntry::new(descriptor, options.resolve(source_name));
    let mut writer = ArchiveWriter::single(options);
    append(&mut writer, &entry)?;
    writer.finalize(archive_path)?;
    Ok(())
}

/// Write every entry of a manifest, in manifest order. Regular-file content is read from the
/// archive name of each line. Returns the number of entries written.
pub fn write_entries(
    archive_path: &Path,
    manifest_path: &Path,
    options: &WriteOptions,
) -> Result<usize> {
    let entries = read_manifest(manifest_path)?
        .into_iter()
        .map(|descriptor| {
            let system_path = options.resolve(&descriptor.archive_name);
            SourceEntry::new(descriptor, system_path)
        })
        .collect::<Vec<_>>();
    pack(archive_path, &entries, options)
}

/// Archive files and directories straight from disk.
pub fn create_archive(
    archive_path: &Path,
    paths: &[PathBuf],
    source_options: &SourceOptions,
    options: &WriteOptions,
) -> Result<usize> {
    let entries = collect_sources(paths, source_options)?;
    pack(archive_path, &entries, options)
}

/// Stage `entries` in order and finalize them as a multi-entry archive.
pub fn pack(archive_path: &Path, entries: &[SourceEntry], options: &WriteOptions) -> Result<usize> {
    let mut writer = ArchiveWriter::multi(options);
    for entry in entries {
        append(&mut writer, entry)?;
    }
    let count = writer.entry_count();
    writer.finalize(archive_path)?;
    Ok(count)
}

fn append(writer: &mut ArchiveWriter, entry: &SourceEntry) -> Result<()> {
    let descriptor = &entry.descriptor;
    let data = match descriptor.entry_type {
        EntryType::Directory => Vec::new(),
        EntryType::Regular => read_source(
            &entry.system_path,
            &descriptor.archive_name,
            descriptor.size,
        )?,
    };
    writer.append(descriptor, &data)
}
