//! Turning paths on disk into entries.

use std::fs;
use std::path::{Component, Path, PathBuf};

use filetime::FileTime;

use crate::entry::{EntryDescriptor, EntryType};
use crate::error::{Error, Result};
use crate::options::SourceOptions;

/// An entry together with the file its content is read from.
#[derive(Debug, Clone)]
pub struct SourceEntry {
    pub descriptor: EntryDescriptor,
    /// Path to find the file in the system, while creating the archive.
    pub system_path: PathBuf,
}

impl SourceEntry {
    pub fn new(descriptor: EntryDescriptor, system_path: impl Into<PathBuf>) -> Self {
        Self {
            descriptor,
            system_path: system_path.into(),
        }
    }
}

/// Build entries for every input path. A directory yields its own entry followed by entries for
/// its contents, sorted by name.
pub fn collect_sources(paths: &[PathBuf], options: &SourceOptions) -> Result<Vec<SourceEntry>> {
    let mut entries = Vec::new();
    for path in paths {
        let archive_name = if options.flat {
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .ok_or_else(|| Error::UnsafePath(path.display().to_string()))?
        } else {
            archive_name(path)?
        };
        collect(path, archive_name, &mut entries)?;
    }
    Ok(entries)
}

fn collect(path: &Path, archive_name: String, entries: &mut Vec<SourceEntry>) -> Result<()> {
    log::debug!("Processing file: {}", path.display());
    let metadata = fs::metadata(path).map_err(|e| Error::io(path, e))?;
    let modified_time = FileTime::from_last_modification_time(&metadata).unix_seconds();
    let source_ref = path.display().to_string();

    // if the file is a directory, add it and recursively process its children.
    if metadata.is_dir() {
        entries.push(SourceEntry::new(
            EntryDescriptor::new(
                source_ref,
                archive_name.clone(),
                0,
                modified_time,
                EntryType::Directory,
            ),
            path,
        ));
        let mut children = fs::read_dir(path)
            .map_err(|e| Error::io(path, e))?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(|e| Error::io(path, e))?;
        children.sort();
        for child in children {
            let name = child
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .ok_or_else(|| Error::UnsafePath(child.display().to_string()))?;
            collect(&child, format!("{}/{}", archive_name, name), entries)?;
        }
    } else if metadata.is_file() {
        entries.push(SourceEntry::new(
            EntryDescriptor::new(
                source_ref,
                archive_name,
                metadata.len(),
                modified_time,
                EntryType::Regular,
            ),
            path,
        ));
    } else {
        return Err(Error::UnsupportedSource(path.to_path_buf()));
    }
    Ok(())
}

/// The `/` separated archive name of a relative or absolute input path: root and `.` components
/// are dropped, `..` is refused.
fn archive_name(path: &Path) -> Result<String> {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
            Component::ParentDir => return Err(Error::UnsafePath(path.display().to_string())),
        }
    }
    if parts.is_empty() {
        return Err(Error::UnsafePath(path.display().to_string()));
    }
    Ok(parts.join("/"))
}
