//! Decoding entries at known offsets, and either reporting them or materializing them on disk.

use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};

use chrono::{Local, TimeZone};
use filetime::FileTime;

use crate::archive::file::write_file;
use crate::entry::{EntryDescriptor, EntryType};
use crate::error::{Error, Result};
use crate::header::{HeaderBlock, HEADER_SIZE};

/// A decoded entry, with the mode that was stored in its header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedEntry {
    pub mode: u32,
    pub descriptor: EntryDescriptor,
}

impl fmt::Display for ListedEntry {
    /// `mode  size  date  name`, with the size right-justified to 10 columns.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:o}  {:>10}  {}  {}",
            self.mode,
            self.descriptor.size,
            format_time(self.descriptor.modified_time),
            self.descriptor.archive_name
        )
    }
}

fn format_time(unix_seconds: i64) -> String {
    match Local.timestamp_opt(unix_seconds, 0).single() {
        Some(time) => time.format("%a %b %d %Y %X").to_string(),
        None => unix_seconds.to_string(),
    }
}

/// What happened to the entries of one extraction run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtractReport {
    pub files_written: usize,
    /// Files left alone because they already existed and overwrite was off.
    pub files_skipped: usize,
    pub directories_created: usize,
    pub directory_failures: usize,
}

impl ExtractReport {
    pub fn entries(&self) -> usize {
        self.files_written + self.files_skipped + self.directories_created + self.directory_failures
    }
}

pub struct EntryExtractor<'a> {
    archive: &'a [u8],
    destination: &'a Path,
    verify_checksums: bool,
}

impl<'a> EntryExtractor<'a> {
    pub fn new(archive: &'a [u8], destination: &'a Path, verify_checksums: bool) -> Self {
        Self {
            archive,
            destination,
            verify_checksums,
        }
    }

    /// Decode the header at `offset` without touching the filesystem.
    pub fn list(&self, offset: usize) -> Result<ListedEntry> {
        let header = HeaderBlock::read(self.archive, offset)?;
        if self.verify_checksums {
            header.verify_checksum(offset)?;
        }
        let descriptor = header.decode(offset)?;
        log::trace!("Decoded header at offset {}: {:?}", offset, descriptor);
        Ok(ListedEntry {
            mode: header.mode(),
            descriptor,
        })
    }

    /// Decode the header at `offset` and create the directory or file it describes.
    pub fn extract(
        &self,
        offset: usize,
        overwrite: bool,
        report: &mut ExtractReport,
    ) -> Result<ListedEntry> {
        let entry = self.list(offset)?;
        let descriptor = &entry.descriptor;
        let target = self
            .destination
            .join(host_path(&descriptor.archive_name)?);

        match descriptor.entry_type {
            EntryType::Directory => match fs::create_dir_all(&target) {
                Ok(()) => {
                    log::debug!("Created directory {}", target.display());
                    report.directories_created += 1;
                }
                Err(source) => {
                    let error = Error::DirectoryCreate {
                        path: target.clone(),
                        source,
                    };
                    log::error!("{}", error);
                    report.directory_failures += 1;
                }
            },
            EntryType::Regular => {
                if !overwrite && target.exists() {
                    log::debug!("{} exists, leaving it untouched", target.display());
                    report.files_skipped += 1;
                } else {
                    let data = self.data(offset, descriptor)?;
                    if let Some(parent) = target.parent() {
                        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
                    }
                    write_file(&target, data)?;
                    let mtime = FileTime::from_unix_time(descriptor.modified_time, 0);
                    if let Err(e) = filetime::set_file_mtime(&target, mtime) {
                        log::warn!("Unable to set mtime of {}: {}", target.display(), e);
                    }
                    log::debug!("Wrote {} bytes to {}", data.len(), target.display());
                    report.files_written += 1;
                }
            }
        }
        Ok(entry)
    }

    /// The `size` bytes following the header at `offset`.
    fn data(&self, offset: usize, descriptor: &EntryDescriptor) -> Result<&'a [u8]> {
        let truncated = || Error::TruncatedData {
            name: descriptor.archive_name.clone(),
            offset,
            size: descriptor.size,
        };
        let size = usize::try_from(descriptor.size).map_err(|_| truncated())?;
        let start = offset + HEADER_SIZE;
        start
            .checked_add(size)
            .and_then(|end| self.archive.get(start..end))
            .ok_or_else(truncated)
    }
}

/// Turn a `/` separated archive name into a relative host path. Absolute names and names that
/// climb out of the destination are refused.
fn host_path(name: &str) -> Result<PathBuf> {
    if name.starts_with('/') {
        return Err(Error::UnsafePath(name.to_string()));
    }
    let mut path = PathBuf::new();
    for part in name.split('/').filter(|p| !p.is_empty() && *p != ".") {
        match Path::new(part).components().next() {
            Some(Component::Normal(_)) => path.push(part),
            _ => return Err(Error::UnsafePath(name.to_string())),
        }
    }
    if path.as_os_str().is_empty() {
        return Err(Error::UnsafePath(name.to_string()));
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::writer::ArchiveWriter;
    use crate::options::WriteOptions;

    fn archive() -> anyhow::Result<Vec<u8>> {
        let mut writer = ArchiveWriter::multi(&WriteOptions::default());
        writer.append(
            &EntryDescriptor::new("p1", "docs", 0, 1_000_000_000, EntryType::Directory),
            b"",
        )?;
        writer.append(
            &EntryDescriptor::new("p2", "docs/hello.txt", 2, 1_000_000_000, EntryType::Regular),
            b"hi",
        )?;
        Ok(writer.into_bytes())
    }

    #[test]
    fn test_host_path() -> anyhow::Result<()> {
        assert_eq!(host_path("a/b/c.txt")?, Path::new("a").join("b").join("c.txt"));
        assert_eq!(host_path("./a//b/")?, Path::new("a").join("b"));
        assert!(matches!(host_path("/etc/passwd"), Err(Error::UnsafePath(_))));
        assert!(matches!(host_path("a/../../b"), Err(Error::UnsafePath(_))));
        assert!(matches!(host_path("./"), Err(Error::UnsafePath(_))));
        Ok(())
    }

    #[test]
    fn test_list_does_not_touch_disk() -> anyhow::Result<()> {
        let bytes = archive()?;
        let dir = tempfile::tempdir()?;
        let extractor = EntryExtractor::new(&bytes, dir.path(), true);
        let entry = extractor.list(512)?;
        assert_eq!(entry.descriptor.archive_name, "docs/hello.txt");
        assert_eq!(entry.mode, 0o100777);
        assert_eq!(fs::read_dir(dir.path())?.count(), 0);
        Ok(())
    }

    #[test]
    fn test_listing_line() -> anyhow::Result<()> {
        let bytes = archive()?;
        let dir = tempfile::tempdir()?;
        let line = EntryExtractor::new(&bytes, dir.path(), false)
            .list(512)?
            .to_string();
        assert!(line.starts_with("100777           2  "));
        assert!(line.ends_with("  docs/hello.txt"));
        assert!(line.contains("2001"));
        Ok(())
    }

    #[test]
    fn test_extract_and_skip() -> anyhow::Result<()> {
        let bytes = archive()?;
        let dir = tempfile::tempdir()?;
        let extractor = EntryExtractor::new(&bytes, dir.path(), false);
        let mut report = ExtractReport::default();
        extractor.extract(0, false, &mut report)?;
        extractor.extract(512, false, &mut report)?;
        assert!(dir.path().join("docs").is_dir());
        assert_eq!(fs::read(dir.path().join("docs/hello.txt"))?, b"hi");
        let mtime = FileTime::from_last_modification_time(&fs::metadata(
            dir.path().join("docs/hello.txt"),
        )?);
        assert_eq!(mtime.unix_seconds(), 1_000_000_000);

        fs::write(dir.path().join("docs/hello.txt"), b"changed")?;
        extractor.extract(512, false, &mut report)?;
        assert_eq!(fs::read(dir.path().join("docs/hello.txt"))?, b"changed");

        extractor.extract(512, true, &mut report)?;
        assert_eq!(fs::read(dir.path().join("docs/hello.txt"))?, b"hi");

        assert_eq!(report.directories_created, 1);
        assert_eq!(report.files_written, 2);
        assert_eq!(report.files_skipped, 1);
        Ok(())
    }

    #[test]
    fn test_directory_failure_is_not_fatal() -> anyhow::Result<()> {
        let bytes = archive()?;
        let dir = tempfile::tempdir()?;
        // a regular file where the directory should go
        fs::write(dir.path().join("docs"), b"")?;
        let extractor = EntryExtractor::new(&bytes, dir.path(), false);
        let mut report = ExtractReport::default();
        extractor.extract(0, false, &mut report)?;
        assert_eq!(report.directory_failures, 1);
        Ok(())
    }

    #[test]
    fn test_truncated_data() -> anyhow::Result<()> {
        let bytes = archive()?;
        let dir = tempfile::tempdir()?;
        let extractor = EntryExtractor::new(&bytes[..1025], dir.path(), false);
        let result = extractor.extract(512, true, &mut ExtractReport::default());
        assert!(matches!(result, Err(Error::TruncatedData { .. })));
        Ok(())
    }
}
