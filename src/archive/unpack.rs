use std::io::Write;
use std::path::Path;

use crate::archive::extract::{EntryExtractor, ExtractReport, ListedEntry};
use crate::archive::file::load_archive;
use crate::archive::scanner::find_header_offsets;
use crate::error::{Error, Result};
use crate::options::ReadOptions;

/// Print every entry of an archive without changing anything on disk. `known_total_size`
/// bounds the part of the (decompressed) archive that is scanned.
pub fn list_entries<W: Write>(
    archive_path: &Path,
    known_total_size: Option<u64>,
    verbose: bool,
    options: &ReadOptions,
    out: &mut W,
) -> Result<Vec<ListedEntry>> {
    let archive = load_archive(archive_path)?;
    let offsets = find_header_offsets(&archive, known_total_size, options.scan_mode)?;
    if verbose {
        emit(out, &format!("Listing {} entries from archive.\n", offsets.len()))?;
    }

    let extractor = EntryExtractor::new(&archive, &options.destination, options.verify_checksums);
    let mut entries = Vec::with_capacity(offsets.len());
    for offset in offsets {
        let entry = extractor.list(offset)?;
        emit(out, &entry.to_string())?;
        entries.push(entry);
    }
    Ok(entries)
}

/// Materialize every entry of an archive under `options.destination`. Existing files are only
/// replaced when `overwrite` is set. Verbose runs print bare names, other runs print the listing
/// line of each entry.
pub fn extract_entries<W: Write>(
    archive_path: &Path,
    known_total_size: Option<u64>,
    overwrite: bool,
    verbose: bool,
    options: &ReadOptions,
    out: &mut W,
) -> Result<ExtractReport> {
    let archive = load_archive(archive_path)?;
    let offsets = find_header_offsets(&archive, known_total_size, options.scan_mode)?;
    if verbose {
        emit(
            out,
            &format!("Extracting {} entries from archive.\n", offsets.len()),
        )?;
    }

    let extractor = EntryExtractor::new(&archive, &options.destination, options.verify_checksums);
    let mut report = ExtractReport::default();
    for offset in offsets {
        let entry = extractor.extract(offset, overwrite, &mut report)?;
        if verbose {
            emit(out, &entry.descriptor.archive_name)?;
        } else {
            emit(out, &entry.to_string())?;
        }
    }
    if report.directory_failures > 0 {
        log::warn!(
            "{} directories could not be created",
            report.directory_failures
        );
    }
    Ok(report)
}

fn emit<W: Write>(out: &mut W, line: &str) -> Result<()> {
    writeln!(out, "{}", line).map_err(|e| Error::io("<output>", e))
}
