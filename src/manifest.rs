//! Manifest files: one entry per line, as `sourceRef:archiveName:size:modifiedTime:entryType`.

use std::fs;
use std::path::Path;

use crate::entry::{EntryDescriptor, EntryType};
use crate::error::{Error, Result};

const FIELDS: usize = 5;

pub fn read_manifest(path: &Path) -> Result<Vec<EntryDescriptor>> {
    let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    parse_manifest(&text)
}

/// Parse every non-blank line, in order. The first malformed line aborts the parse.
pub fn parse_manifest(text: &str) -> Result<Vec<EntryDescriptor>> {
    text.lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim_end_matches('\r')))
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(number, line)| parse_line(number, line))
        .collect()
}

fn parse_line(number: usize, line: &str) -> Result<EntryDescriptor> {
    let malformed = |reason: String| Error::Manifest {
        line: number,
        reason,
    };
    let fields: Vec<&str> = line.split(':').collect();
    if fields.len() != FIELDS {
        return Err(malformed(format!(
            "expected {} colon separated fields, found {}",
            FIELDS,
            fields.len()
        )));
    }
    let size = fields[2]
        .trim()
        .parse::<u64>()
        .map_err(|e| malformed(format!("size {:?}: {}", fields[2], e)))?;
    let modified_time = fields[3]
        .trim()
        .parse::<i64>()
        .map_err(|e| malformed(format!("modified time {:?}: {}", fields[3], e)))?;
    let entry_type = fields[4]
        .trim()
        .parse::<u8>()
        .ok()
        .and_then(EntryType::from_code)
        .ok_or_else(|| malformed(format!("entry type {:?} is not 0 or 5", fields[4])))?;
    if fields[1].is_empty() {
        return Err(malformed("empty archive name".to_string()));
    }
    Ok(EntryDescriptor::new(
        fields[0],
        fields[1],
        size,
        modified_time,
        entry_type,
    ))
}
