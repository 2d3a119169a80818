//! Knobs for the write and read paths. There are no configuration files; the binary fills these
//! in from command line flags and library callers start from `Default`.

use std::path::PathBuf;

/// How many zero bytes close an archive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Trailer {
    /// Two zero blocks, whatever the number of entries.
    #[default]
    Standard,
    /// `(512 * 2) + 1` bytes after a single-entry write, `(512 * 3) + 1` after a multi-entry
    /// write. Matches archives produced by older releases.
    Legacy,
}

impl Trailer {
    pub fn len(&self, multi_entry: bool) -> usize {
        match (self, multi_entry) {
            (Trailer::Standard, _) => 512 * 2,
            (Trailer::Legacy, false) => (512 * 2) + 1,
            (Trailer::Legacy, true) => (512 * 3) + 1,
        }
    }
}

/// How the reader discovers where headers start.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ScanMode {
    /// Decode each header and skip over its data.
    #[default]
    Walk,
    /// Look for the ustar magic at every byte position. Needed for archives whose data padding
    /// does not follow the block rule of this crate.
    Magic,
}

#[derive(Clone, Debug)]
pub struct WriteOptions {
    pub trailer: Trailer,
    /// Decrement the checksum of directory headers by one, as POSIX hosts always did.
    pub posix_adjust: bool,
    /// Compress the finished archive with gzip.
    pub gzip: bool,
    /// Directory that relative source paths are resolved against. Defaults to the current
    /// directory.
    pub source_root: Option<PathBuf>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            trailer: Trailer::default(),
            posix_adjust: cfg!(unix),
            gzip: false,
            source_root: None,
        }
    }
}

impl WriteOptions {
    pub fn resolve(&self, path: &str) -> PathBuf {
        match &self.source_root {
            Some(root) => root.join(path),
            None => PathBuf::from(path),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ReadOptions {
    pub scan_mode: ScanMode,
    /// Reject headers whose stored checksum does not match.
    pub verify_checksums: bool,
    /// Where extracted entries are materialized.
    pub destination: PathBuf,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            scan_mode: ScanMode::default(),
            verify_checksums: false,
            destination: PathBuf::from("."),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SourceOptions {
    /// Store only the final path component of each input as its archive name.
    pub flat: bool,
}
