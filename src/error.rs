//! Error types shared by the codec, the writer and the readers.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("archive name is empty")]
    EmptyName,

    #[error("archive name is {0} bytes long; at most 100 bytes fit in a header")]
    NameTooLong(usize),

    #[error("archive name {0:?} contains a NUL byte")]
    InvalidName(String),

    #[error("{field} value {value} does not fit in 11 octal digits")]
    FieldOverflow { field: &'static str, value: i128 },

    #[error("malformed manifest line {line}: {reason}")]
    Manifest { line: usize, reason: String },

    #[error("truncated header at offset {offset}: {available} bytes available, need 512")]
    TruncatedHeader { offset: usize, available: usize },

    #[error("truncated data for {name}: {size} bytes declared at offset {offset}")]
    TruncatedData {
        name: String,
        offset: usize,
        size: u64,
    },

    #[error("no ustar magic in header at offset {0}")]
    MissingMagic(usize),

    #[error("unsupported typeflag {flag:?} at offset {offset}")]
    UnsupportedType { flag: u8, offset: usize },

    #[error("archive name is not valid UTF-8 at offset {0}")]
    NameEncoding(usize),

    #[error("refusing to extract unsafe path: {0}")]
    UnsafePath(String),

    #[error("{} is neither a regular file nor a directory", .0.display())]
    UnsupportedSource(PathBuf),

    #[error("{name}: declared size {declared} but source has {actual} bytes")]
    SizeMismatch {
        name: String,
        declared: u64,
        actual: u64,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("checksum mismatch at offset {offset}: stored {stored:o}, calculated {calculated:o}")]
    ChecksumMismatch {
        offset: usize,
        stored: u32,
        calculated: u32,
    },

    #[error("unable to create directory {}: {source}", path.display())]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Wraps an I/O error together with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub fn is_format(&self) -> bool {
        !matches!(
            self,
            Error::Io { .. } | Error::ChecksumMismatch { .. } | Error::DirectoryCreate { .. }
        )
    }

    /// The non-zero status a caller reports for this error. Success is 0.
    pub fn status_code(&self) -> i32 {
        match self {
            Error::Io { .. } => 3,
            Error::ChecksumMismatch { .. } => 4,
            Error::DirectoryCreate { .. } => 5,
            _ => 2,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
