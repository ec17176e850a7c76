//! Error types that can be emitted from this library

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent warpper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// archive does not exist at {0}
    #[error("archive does not exist at {}", .0.display())]
    ArchiveNotFound(PathBuf),

    /// archive is corrupt: {0}
    #[error("archive is corrupt: {0}")]
    #[diagnostic(help(
        "the file was truncated or is not a sound archive. Every table must start exactly where the previous \
         one ends, which is stricter than tools that seek to the declared table start"
    ))]
    CorruptArchive(String),

    /// table {0} appears more than once
    #[error("table {0} appears more than once")]
    DuplicateTable(i32),

    /// table id {0} has no known sound type
    #[error("table id {0} has no known sound type")]
    #[diagnostic(help("known ids are 0 (WAVE), 1 (SE), 2 (SEB), 4 (STRSE), 5 (STRBGM) and 6 (STRVOICE)"))]
    UnknownTableID(i32),

    /// source is missing: {0}
    #[error("source is missing: {}", .0.display())]
    SourceMissing(PathBuf),

    /// failed writing {path}
    #[error("failed writing {}", path.display())]
    WriteFailure {
        /// The file or directory being written
        path: PathBuf,
        /// The underlying failure
        #[source]
        source: std::io::Error,
    },

    /// entry name {0:?} can not be stored or extracted
    #[error("entry name {0:?} can not be stored or extracted")]
    InvalidEntryName(String),

    /// table {table} needs {required} bytes before its file data but only {available} are reserved
    #[error("table {table} needs {required} bytes before its file data but only {available} are reserved")]
    LayoutOverflow {
        /// The table being laid out
        table: i32,
        /// Size of header, index and names
        required: u64,
        /// The preserved file data offset
        available: u32,
    },

    /// table {0} does not fit in the 32 bit offsets of the archive format
    #[error("table {0} does not fit in the 32 bit offsets of the archive format")]
    ArchiveTooLarge(i32),

    /// unable to find requested entry
    #[error("unable to find requested entry")]
    EntryNotFound(#[from] EntryNotFoundError),
}

/// Error type to provide further information when an entry has not been found
#[derive(Error, Diagnostic, Debug)]
#[error("unable to find requested entry")]
pub enum EntryNotFoundError {
    /// no table with id {0}
    #[error("no table with id {0}")]
    Table(i32),

    /// at index {1} of table {0}
    #[error("at index {1} of table {0}")]
    Index(i32, usize),

    /// by name {1} in table {0}
    #[error("by name {1} in table {0}")]
    Name(i32, String),
}

impl Error {
    /// Convert a codec failure while reading into a structural error.
    ///
    /// Running out of input in the middle of a structure means the archive is truncated.
    pub(crate) fn from_read(err: binrw::Error, what: impl std::fmt::Display) -> Self {
        if err.is_eof() {
            return Error::CorruptArchive(format!("unexpected end of archive while reading {what}"));
        }
        Error::BinRWError(err)
    }

    /// Same as [`Error::from_read`] for plain I/O failures.
    pub(crate) fn from_io_read(err: std::io::Error, what: impl std::fmt::Display) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            return Error::CorruptArchive(format!("unexpected end of archive while reading {what}"));
        }
        Error::IOError(err)
    }

    pub(crate) fn write_failure(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Error::WriteFailure { path, source }
    }
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
