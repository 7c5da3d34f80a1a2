//! Error-handling for this library.

use std::{io, path::PathBuf, result};

use thiserror::Error;

use crate::crs::ProjectionError;

/// Our standard result type.
pub type Result<T, E = Error> = result::Result<T, E>;

/// Errors which can be returned by this crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A coordinate could not be converted between reference systems.
    #[error(transparent)]
    Projection(#[from] ProjectionError),

    /// A record in one of our input files could not be understood.
    #[error("{}:{line}: {reason}", path.display())]
    #[non_exhaustive]
    MalformedRecord {
        /// The file containing the record.
        path: PathBuf,
        /// The 1-based line number of the record, or 0 if the problem
        /// concerns the file as a whole (a missing MAP record, for example).
        line: u64,
        /// What was wrong with it.
        reason: String,
    },

    /// We could not read or write a file.
    #[error("could not access {}", path.display())]
    #[non_exhaustive]
    Io {
        /// The file we were trying to access.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// The CSV reader or writer failed in a way that isn't specific to one
    /// record.
    #[error("CSV error in {}", path.display())]
    #[non_exhaustive]
    Csv {
        /// The file we were reading or writing.
        path: PathBuf,
        /// The underlying error.
        source: csv::Error,
    },

    /// A configuration value was out of range.
    #[error("invalid configuration: {reason}")]
    #[non_exhaustive]
    InvalidConfig {
        /// Which value was wrong, and why.
        reason: String,
    },

    /// Every file in a batch failed, so there is nothing to report.
    #[error("no detection file could be processed ({failed} failed)")]
    #[non_exhaustive]
    NoFileSucceeded {
        /// How many files failed.
        failed: usize,
    },

    /// A batch run was configured to stop at the first failing file.
    #[error("stopped at {}", path.display())]
    #[non_exhaustive]
    BatchAborted {
        /// The file that failed.
        path: PathBuf,
        /// Why it failed.
        source: Box<Error>,
    },
}

impl Error {
    /// Build a [`Error::MalformedRecord`].
    pub(crate) fn malformed<P, S>(path: P, line: u64, reason: S) -> Error
    where
        P: Into<PathBuf>,
        S: Into<String>,
    {
        Error::MalformedRecord {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }

    /// Build an [`Error::Io`].
    pub(crate) fn io<P: Into<PathBuf>>(path: P, source: io::Error) -> Error {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Build an [`Error::Csv`], unless the CSV error is really an I/O error or
    /// a problem with a specific record, in which case we report it as such.
    pub(crate) fn csv<P: Into<PathBuf>>(path: P, source: csv::Error) -> Error {
        let path = path.into();
        let line = source.position().map(|pos| pos.line());
        match (source.kind(), line) {
            (csv::ErrorKind::Io(_), _) => Error::io(path, source.into()),
            (csv::ErrorKind::UnequalLengths { .. }, Some(line))
            | (csv::ErrorKind::Deserialize { .. }, Some(line))
            | (csv::ErrorKind::Utf8 { .. }, Some(line)) => {
                Error::malformed(path, line, source.to_string())
            }
            _ => Error::Csv { path, source },
        }
    }

    /// Build an [`Error::InvalidConfig`].
    pub(crate) fn invalid_config<S: Into<String>>(reason: S) -> Error {
        Error::InvalidConfig {
            reason: reason.into(),
        }
    }
}
