//! Error types for archive writing operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `ArchiveError`.
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Step of the close sequence that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizeStage {
    /// Writing the ZIP central directory and end record.
    Zip,
    /// Writing the TAR end-of-archive blocks.
    Tar,
    /// Flushing the gzip trailer.
    Gzip,
    /// Releasing the output sink.
    Sink,
}

impl std::fmt::Display for FinalizeStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Zip => write!(f, "zip central directory"),
            Self::Tar => write!(f, "tar end-of-archive"),
            Self::Gzip => write!(f, "gzip trailer"),
            Self::Sink => write!(f, "output sink"),
        }
    }
}

/// Coarse classification of an [`ArchiveError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The destination could not be created or opened.
    Destination,
    /// An entry header was rejected or could not be encoded.
    Header,
    /// Entry data could not be read from the source or written to the archive.
    Copy,
    /// A trailing structure could not be written on close.
    Finalize,
    /// Directory traversal failed.
    Traversal,
    /// Invalid configuration value.
    Config,
}

/// Errors that can occur while writing an archive.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// The destination file could not be created.
    #[error("cannot create archive {path}: {source}")]
    CreateDestination {
        /// Destination path after name normalization.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Entry name cannot be used in an archive.
    #[error("invalid entry name {name:?}: {reason}")]
    InvalidEntryName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// The ZIP encoder rejected an entry header.
    #[error("cannot start zip entry {name}: {source}")]
    Zip {
        /// Entry name.
        name: String,
        /// Encoder error.
        source: zip::result::ZipError,
    },

    /// An entry header or its data could not be written to the archive stream.
    #[error("cannot write entry {name}: {source}")]
    Write {
        /// Entry name.
        name: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The byte source of an entry failed to seek or read.
    #[error("cannot read source for entry {name}: {source}")]
    Source {
        /// Entry name.
        name: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A close step failed.
    #[error("cannot finalize {stage}: {source}")]
    Finalize {
        /// Which step failed.
        stage: FinalizeStage,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Directory traversal failed.
    #[error("cannot walk {path}: {message}")]
    Walk {
        /// Path being visited when the walk failed.
        path: PathBuf,
        /// Description from the walker.
        message: String,
    },

    /// Compression level outside 1-9.
    #[error("invalid compression level {level}, must be 1-9")]
    InvalidCompressionLevel {
        /// The rejected level.
        level: u8,
    },

    /// Copy buffer size of zero.
    #[error("copy buffer size must be non-zero")]
    InvalidBufferSize,
}

impl ArchiveError {
    /// Returns the taxonomy class this error belongs to.
    ///
    /// # Examples
    ///
    /// ```
    /// use arcwrite::ArchiveError;
    /// use arcwrite::error::ErrorKind;
    ///
    /// let err = ArchiveError::InvalidEntryName {
    ///     name: String::new(),
    ///     reason: "empty",
    /// };
    /// assert_eq!(err.kind(), ErrorKind::Header);
    /// ```
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::CreateDestination { .. } => ErrorKind::Destination,
            Self::InvalidEntryName { .. } | Self::Zip { .. } => ErrorKind::Header,
            Self::Write { .. } | Self::Source { .. } => ErrorKind::Copy,
            Self::Finalize { .. } => ErrorKind::Finalize,
            Self::Walk { .. } => ErrorKind::Traversal,
            Self::InvalidCompressionLevel { .. } | Self::InvalidBufferSize => ErrorKind::Config,
        }
    }

    /// Returns `true` if this error came from the close sequence.
    #[must_use]
    pub const fn is_finalize_error(&self) -> bool {
        matches!(self, Self::Finalize { .. })
    }

    /// Returns the entry name involved in this error, if any.
    #[must_use]
    pub fn entry_name(&self) -> Option<&str> {
        match self {
            Self::InvalidEntryName { name, .. }
            | Self::Zip { name, .. }
            | Self::Write { name, .. }
            | Self::Source { name, .. } => Some(name),
            _ => None,
        }
    }
}
