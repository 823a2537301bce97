//! The capability set shared by every archive writer.
//!
//! [`ArchiveWriter`] is implemented by [`ZipArchiveWriter`] and
//! [`TarArchiveWriter`]. The two share the contract but no state. A handle is
//! only obtainable through a `create*` constructor and [`ArchiveWriter::close`]
//! consumes it, so adding entries to an unopened or closed archive does not
//! compile.
//!
//! [`AnyArchiveWriter`] selects the format at run time for callers that only
//! learn it from configuration or a file name.

use crate::ArchiveError;
use crate::Result;
use crate::config::WriterConfig;
use crate::creation::tar::TarArchiveWriter;
use crate::creation::zip::ZipArchiveWriter;
use crate::naming;
use std::fs::File;
use std::io::BufWriter;
use std::io::Cursor;
use std::io::Read;
use std::io::Seek;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

/// Sink used by file-backed writers.
pub type FileSink = BufWriter<File>;

/// Container format written by an [`ArchiveWriter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    /// ZIP with deflate-compressed entries.
    Zip,
    /// TAR, gzip-wrapped when the destination name ends in `.tar.gz`.
    Tar,
}

impl ArchiveFormat {
    /// Detects the format from a destination name.
    ///
    /// Returns `None` for names that carry neither a ZIP nor a TAR suffix.
    ///
    /// # Examples
    ///
    /// ```
    /// use arcwrite::ArchiveFormat;
    ///
    /// assert_eq!(ArchiveFormat::detect("a.zip"), Some(ArchiveFormat::Zip));
    /// assert_eq!(ArchiveFormat::detect("a.tar.gz"), Some(ArchiveFormat::Tar));
    /// assert_eq!(ArchiveFormat::detect("a.txt"), None);
    /// ```
    #[must_use]
    pub fn detect(name: &str) -> Option<Self> {
        if name.ends_with(".zip") {
            Some(Self::Zip)
        } else if name.ends_with(".tar") || name.ends_with(".tar.gz") {
            Some(Self::Tar)
        } else {
            None
        }
    }

    /// Applies this format's destination naming policy to `name`.
    #[must_use]
    pub fn destination(self, name: &str) -> String {
        match self {
            Self::Zip => naming::zip_destination(name),
            Self::Tar => naming::tar_destination(name).name,
        }
    }
}

impl std::fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Zip => write!(f, "zip"),
            Self::Tar => write!(f, "tar"),
        }
    }
}

/// An open archive that accepts entries until it is closed.
///
/// Entries are written in call order and cannot be revised: both formats are
/// append-only streams. After a failed `add_*` call the archive may be left
/// half-written; the only remedy is to discard it.
pub trait ArchiveWriter {
    /// Output sink handed back by [`close`](ArchiveWriter::close).
    type Sink;

    /// Destination name (normalized for file-backed writers, a label otherwise).
    fn name(&self) -> &str;

    /// Container format of this writer.
    fn format(&self) -> ArchiveFormat;

    /// Adds a regular file entry with the contents of `source`.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is rejected, the header cannot be written,
    /// or the data cannot be copied.
    fn add_file<R: Read + Seek + ?Sized>(&mut self, entry_name: &str, source: &mut R)
    -> Result<()>;

    /// Adds a directory entry. A trailing `/` is appended when missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the header cannot be written.
    fn add_directory(&mut self, entry_name: &str) -> Result<()>;

    /// Writes trailing structures, releases the sink and returns it.
    ///
    /// # Errors
    ///
    /// Returns an error if a finalize step fails.
    fn close(self) -> Result<Self::Sink>
    where
        Self: Sized;

    /// Adds a regular file entry from an in-memory buffer.
    ///
    /// # Errors
    ///
    /// Same as [`add_file`](ArchiveWriter::add_file).
    fn add_bytes(&mut self, entry_name: &str, data: &[u8]) -> Result<()> {
        self.add_file(entry_name, &mut Cursor::new(data))
    }

    /// Adds a regular file entry read from `path` on disk.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Source`] if the file cannot be opened, otherwise
    /// the same errors as [`add_file`](ArchiveWriter::add_file).
    fn add_path(&mut self, entry_name: &str, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::open(path.as_ref()).map_err(|source| ArchiveError::Source {
            name: entry_name.to_string(),
            source,
        })?;
        self.add_file(entry_name, &mut file)
    }
}

/// Writer for a format chosen at run time.
///
/// # Examples
///
/// ```
/// use arcwrite::{AnyArchiveWriter, ArchiveFormat, ArchiveWriter};
/// use std::io::Cursor;
///
/// let mut archive =
///     AnyArchiveWriter::create_writer(ArchiveFormat::Zip, "memory", Cursor::new(Vec::new()));
/// archive.add_bytes("a.txt", b"hello")?;
/// let bytes = archive.close()?.into_inner();
/// assert!(!bytes.is_empty());
/// # Ok::<(), arcwrite::ArchiveError>(())
/// ```
#[derive(Debug)]
pub enum AnyArchiveWriter<W: Write + Seek> {
    /// ZIP writer.
    Zip(ZipArchiveWriter<W>),
    /// TAR writer.
    Tar(TarArchiveWriter<W>),
}

impl AnyArchiveWriter<FileSink> {
    /// Creates a file-backed writer of the given format.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination cannot be created.
    pub fn create(format: ArchiveFormat, name: &str) -> Result<Self> {
        Self::create_with_config(format, name, &WriterConfig::default())
    }

    /// Creates a file-backed writer of the given format with a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the destination
    /// cannot be created.
    pub fn create_with_config(
        format: ArchiveFormat,
        name: &str,
        config: &WriterConfig,
    ) -> Result<Self> {
        match format {
            ArchiveFormat::Zip => ZipArchiveWriter::create_with_config(name, config).map(Self::Zip),
            ArchiveFormat::Tar => TarArchiveWriter::create_with_config(name, config).map(Self::Tar),
        }
    }
}

impl<W: Write + Seek> AnyArchiveWriter<W> {
    /// Binds a writer of the given format to an existing sink.
    pub fn create_writer(format: ArchiveFormat, name: impl Into<String>, sink: W) -> Self {
        match format {
            ArchiveFormat::Zip => Self::Zip(ZipArchiveWriter::create_writer(name, sink)),
            ArchiveFormat::Tar => Self::Tar(TarArchiveWriter::create_writer(name, sink)),
        }
    }
}

impl<W: Write + Seek> ArchiveWriter for AnyArchiveWriter<W> {
    type Sink = W;

    fn name(&self) -> &str {
        match self {
            Self::Zip(zip) => zip.name(),
            Self::Tar(tar) => tar.name(),
        }
    }

    fn format(&self) -> ArchiveFormat {
        match self {
            Self::Zip(_) => ArchiveFormat::Zip,
            Self::Tar(_) => ArchiveFormat::Tar,
        }
    }

    fn add_file<R: Read + Seek + ?Sized>(
        &mut self,
        entry_name: &str,
        source: &mut R,
    ) -> Result<()> {
        match self {
            Self::Zip(zip) => zip.add_file(entry_name, source),
            Self::Tar(tar) => tar.add_file(entry_name, source),
        }
    }

    fn add_directory(&mut self, entry_name: &str) -> Result<()> {
        match self {
            Self::Zip(zip) => zip.add_directory(entry_name),
            Self::Tar(tar) => tar.add_directory(entry_name),
        }
    }

    fn close(self) -> Result<W> {
        match self {
            Self::Zip(zip) => zip.close(),
            Self::Tar(tar) => tar.close(),
        }
    }
}

/// Creates (or truncates) a destination file.
pub(crate) fn create_destination(name: &str) -> Result<FileSink> {
    File::create(name)
        .map(BufWriter::new)
        .map_err(|source| ArchiveError::CreateDestination {
            path: PathBuf::from(name),
            source,
        })
}

/// Rejects entry names no container can represent.
pub(crate) fn validate_entry_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ArchiveError::InvalidEntryName {
            name: name.to_string(),
            reason: "entry name is empty",
        });
    }
    if name.contains('\0') {
        return Err(ArchiveError::InvalidEntryName {
            name: name.to_string(),
            reason: "entry name contains a NUL byte",
        });
    }
    Ok(())
}
