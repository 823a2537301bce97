//! ZIP archive writer.
//!
//! Each `add_file` starts a deflate-compressed entry and streams the source
//! through it; directories become zero-length stored entries. The central
//! directory is written by [`ZipArchiveWriter::close`].

use crate::ArchiveError;
use crate::Result;
use crate::config::WriterConfig;
use crate::copy::CopyBuffer;
use crate::copy::CopyError;
use crate::copy::copy_with_buffer;
use crate::error::FinalizeStage;
use crate::naming;
use crate::writer::ArchiveFormat;
use crate::writer::ArchiveWriter;
use crate::writer::FileSink;
use crate::writer::create_destination;
use crate::writer::validate_entry_name;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::io::Write;
use tracing::debug;
use tracing::warn;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;

/// Entry size at which the 32-bit ZIP size fields overflow.
const ZIP64_THRESHOLD: u64 = 0xFFFF_FFFF;

/// Incremental ZIP writer.
///
/// The UTF-8 name flag (general purpose bit 11) is set by the `zip` encoder
/// only for names that are not plain ASCII. ASCII names are written with the
/// flag clear, which every reader decodes identically; the encoder has no
/// option to force the bit.
///
/// # Examples
///
/// ```no_run
/// use arcwrite::{ArchiveWriter, ZipArchiveWriter};
/// use std::fs::File;
///
/// let mut archive = ZipArchiveWriter::create("backup")?; // writes backup.zip
/// archive.add_directory("docs")?;
/// archive.add_file("docs/readme.txt", &mut File::open("README")?)?;
/// archive.close()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct ZipArchiveWriter<W: Write + Seek> {
    name: String,
    writer: ZipWriter<W>,
    buffer: CopyBuffer,
    file_options: SimpleFileOptions,
    entries: usize,
}

impl ZipArchiveWriter<FileSink> {
    /// Creates a ZIP file, appending or correcting the `.zip` extension.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::CreateDestination`] if the file cannot be
    /// created.
    pub fn create(name: &str) -> Result<Self> {
        Self::create_with_config(name, &WriterConfig::default())
    }

    /// Creates a ZIP file with a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the file cannot be
    /// created.
    pub fn create_with_config(name: &str, config: &WriterConfig) -> Result<Self> {
        config.validate()?;
        let name = naming::zip_destination(name);
        let sink = create_destination(&name)?;
        debug!(archive = %name, "created zip destination");
        Ok(Self::bind(name, sink, config))
    }
}

impl<W: Write + Seek> ZipArchiveWriter<W> {
    /// Binds a ZIP encoder to an existing sink.
    ///
    /// `name` is kept as a label only; no I/O happens here.
    pub fn create_writer(name: impl Into<String>, sink: W) -> Self {
        Self::bind(name.into(), sink, &WriterConfig::default())
    }

    /// Binds a ZIP encoder to an existing sink with a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn create_writer_with_config(
        name: impl Into<String>,
        sink: W,
        config: &WriterConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::bind(name.into(), sink, config))
    }

    fn bind(name: String, sink: W, config: &WriterConfig) -> Self {
        let file_options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(config.zip_level());

        Self {
            name,
            writer: ZipWriter::new(sink),
            buffer: CopyBuffer::with_size(config.copy_buffer_size),
            file_options,
            entries: 0,
        }
    }

    /// Number of entries written so far.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.entries
    }
}

impl<W: Write + Seek> ArchiveWriter for ZipArchiveWriter<W> {
    type Sink = W;

    fn name(&self) -> &str {
        &self.name
    }

    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Zip
    }

    /// Copies `source` from its current position to its end into a new
    /// deflate entry. The source is left at its end.
    ///
    /// Entries whose remaining source length reaches 4 GiB get zip64
    /// extra fields.
    fn add_file<R: Read + Seek + ?Sized>(
        &mut self,
        entry_name: &str,
        source: &mut R,
    ) -> Result<()> {
        validate_entry_name(entry_name)?;

        let remaining = remaining_len(source).map_err(|source| ArchiveError::Source {
            name: entry_name.to_string(),
            source,
        })?;
        let options = self.file_options.large_file(remaining >= ZIP64_THRESHOLD);

        self.writer
            .start_file(entry_name, options)
            .map_err(|source| ArchiveError::Zip {
                name: entry_name.to_string(),
                source,
            })?;

        let copied =
            copy_with_buffer(source, &mut self.writer, &mut self.buffer).map_err(|e| match e {
                CopyError::Read(source) => ArchiveError::Source {
                    name: entry_name.to_string(),
                    source,
                },
                CopyError::Write(source) => ArchiveError::Write {
                    name: entry_name.to_string(),
                    source,
                },
            })?;

        self.entries += 1;
        debug!(archive = %self.name, entry = entry_name, bytes = copied, "added zip file entry");
        Ok(())
    }

    fn add_directory(&mut self, entry_name: &str) -> Result<()> {
        validate_entry_name(entry_name)?;
        let dir_name = naming::directory_entry_name(entry_name);

        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        self.writer
            .add_directory(dir_name.as_str(), options)
            .map_err(|source| ArchiveError::Zip {
                name: dir_name.clone(),
                source,
            })?;

        self.entries += 1;
        debug!(archive = %self.name, entry = %dir_name, "added zip directory entry");
        Ok(())
    }

    /// Writes the central directory, then flushes the sink.
    ///
    /// A flush failure after a successful finish is logged and not returned:
    /// the archive bytes are complete at that point and the finish result is
    /// the one callers act on.
    fn close(self) -> Result<W> {
        let Self {
            name,
            writer,
            entries,
            ..
        } = self;

        let mut sink = writer.finish().map_err(|e| ArchiveError::Finalize {
            stage: FinalizeStage::Zip,
            source: zip_error_to_io(e),
        })?;

        if let Err(e) = sink.flush() {
            warn!(archive = %name, error = %e, "ignoring error while releasing zip sink");
        }

        debug!(archive = %name, entries, "closed zip archive");
        Ok(sink)
    }
}

impl<W: Write + Seek> std::fmt::Debug for ZipArchiveWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZipArchiveWriter")
            .field("name", &self.name)
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

/// Bytes between the current position of `source` and its end. The position
/// is restored.
fn remaining_len<R: Seek + ?Sized>(source: &mut R) -> std::io::Result<u64> {
    let position = source.stream_position()?;
    let end = source.seek(SeekFrom::End(0))?;
    if end != position {
        source.seek(SeekFrom::Start(position))?;
    }
    Ok(end.saturating_sub(position))
}

fn zip_error_to_io(err: ZipError) -> std::io::Error {
    match err {
        ZipError::Io(e) => e,
        other => std::io::Error::other(other),
    }
}
