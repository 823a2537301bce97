//! TAR archive writer with optional gzip compression.
//!
//! The TAR builder always writes into a [`MaybeGzip`] stream, so compression
//! is decided once at construction and is invisible to the entry-writing
//! code. Closing runs inner to outer: TAR end-of-archive blocks, then the
//! gzip trailer, then the sink flush.

use crate::ArchiveError;
use crate::Result;
use crate::config::WriterConfig;
use crate::error::FinalizeStage;
use crate::io::ExactReader;
use crate::io::MaybeGzip;
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
use std::time::SystemTime;
use std::time::UNIX_EPOCH;
use tar::Builder;
use tar::EntryType;
use tar::Header;
use tracing::debug;

/// Mode written for regular file entries.
pub const FILE_MODE: u32 = 0o666;

/// Mode written for directory entries.
pub const DIR_MODE: u32 = 0o777;

/// Incremental TAR writer.
///
/// Entry metadata is fixed: files get mode `0o666`, directories `0o777`, and
/// both carry the wall-clock time of the `add_*` call as their modification
/// time. Ownership fields are zero.
///
/// # Examples
///
/// ```
/// use arcwrite::{ArchiveWriter, TarArchiveWriter};
///
/// // The label decides compression, exactly as a file name would.
/// let mut archive = TarArchiveWriter::create_writer("logs.tar.gz", Vec::new());
/// assert!(archive.is_compressed());
/// archive.add_bytes("today.log", b"all quiet")?;
/// let bytes = archive.close()?;
/// assert_eq!(&bytes[0..2], &[0x1f, 0x8b]);
/// # Ok::<(), arcwrite::ArchiveError>(())
/// ```
pub struct TarArchiveWriter<W: Write> {
    name: String,
    builder: Builder<MaybeGzip<W>>,
    entries: usize,
}

impl TarArchiveWriter<FileSink> {
    /// Creates a TAR file, choosing gzip from the name.
    ///
    /// `.tar.gz` is compressed and `.tar` is plain. A `.zip` suffix is
    /// rewritten to `.tar.gz`; any other name gets `.tar` appended.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::CreateDestination`] if the file cannot be
    /// created.
    pub fn create(name: &str) -> Result<Self> {
        Self::create_with_config(name, &WriterConfig::default())
    }

    /// Creates a TAR file with a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the file cannot be
    /// created.
    pub fn create_with_config(name: &str, config: &WriterConfig) -> Result<Self> {
        config.validate()?;
        let destination = naming::tar_destination(name);
        let sink = create_destination(&destination.name)?;
        debug!(
            archive = %destination.name,
            compressed = destination.compressed,
            "created tar destination"
        );
        Ok(Self::bind(
            destination.name,
            sink,
            destination.compressed,
            config,
        ))
    }
}

impl<W: Write> TarArchiveWriter<W> {
    /// Binds a TAR encoder to an existing sink.
    ///
    /// The name is kept as a label but still decides gzip wrapping: a label
    /// ending in `.tar.gz` or `.zip` produces a compressed stream.
    pub fn create_writer(name: impl Into<String>, sink: W) -> Self {
        let name = name.into();
        let compressed = naming::tar_destination(&name).compressed;
        Self::bind(name, sink, compressed, &WriterConfig::default())
    }

    /// Binds a TAR encoder to an existing sink with a configuration.
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
        let name = name.into();
        let compressed = naming::tar_destination(&name).compressed;
        Ok(Self::bind(name, sink, compressed, config))
    }

    fn bind(name: String, sink: W, compressed: bool, config: &WriterConfig) -> Self {
        let stream = MaybeGzip::new(sink, compressed, config.flate2_level());
        Self {
            name,
            builder: Builder::new(stream),
            entries: 0,
        }
    }

    /// Returns `true` if the TAR stream is gzip-compressed.
    #[must_use]
    pub fn is_compressed(&self) -> bool {
        self.builder.get_ref().is_compressed()
    }

    /// Number of entries written so far.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.entries
    }
}

impl<W: Write> ArchiveWriter for TarArchiveWriter<W> {
    type Sink = W;

    fn name(&self) -> &str {
        &self.name
    }

    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Tar
    }

    /// Measures `source` by seeking to its end, rewinds it, and copies every
    /// byte from the start. The source is left at its end.
    fn add_file<R: Read + Seek + ?Sized>(
        &mut self,
        entry_name: &str,
        source: &mut R,
    ) -> Result<()> {
        validate_entry_name(entry_name)?;

        let source_error = |source: std::io::Error| ArchiveError::Source {
            name: entry_name.to_string(),
            source,
        };
        let size = source.seek(SeekFrom::End(0)).map_err(source_error)?;
        source.seek(SeekFrom::Start(0)).map_err(source_error)?;

        let mut header = entry_header(EntryType::Regular, size, FILE_MODE);
        let mut reader = ExactReader::new(&mut *source, size);
        let result = self
            .builder
            .append_data(&mut header, entry_name, &mut reader);

        if let Err(e) = result {
            return Err(if reader.source_failed() {
                source_error(e)
            } else {
                ArchiveError::Write {
                    name: entry_name.to_string(),
                    source: e,
                }
            });
        }

        self.entries += 1;
        debug!(archive = %self.name, entry = entry_name, bytes = size, "added tar file entry");
        Ok(())
    }

    fn add_directory(&mut self, entry_name: &str) -> Result<()> {
        validate_entry_name(entry_name)?;
        let dir_name = naming::directory_entry_name(entry_name);

        let mut header = entry_header(EntryType::Directory, 0, DIR_MODE);
        self.builder
            .append_data(&mut header, &dir_name, std::io::empty())
            .map_err(|source| ArchiveError::Write {
                name: dir_name.clone(),
                source,
            })?;

        self.entries += 1;
        debug!(archive = %self.name, entry = %dir_name, "added tar directory entry");
        Ok(())
    }

    /// Finalizes TAR, then gzip, then flushes the sink.
    ///
    /// A gzip failure returns immediately; the sink is not flushed, so the
    /// more informative error is the one reported.
    fn close(self) -> Result<W> {
        let Self {
            name,
            mut builder,
            entries,
        } = self;

        let tar_error = |source: std::io::Error| ArchiveError::Finalize {
            stage: FinalizeStage::Tar,
            source,
        };
        builder.finish().map_err(tar_error)?;
        let stream = builder.into_inner().map_err(tar_error)?;

        let mut sink = stream.finish().map_err(|source| ArchiveError::Finalize {
            stage: FinalizeStage::Gzip,
            source,
        })?;

        sink.flush().map_err(|source| ArchiveError::Finalize {
            stage: FinalizeStage::Sink,
            source,
        })?;

        debug!(archive = %name, entries, "closed tar archive");
        Ok(sink)
    }
}

impl<W: Write> std::fmt::Debug for TarArchiveWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TarArchiveWriter")
            .field("name", &self.name)
            .field("compressed", &self.is_compressed())
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

/// Builds a GNU header with fixed mode and the current time.
fn entry_header(entry_type: EntryType, size: u64, mode: u32) -> Header {
    let mut header = Header::new_gnu();
    header.set_entry_type(entry_type);
    header.set_size(size);
    header.set_mode(mode);
    header.set_mtime(now_unix_seconds());
    header
}

fn now_unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::cell::Cell;
    use std::fs;
    use std::io::Cursor;
    use std::io::{self};
    use std::rc::Rc;
    use tar::Archive;
    use tempfile::TempDir;

    fn read_entries<R: Read>(reader: R) -> Vec<(String, EntryType, u32, Vec<u8>)> {
        let mut archive = Archive::new(reader);
        archive
            .entries()
            .unwrap()
            .map(|entry| {
                let mut entry = entry.unwrap();
                let name = String::from_utf8(entry.path_bytes().into_owned()).unwrap();
                let kind = entry.header().entry_type();
                let mode = entry.header().mode().unwrap();
                let mut data = Vec::new();
                entry.read_to_end(&mut data).unwrap();
                (name, kind, mode, data)
            })
            .collect()
    }

    /// Source whose end seek reports more bytes than it will deliver.
    struct ShrinkingSource {
        inner: Cursor<Vec<u8>>,
        claimed: u64,
    }

    impl Read for ShrinkingSource {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.inner.read(buf)
        }
    }

    impl Seek for ShrinkingSource {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            match pos {
                SeekFrom::End(0) => Ok(self.claimed),
                other => self.inner.seek(other),
            }
        }
    }

    struct UnseekableSource;

    impl Read for UnseekableSource {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Ok(0)
        }
    }

    impl Seek for UnseekableSource {
        fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
            Err(io::Error::new(io::ErrorKind::Unsupported, "not seekable"))
        }
    }

    /// Sink that accepts writes but fails to flush.
    #[derive(Debug)]
    struct FailingFlush(Vec<u8>);

    impl Write for FailingFlush {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::other("flush refused"))
        }
    }

    /// Sink that refuses writes past `limit` bytes and counts flushes.
    #[derive(Debug)]
    struct CappedSink {
        written: usize,
        limit: usize,
        flushes: Rc<Cell<usize>>,
    }

    impl Write for CappedSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.written + buf.len() > self.limit {
                return Err(io::Error::other("sink full"));
            }
            self.written += buf.len();
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes.set(self.flushes.get() + 1);
            Ok(())
        }
    }

    #[test]
    fn test_create_plain_tar() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("out");

        let mut archive = TarArchiveWriter::create(base.to_str().unwrap()).unwrap();
        assert!(!archive.is_compressed());
        assert!(archive.name().ends_with("out.tar"));
        archive.add_bytes("a.txt", b"hello").unwrap();
        archive.close().unwrap();

        let file = fs::File::open(temp.path().join("out.tar")).unwrap();
        let entries = read_entries(file);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "a.txt");
        assert_eq!(entries[0].3, b"hello");
    }

    #[test]
    fn test_create_zip_name_becomes_tar_gz() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("out.zip");

        let mut archive = TarArchiveWriter::create(base.to_str().unwrap()).unwrap();
        assert!(archive.is_compressed());
        assert!(archive.name().ends_with("out.tar.gz"));
        archive.add_bytes("a.txt", b"hello").unwrap();
        archive.close().unwrap();

        assert!(!temp.path().join("out.zip").exists());
        let file = fs::File::open(temp.path().join("out.tar.gz")).unwrap();
        let entries = read_entries(GzDecoder::new(file));
        assert_eq!(entries[0].3, b"hello");
    }

    #[test]
    fn test_create_writer_detects_compression_from_label() {
        assert!(TarArchiveWriter::create_writer("x.tar.gz", Vec::new()).is_compressed());
        assert!(TarArchiveWriter::create_writer("x.zip", Vec::new()).is_compressed());
        assert!(!TarArchiveWriter::create_writer("x.tar", Vec::new()).is_compressed());
        assert!(!TarArchiveWriter::create_writer("x", Vec::new()).is_compressed());

        let archive = TarArchiveWriter::create_writer("x.zip", Vec::new());
        assert_eq!(archive.name(), "x.zip");
    }

    #[test]
    fn test_file_header_fields() {
        let before = now_unix_seconds();
        let mut archive = TarArchiveWriter::create_writer("mem.tar", Vec::new());
        archive.add_bytes("f.bin", &[1, 2, 3, 4]).unwrap();
        let bytes = archive.close().unwrap();

        let mut reader = Archive::new(bytes.as_slice());
        let entry = reader.entries().unwrap().next().unwrap().unwrap();
        let header = entry.header();
        assert_eq!(header.entry_type(), EntryType::Regular);
        assert_eq!(header.size().unwrap(), 4);
        assert_eq!(header.mode().unwrap(), FILE_MODE);
        assert!(header.mtime().unwrap() >= before);
    }

    #[test]
    fn test_directory_then_file() {
        let mut archive = TarArchiveWriter::create_writer("mem.tar", Vec::new());
        archive.add_directory("sub").unwrap();
        archive.add_bytes("sub/f.txt", b"data").unwrap();
        assert_eq!(archive.entry_count(), 2);
        let bytes = archive.close().unwrap();

        let entries = read_entries(bytes.as_slice());
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, "sub/");
        assert_eq!(entries[0].1, EntryType::Directory);
        assert_eq!(entries[0].2, DIR_MODE);
        assert!(entries[0].3.is_empty());
        assert_eq!(entries[1].0, "sub/f.txt");
        assert_eq!(entries[1].3, b"data");
    }

    #[test]
    fn test_add_file_rewinds_and_consumes_source() {
        let mut source = Cursor::new(b"full contents".to_vec());
        source.set_position(5);

        let mut archive = TarArchiveWriter::create_writer("mem.tar", Vec::new());
        archive.add_file("f.txt", &mut source).unwrap();
        assert_eq!(source.stream_position().unwrap(), 13);

        let entries = read_entries(archive.close().unwrap().as_slice());
        assert_eq!(entries[0].3, b"full contents");
    }

    #[test]
    fn test_long_entry_name() {
        let long_name = format!("{}/file.txt", "nested".repeat(30));
        let mut archive = TarArchiveWriter::create_writer("mem.tar", Vec::new());
        archive.add_bytes(&long_name, b"deep").unwrap();

        let entries = read_entries(archive.close().unwrap().as_slice());
        assert_eq!(entries[0].0, long_name);
        assert_eq!(entries[0].3, b"deep");
    }

    #[test]
    fn test_empty_archive_is_padding_only() {
        let archive = TarArchiveWriter::create_writer("mem.tar", Vec::new());
        let bytes = archive.close().unwrap();

        assert_eq!(bytes.len(), 1024);
        assert!(bytes.iter().all(|b| *b == 0));
        assert!(read_entries(bytes.as_slice()).is_empty());
    }

    #[test]
    fn test_empty_compressed_archive() {
        let archive = TarArchiveWriter::create_writer("mem.tar.gz", Vec::new());
        let bytes = archive.close().unwrap();

        let mut decoded = Vec::new();
        GzDecoder::new(bytes.as_slice())
            .read_to_end(&mut decoded)
            .unwrap();
        assert_eq!(decoded, vec![0u8; 1024]);
    }

    #[test]
    fn test_short_source_is_source_error() {
        let mut source = ShrinkingSource {
            inner: Cursor::new(b"abc".to_vec()),
            claimed: 10,
        };

        let mut archive = TarArchiveWriter::create_writer("mem.tar", Vec::new());
        let err = archive.add_file("short.txt", &mut source).unwrap_err();
        assert!(matches!(err, ArchiveError::Source { .. }));
    }

    #[test]
    fn test_seek_failure_is_source_error() {
        let mut archive = TarArchiveWriter::create_writer("mem.tar", Vec::new());
        let err = archive
            .add_file("nope.txt", &mut UnseekableSource)
            .unwrap_err();
        assert!(matches!(err, ArchiveError::Source { .. }));
        assert_eq!(archive.entry_count(), 0);
    }

    #[test]
    fn test_parent_component_rejected() {
        let mut archive = TarArchiveWriter::create_writer("mem.tar", Vec::new());
        let err = archive.add_bytes("../escape.txt", b"x").unwrap_err();
        assert!(matches!(err, ArchiveError::Write { .. }));
    }

    #[test]
    fn test_sink_flush_error_is_returned() {
        let archive = TarArchiveWriter::create_writer("mem.tar", FailingFlush(Vec::new()));
        let err = archive.close().unwrap_err();
        assert!(matches!(
            err,
            ArchiveError::Finalize {
                stage: FinalizeStage::Sink,
                ..
            }
        ));
    }

    #[test]
    fn test_gzip_trailer_failure_skips_sink_flush() {
        let complete = TarArchiveWriter::create_writer("mem.tar.gz", Vec::new())
            .close()
            .unwrap();
        // Room for everything but the 8-byte gzip trailer.
        let limit = complete.len() - 8;

        let flushes = Rc::new(Cell::new(0));
        let sink = CappedSink {
            written: 0,
            limit,
            flushes: Rc::clone(&flushes),
        };
        let err = TarArchiveWriter::create_writer("mem.tar.gz", sink)
            .close()
            .unwrap_err();

        assert!(matches!(
            err,
            ArchiveError::Finalize {
                stage: FinalizeStage::Gzip,
                ..
            }
        ));
        assert_eq!(flushes.get(), 0);
    }

    #[test]
    fn test_successful_close_flushes_sink_once() {
        let flushes = Rc::new(Cell::new(0));
        let sink = CappedSink {
            written: 0,
            limit: usize::MAX,
            flushes: Rc::clone(&flushes),
        };
        let mut archive = TarArchiveWriter::create_writer("mem.tar", sink);
        archive.add_bytes("a.txt", b"hello").unwrap();
        archive.close().unwrap();

        assert_eq!(flushes.get(), 1);
    }
}
