//! Configuration for archive writers.

use crate::ArchiveError;
use crate::Result;

/// Default copy buffer size for ZIP entry data (128 KiB).
pub const DEFAULT_COPY_BUFFER_SIZE: usize = 128 * 1024;

/// Configuration shared by both archive writers and [`add_all`].
///
/// The defaults reproduce the plain `create`/`create_writer` behavior, so a
/// writer built with `WriterConfig::default()` is byte-for-byte identical to
/// one built without a config.
///
/// # Examples
///
/// ```
/// use arcwrite::WriterConfig;
///
/// let config = WriterConfig::default()
///     .with_compression_level(9)
///     .with_follow_symlinks(true);
/// assert!(config.validate().is_ok());
/// ```
///
/// [`add_all`]: crate::add_all
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterConfig {
    /// Compression level (1-9) for ZIP deflate and the gzip wrapper.
    ///
    /// `None` uses the codec default.
    ///
    /// Default: `None`.
    pub compression_level: Option<u8>,

    /// Buffer size used when copying ZIP entry data.
    ///
    /// Default: 128 KiB.
    pub copy_buffer_size: usize,

    /// Visit directory entries sorted by file name in [`add_all`].
    ///
    /// Default: `true`.
    ///
    /// [`add_all`]: crate::add_all
    pub sort_entries: bool,

    /// Follow symlinks in [`add_all`].
    ///
    /// When `false`, symlinks are skipped and counted in the report.
    ///
    /// Default: `false`.
    ///
    /// [`add_all`]: crate::add_all
    pub follow_symlinks: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            compression_level: None,
            copy_buffer_size: DEFAULT_COPY_BUFFER_SIZE,
            sort_entries: true,
            follow_symlinks: false,
        }
    }
}

impl WriterConfig {
    /// Creates a new `WriterConfig` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the compression level.
    ///
    /// # Panics
    ///
    /// Panics if the compression level is not in the range 1-9.
    /// Use `validate()` for non-panicking validation.
    #[must_use]
    pub fn with_compression_level(mut self, level: u8) -> Self {
        assert!((1..=9).contains(&level), "compression level must be 1-9");
        self.compression_level = Some(level);
        self
    }

    /// Sets the copy buffer size.
    #[must_use]
    pub fn with_copy_buffer_size(mut self, size: usize) -> Self {
        self.copy_buffer_size = size;
        self
    }

    /// Sets whether traversal output is sorted by file name.
    #[must_use]
    pub fn with_sort_entries(mut self, sort: bool) -> Self {
        self.sort_entries = sort;
        self
    }

    /// Sets whether to follow symlinks during traversal.
    #[must_use]
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Compression level is set but not in range 1-9
    /// - Copy buffer size is zero
    pub fn validate(&self) -> Result<()> {
        if let Some(level) = self.compression_level
            && !(1..=9).contains(&level)
        {
            return Err(ArchiveError::InvalidCompressionLevel { level });
        }
        if self.copy_buffer_size == 0 {
            return Err(ArchiveError::InvalidBufferSize);
        }
        Ok(())
    }

    pub(crate) fn flate2_level(&self) -> flate2::Compression {
        self.compression_level
            .map_or_else(flate2::Compression::default, |level| {
                flate2::Compression::new(u32::from(level))
            })
    }

    pub(crate) fn zip_level(&self) -> Option<i64> {
        self.compression_level.map(i64::from)
    }
}
