//! Buffered copy of entry data into an archive stream.
//!
//! Read and write failures are reported separately so the writers can tell a
//! broken byte source apart from a broken archive sink.

use std::io::Read;
use std::io::Write;
use std::io::{self};

use crate::config::DEFAULT_COPY_BUFFER_SIZE;

/// Reusable heap buffer for entry copies.
///
/// # Examples
///
/// ```
/// use arcwrite::copy::{CopyBuffer, copy_with_buffer};
/// use std::io::Cursor;
///
/// let mut buffer = CopyBuffer::new();
/// let mut input = Cursor::new(b"hello".to_vec());
/// let mut output = Vec::new();
///
/// let copied = copy_with_buffer(&mut input, &mut output, &mut buffer).unwrap();
/// assert_eq!(copied, 5);
/// assert_eq!(output, b"hello");
/// ```
#[derive(Debug)]
pub struct CopyBuffer {
    buf: Vec<u8>,
}

impl CopyBuffer {
    /// Creates a buffer of the default size (128 KiB).
    #[must_use]
    pub fn new() -> Self {
        Self::with_size(DEFAULT_COPY_BUFFER_SIZE)
    }

    /// Creates a buffer of `size` bytes (at least one byte).
    #[must_use]
    pub fn with_size(size: usize) -> Self {
        Self {
            buf: vec![0u8; size.max(1)],
        }
    }

    /// Returns the buffer size in bytes.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.buf.len()
    }
}

impl Default for CopyBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Side of a copy that failed.
#[derive(Debug)]
pub enum CopyError {
    /// Reading from the source failed.
    Read(io::Error),
    /// Writing to the destination failed.
    Write(io::Error),
}

/// Copies `reader` to its end into `writer` through `buffer`.
///
/// Returns the number of bytes copied.
///
/// # Errors
///
/// Returns [`CopyError::Read`] if the reader fails and [`CopyError::Write`]
/// if the writer fails. Interrupted reads are retried.
pub fn copy_with_buffer<R: Read + ?Sized, W: Write + ?Sized>(
    reader: &mut R,
    writer: &mut W,
    buffer: &mut CopyBuffer,
) -> Result<u64, CopyError> {
    let mut total: u64 = 0;

    loop {
        let bytes_read = match reader.read(&mut buffer.buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CopyError::Read(e)),
        };

        writer
            .write_all(&buffer.buf[..bytes_read])
            .map_err(CopyError::Write)?;

        total += bytes_read as u64;
    }

    Ok(total)
}
