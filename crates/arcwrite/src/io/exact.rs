//! Reader that yields exactly a declared number of bytes.
//!
//! TAR headers carry the entry size up front, so the data that follows must
//! match it. `ExactReader` caps the source at the declared size and turns an
//! early end of data into an error instead of a silently corrupt archive.

use std::io::Read;
use std::io::{self};

/// Wrapper reader that delivers exactly `expected` bytes from `inner`.
///
/// Any failure that originates in the wrapped source (read error or early
/// end of data) is recorded, so callers can tell it apart from failures on
/// the write side of a copy.
///
/// # Examples
///
/// ```
/// use arcwrite::io::ExactReader;
/// use std::io::{Cursor, Read};
///
/// let mut reader = ExactReader::new(Cursor::new(b"hello world".to_vec()), 5);
/// let mut out = String::new();
/// reader.read_to_string(&mut out)?;
/// assert_eq!(out, "hello");
/// assert!(!reader.source_failed());
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct ExactReader<R> {
    inner: R,
    remaining: u64,
    source_failed: bool,
}

impl<R> ExactReader<R> {
    /// Creates a reader that will deliver `expected` bytes from `inner`.
    #[must_use]
    pub fn new(inner: R, expected: u64) -> Self {
        Self {
            inner,
            remaining: expected,
            source_failed: false,
        }
    }

    /// Returns `true` if the wrapped source failed or ended early.
    #[must_use]
    pub fn source_failed(&self) -> bool {
        self.source_failed
    }

    /// Bytes still owed by the source.
    #[must_use]
    pub fn remaining(&self) -> u64 {
        self.remaining
    }
}

impl<R: Read> Read for ExactReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 || buf.is_empty() {
            return Ok(0);
        }

        let limit = usize::try_from(self.remaining).map_or(buf.len(), |r| r.min(buf.len()));
        let bytes_read = match self.inner.read(&mut buf[..limit]) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => return Err(e),
            Err(e) => {
                self.source_failed = true;
                return Err(e);
            }
        };

        if bytes_read == 0 {
            self.source_failed = true;
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("source ended {} bytes short", self.remaining),
            ));
        }

        self.remaining -= bytes_read as u64;
        Ok(bytes_read)
    }
}
