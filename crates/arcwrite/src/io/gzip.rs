//! Optional gzip layer under the TAR block writer.

use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::Write;
use std::io::{self};

/// Output stream that is either the raw sink or a gzip encoder around it.
///
/// The TAR builder writes into this without knowing which variant it has;
/// compression, if any, happens transparently below the block writer.
#[derive(Debug)]
pub enum MaybeGzip<W: Write> {
    /// Bytes go straight to the sink.
    Plain(W),
    /// Bytes are gzip-compressed before reaching the sink.
    Gzip(GzEncoder<W>),
}

impl<W: Write> MaybeGzip<W> {
    /// Wraps `sink`, adding a gzip encoder when `compressed` is set.
    pub fn new(sink: W, compressed: bool, level: Compression) -> Self {
        if compressed {
            Self::Gzip(GzEncoder::new(sink, level))
        } else {
            Self::Plain(sink)
        }
    }

    /// Returns `true` if a gzip encoder is active.
    #[must_use]
    pub fn is_compressed(&self) -> bool {
        matches!(self, Self::Gzip(_))
    }

    /// Returns a reference to the underlying sink.
    #[must_use]
    pub fn get_ref(&self) -> &W {
        match self {
            Self::Plain(sink) => sink,
            Self::Gzip(encoder) => encoder.get_ref(),
        }
    }

    /// Writes the gzip trailer (if any) and returns the sink.
    ///
    /// The sink itself is not flushed here.
    ///
    /// # Errors
    ///
    /// Returns an error if the compressed trailer cannot be written.
    pub fn finish(self) -> io::Result<W> {
        match self {
            Self::Plain(sink) => Ok(sink),
            Self::Gzip(encoder) => encoder.finish(),
        }
    }
}

impl<W: Write> Write for MaybeGzip<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(sink) => sink.write(buf),
            Self::Gzip(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(sink) => sink.flush(),
            Self::Gzip(encoder) => encoder.flush(),
        }
    }
}
