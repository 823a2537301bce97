//! Incremental archive writers for ZIP and TAR.
//!
//! `arcwrite` builds archives one entry at a time: open a destination, add
//! files and directories from any seekable byte source, then close. ZIP and
//! TAR (optionally gzip-compressed) sit behind one [`ArchiveWriter`] trait,
//! and [`add_all`] archives a whole directory tree into either.
//!
//! # Examples
//!
//! ```no_run
//! use arcwrite::{ArchiveWriter, TarArchiveWriter, ZipArchiveWriter, add_all};
//!
//! # fn main() -> Result<(), arcwrite::ArchiveError> {
//! // "out" becomes out.zip
//! let mut zip = ZipArchiveWriter::create("out")?;
//! zip.add_bytes("a.txt", b"hello")?;
//! zip.close()?;
//!
//! // ".zip" on a TAR writer becomes a gzip-compressed out.tar.gz
//! let mut tar = TarArchiveWriter::create("out.zip")?;
//! add_all(&mut tar, "src", true)?;
//! tar.close()?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod copy;
pub mod creation;
pub mod error;
pub mod io;
pub mod naming;
pub mod writer;

// Re-export main API types
pub use config::WriterConfig;
pub use creation::AddAllReport;
pub use creation::TarArchiveWriter;
pub use creation::ZipArchiveWriter;
pub use creation::add_all;
pub use creation::add_all_with_config;
pub use creation::walk_tree;
pub use error::ArchiveError;
pub use error::Result;
pub use writer::AnyArchiveWriter;
pub use writer::ArchiveFormat;
pub use writer::ArchiveWriter;
pub use writer::FileSink;
