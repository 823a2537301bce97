//! I/O wrappers used by the archive writers.

pub mod exact;
pub mod gzip;

pub use exact::ExactReader;
pub use gzip::MaybeGzip;
