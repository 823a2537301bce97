//! Archive writers and the directory-tree driver.
//!
//! [`zip`] and [`tar`] implement [`ArchiveWriter`](crate::ArchiveWriter);
//! [`walker`] feeds either of them from a filesystem tree.

pub mod report;
pub mod tar;
pub mod walker;
pub mod zip;

// Re-exports for public API
pub use self::report::AddAllReport;
pub use self::tar::TarArchiveWriter;
pub use self::walker::WalkEntry;
pub use self::walker::WalkEntryKind;
pub use self::walker::WalkSummary;
pub use self::walker::add_all;
pub use self::walker::add_all_with_config;
pub use self::walker::walk_tree;
pub use self::zip::ZipArchiveWriter;
