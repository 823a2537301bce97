//! Reporting for directory-tree archiving.

use std::time::Duration;

/// Summary of an [`add_all`](crate::add_all) run.
///
/// # Examples
///
/// ```
/// use arcwrite::AddAllReport;
///
/// let mut report = AddAllReport::default();
/// report.files_added = 3;
/// report.directories_added = 1;
/// assert_eq!(report.total_entries(), 4);
/// assert!(!report.has_warnings());
/// ```
#[derive(Debug, Clone, Default)]
pub struct AddAllReport {
    /// Number of regular files added.
    pub files_added: usize,

    /// Number of directory entries added.
    pub directories_added: usize,

    /// Sum of the added files' sizes as reported by their metadata when each
    /// was opened. A file that grows or shrinks while it is being archived
    /// makes this differ from the bytes actually copied.
    pub bytes_declared: u64,

    /// Number of filesystem entries that were neither files nor directories.
    pub entries_skipped: usize,

    /// Wall-clock time spent walking and writing.
    pub duration: Duration,

    /// Warnings generated while walking.
    pub warnings: Vec<String>,
}

impl AddAllReport {
    /// Creates a new empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries written to the archive.
    #[must_use]
    pub fn total_entries(&self) -> usize {
        self.files_added + self.directories_added
    }

    /// Adds a warning message to the report.
    ///
    /// # Examples
    ///
    /// ```
    /// use arcwrite::AddAllReport;
    ///
    /// let mut report = AddAllReport::new();
    /// report.add_warning("skipped symlink: data/link");
    /// assert!(report.has_warnings());
    /// ```
    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Returns whether any warnings were generated.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
