//! Directory-tree archiving.
//!
//! [`walk_tree`] visits a filesystem tree and hands each directory and
//! regular file to a visitor together with its archive entry name.
//! [`add_all`] is the visitor that feeds any [`ArchiveWriter`], so both
//! formats share one tree-archiving algorithm.

use crate::ArchiveError;
use crate::Result;
use crate::config::WriterConfig;
use crate::creation::report::AddAllReport;
use crate::writer::ArchiveWriter;
use std::fs::File;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;
use tracing::debug;
use walkdir::WalkDir;

/// Kind of a visited filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkEntryKind {
    /// Directory.
    Directory,
    /// Regular file.
    File,
}

/// A filesystem entry with its computed archive name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Full filesystem path.
    pub path: PathBuf,

    /// Name to use inside the archive, `/`-separated, without a trailing `/`.
    pub entry_name: String,

    /// Directory or regular file.
    pub kind: WalkEntryKind,

    /// Size in bytes (0 for directories).
    pub size: u64,
}

/// Outcome of a [`walk_tree`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkSummary {
    /// Entries handed to the visitor.
    pub visited: usize,

    /// Entries that were neither directories nor regular files.
    pub skipped: Vec<PathBuf>,
}

/// Visits every directory and regular file under `root`, depth first.
///
/// Each directory is reported before its contents. The root directory itself
/// is only reported when `include_root` is set, in which case its name also
/// prefixes every entry name. Regular files are opened and passed to the
/// visitor as `Some(file)`; directories get `None`. A root that is a regular
/// file is reported under its own file name.
///
/// Entries that are neither (symlinks when not following them, sockets,
/// devices) are skipped and listed in the summary.
///
/// # Errors
///
/// Stops at the first traversal error, the first file that cannot be opened,
/// or the first error returned by `visit`.
pub fn walk_tree<F>(
    root: &Path,
    include_root: bool,
    config: &WriterConfig,
    mut visit: F,
) -> Result<WalkSummary>
where
    F: FnMut(&WalkEntry, Option<&mut File>) -> Result<()>,
{
    let root_is_dir = std::fs::metadata(root)
        .map_err(|e| walk_failure(root, &e))?
        .is_dir();

    let prefix = if include_root || !root_is_dir {
        Some(root_name(root)?)
    } else {
        None
    };

    let mut walker = WalkDir::new(root).follow_links(config.follow_symlinks);
    if config.sort_entries {
        walker = walker.sort_by_file_name();
    }

    let mut summary = WalkSummary::default();

    for entry in walker {
        let entry = entry.map_err(|e| ArchiveError::Walk {
            path: e.path().unwrap_or(root).to_path_buf(),
            message: e.to_string(),
        })?;

        if entry.depth() == 0 && root_is_dir && !include_root {
            continue;
        }

        let file_type = entry.file_type();
        let kind = if file_type.is_dir() {
            WalkEntryKind::Directory
        } else if file_type.is_file() {
            WalkEntryKind::File
        } else {
            debug!(path = %entry.path().display(), "skipping non-regular entry");
            summary.skipped.push(entry.path().to_path_buf());
            continue;
        };

        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let entry_name = entry_name(relative, prefix.as_deref())?;

        match kind {
            WalkEntryKind::Directory => {
                let walk_entry = WalkEntry {
                    path: entry.path().to_path_buf(),
                    entry_name,
                    kind,
                    size: 0,
                };
                visit(&walk_entry, None)?;
            }
            WalkEntryKind::File => {
                let mut file = File::open(entry.path()).map_err(|source| ArchiveError::Source {
                    name: entry_name.clone(),
                    source,
                })?;
                let size = file.metadata().map(|m| m.len()).unwrap_or_default();
                let walk_entry = WalkEntry {
                    path: entry.path().to_path_buf(),
                    entry_name,
                    kind,
                    size,
                };
                visit(&walk_entry, Some(&mut file))?;
            }
        }

        summary.visited += 1;
    }

    Ok(summary)
}

/// Adds every directory and regular file under `root` to `archive`.
///
/// With `include_root`, the root directory becomes the first entry and its
/// name prefixes all others (`data/`, `data/a.txt`); without it, entries are
/// relative to the root (`a.txt`).
///
/// # Examples
///
/// ```no_run
/// use arcwrite::{ArchiveWriter, TarArchiveWriter, add_all};
///
/// let mut archive = TarArchiveWriter::create("site.tar.gz")?;
/// let report = add_all(&mut archive, "public", true)?;
/// archive.close()?;
/// println!("archived {} files", report.files_added);
/// # Ok::<(), arcwrite::ArchiveError>(())
/// ```
///
/// # Errors
///
/// Returns the first traversal or add-entry error. Entries written before the
/// failure stay in the archive.
pub fn add_all<A: ArchiveWriter>(
    archive: &mut A,
    root: impl AsRef<Path>,
    include_root: bool,
) -> Result<AddAllReport> {
    add_all_with_config(archive, root, include_root, &WriterConfig::default())
}

/// Like [`add_all`], with traversal controlled by `config`.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, or the first traversal
/// or add-entry error.
pub fn add_all_with_config<A: ArchiveWriter>(
    archive: &mut A,
    root: impl AsRef<Path>,
    include_root: bool,
    config: &WriterConfig,
) -> Result<AddAllReport> {
    config.validate()?;
    let root = root.as_ref();
    let start = Instant::now();
    let mut report = AddAllReport::new();

    let summary = walk_tree(root, include_root, config, |entry, file| {
        match file {
            Some(file) => {
                archive.add_file(&entry.entry_name, file)?;
                report.files_added += 1;
                report.bytes_declared += entry.size;
            }
            None => {
                archive.add_directory(&entry.entry_name)?;
                report.directories_added += 1;
            }
        }
        Ok(())
    })?;

    report.entries_skipped = summary.skipped.len();
    for path in &summary.skipped {
        report.add_warning(format!("skipped non-regular entry: {}", path.display()));
    }
    report.duration = start.elapsed();

    debug!(
        archive = archive.name(),
        root = %root.display(),
        files = report.files_added,
        directories = report.directories_added,
        "archived directory tree"
    );
    Ok(report)
}

/// Name used for the root when it prefixes entry names.
fn root_name(root: &Path) -> Result<String> {
    let name = match root.file_name() {
        Some(name) => name.to_os_string(),
        None => root
            .canonicalize()
            .map_err(|e| walk_failure(root, &e))?
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .ok_or_else(|| ArchiveError::Walk {
                path: root.to_path_buf(),
                message: "root has no name to use as a prefix".to_string(),
            })?,
    };

    name.into_string().map_err(|_| ArchiveError::Walk {
        path: root.to_path_buf(),
        message: "path is not valid UTF-8".to_string(),
    })
}

/// Joins `relative` with `/` separators, under `prefix` if given.
fn entry_name(relative: &Path, prefix: Option<&str>) -> Result<String> {
    let mut parts: Vec<&str> = prefix.into_iter().collect();

    for component in relative.components() {
        if let Component::Normal(part) = component {
            let part = part.to_str().ok_or_else(|| ArchiveError::Walk {
                path: relative.to_path_buf(),
                message: "path is not valid UTF-8".to_string(),
            })?;
            parts.push(part);
        }
    }

    Ok(parts.join("/"))
}

fn walk_failure(path: &Path, err: &std::io::Error) -> ArchiveError {
    ArchiveError::Walk {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}
