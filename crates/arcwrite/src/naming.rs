//! Destination naming policy.
//!
//! File-backed writers correct the destination extension so it matches the
//! chosen container format instead of failing on a mismatched name. Both
//! rules are idempotent: a name that already carries the right suffix comes
//! back unchanged.

const ZIP_SUFFIX: &str = ".zip";
const TAR_SUFFIX: &str = ".tar";
const TAR_GZ_SUFFIX: &str = ".tar.gz";

/// Destination chosen for a TAR archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TarDestination {
    /// Normalized destination name.
    pub name: String,
    /// Whether the TAR stream is wrapped in gzip.
    pub compressed: bool,
}

/// Normalizes a ZIP destination name.
///
/// Names ending in `.zip` are kept. A trailing `.tar.gz` is rewritten to
/// `.zip`; anything else gets `.zip` appended.
///
/// # Examples
///
/// ```
/// use arcwrite::naming::zip_destination;
///
/// assert_eq!(zip_destination("out"), "out.zip");
/// assert_eq!(zip_destination("out.zip"), "out.zip");
/// assert_eq!(zip_destination("out.tar.gz"), "out.zip");
/// ```
#[must_use]
pub fn zip_destination(name: &str) -> String {
    if name.ends_with(ZIP_SUFFIX) {
        return name.to_string();
    }
    match name.strip_suffix(TAR_GZ_SUFFIX) {
        Some(stem) => format!("{stem}{ZIP_SUFFIX}"),
        None => format!("{name}{ZIP_SUFFIX}"),
    }
}

/// Normalizes a TAR destination name and decides on gzip wrapping.
///
/// `.tar.gz` means compressed and `.tar` means plain; both are kept as-is. A
/// trailing `.zip` becomes `.tar.gz` (compressed), anything else gets `.tar`
/// appended (plain).
///
/// # Examples
///
/// ```
/// use arcwrite::naming::tar_destination;
///
/// let dest = tar_destination("out.zip");
/// assert_eq!(dest.name, "out.tar.gz");
/// assert!(dest.compressed);
///
/// let dest = tar_destination("out");
/// assert_eq!(dest.name, "out.tar");
/// assert!(!dest.compressed);
/// ```
#[must_use]
pub fn tar_destination(name: &str) -> TarDestination {
    if name.ends_with(TAR_GZ_SUFFIX) {
        return TarDestination {
            name: name.to_string(),
            compressed: true,
        };
    }
    if name.ends_with(TAR_SUFFIX) {
        return TarDestination {
            name: name.to_string(),
            compressed: false,
        };
    }
    match name.strip_suffix(ZIP_SUFFIX) {
        Some(stem) => TarDestination {
            name: format!("{stem}{TAR_GZ_SUFFIX}"),
            compressed: true,
        },
        None => TarDestination {
            name: format!("{name}{TAR_SUFFIX}"),
            compressed: false,
        },
    }
}

/// Appends a trailing `/` to a directory entry name if it lacks one.
pub(crate) fn directory_entry_name(name: &str) -> String {
    if name.ends_with('/') {
        name.to_string()
    } else {
        format!("{name}/")
    }
}
