//! Path utilities
//!
//! Results carry absolute paths; user-supplied paths are resolved against root.

use std::path::{Path, PathBuf};

/// Render a path for output
pub fn display_path(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Resolve a user-supplied path against root (absolute paths are kept as-is)
pub fn resolve_under(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Canonicalize a root directory, falling back to the path as given
pub fn absolute_root(root: &Path) -> PathBuf {
    root.canonicalize().unwrap_or_else(|_| root.to_path_buf())
}

/// Check whether the file name (not the full path) ends with `suffix`.
///
/// The comparison is a plain case-sensitive string suffix test, so both
/// ".csv" and "csv" select `report.csv`.
pub fn name_ends_with(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().ends_with(suffix))
        .unwrap_or(false)
}

/// Target path for placing `source` inside `dest_dir`, keeping its file name
pub fn destination_for(source: &Path, dest_dir: &Path) -> Option<PathBuf> {
    source.file_name().map(|name| dest_dir.join(name))
}
