//! Common utilities

use chrono::{DateTime, Utc};
use std::path::Path;

use crate::core::model::Meta;

/// Get file modification time
pub fn get_modified(path: &Path) -> std::io::Result<DateTime<Utc>> {
    let metadata = std::fs::metadata(path)?;
    Ok(DateTime::<Utc>::from(metadata.modified()?))
}

/// Get file size in bytes
pub fn get_file_size(path: &Path) -> std::io::Result<u64> {
    let metadata = std::fs::metadata(path)?;
    Ok(metadata.len())
}

/// Collect size and modification time, ignoring what the platform cannot report
pub fn file_meta(path: &Path) -> Meta {
    Meta {
        modified: get_modified(path).ok(),
        size: get_file_size(path).ok(),
        ..Default::default()
    }
}
