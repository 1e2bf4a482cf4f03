//! Delete files in place

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use super::{finish_batch, run_batch, OpError, Operation};
use crate::core::render::RenderConfig;
use crate::core::status::Status;

pub fn delete_file(path: &Path) -> Result<(), OpError> {
    fs::remove_file(path).map_err(|e| OpError::Delete {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Run the delete command
pub fn run_delete(
    paths: &[PathBuf],
    fail_fast: bool,
    config: RenderConfig,
    status: Status,
) -> Result<()> {
    let result_set = run_batch(Operation::Delete, paths, fail_fast, |p| {
        delete_file(p).map(|_| None)
    });
    finish_batch(&result_set, config, status, "Selected files deleted!")
}
