//! Copy and move into a destination directory, keeping file names.
//! Existing files at the destination are overwritten.

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use super::{finish_batch, run_batch, OpError, Operation};
use crate::core::paths::destination_for;
use crate::core::render::RenderConfig;
use crate::core::status::Status;

fn target_in(source: &Path, dest_dir: &Path) -> Result<PathBuf, OpError> {
    if !dest_dir.is_dir() {
        return Err(OpError::BadDestination(dest_dir.to_path_buf()));
    }
    if !source.is_file() {
        return Err(OpError::Missing(source.to_path_buf()));
    }
    let target =
        destination_for(source, dest_dir).ok_or_else(|| OpError::Missing(source.to_path_buf()))?;

    if let (Ok(a), Ok(b)) = (source.canonicalize(), target.canonicalize()) {
        if a == b {
            return Err(OpError::SameFile(source.to_path_buf()));
        }
    }
    Ok(target)
}

/// Copy `source` into `dest_dir`
pub fn copy_file(source: &Path, dest_dir: &Path) -> Result<PathBuf, OpError> {
    let target = target_in(source, dest_dir)?;
    fs::copy(source, &target).map_err(|e| OpError::Copy {
        from: source.to_path_buf(),
        to: target.clone(),
        source: e,
    })?;
    Ok(target)
}

/// Move `source` into `dest_dir`; falls back to copy and delete when a
/// rename is not possible (for example across filesystems)
pub fn move_file(source: &Path, dest_dir: &Path) -> Result<PathBuf, OpError> {
    let target = target_in(source, dest_dir)?;
    if fs::rename(source, &target).is_ok() {
        return Ok(target);
    }

    let move_error = |e| OpError::Move {
        from: source.to_path_buf(),
        to: target.clone(),
        source: e,
    };
    fs::copy(source, &target).map_err(move_error)?;
    fs::remove_file(source).map_err(move_error)?;
    Ok(target)
}

/// Run the copy command
pub fn run_copy(
    paths: &[PathBuf],
    dest_dir: &Path,
    fail_fast: bool,
    config: RenderConfig,
    status: Status,
) -> Result<()> {
    let result_set = run_batch(Operation::Copy, paths, fail_fast, |p| {
        copy_file(p, dest_dir).map(Some)
    });
    finish_batch(&result_set, config, status, "Files copied successfully!")
}

/// Run the move command
pub fn run_move(
    paths: &[PathBuf],
    dest_dir: &Path,
    fail_fast: bool,
    config: RenderConfig,
    status: Status,
) -> Result<()> {
    let result_set = run_batch(Operation::Move, paths, fail_fast, |p| {
        move_file(p, dest_dir).map(Some)
    });
    finish_batch(&result_set, config, status, "Files moved successfully!")
}
