//! File operations on search results
//!
//! Provides:
//! - transfer: copy/move into a destination directory
//! - remove: delete in place
//! - open: hand files to the OS default application
//! - folder: create a folder under root
//!
//! Batches report every item. By default a failing item does not stop the
//! batch; with fail-fast the first failure ends it.

pub mod folder;
pub mod open;
pub mod remove;
pub mod transfer;

use anyhow::{bail, Context, Result};
use log::warn;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::model::{ItemError, Kind, ResultItem, ResultSet};
use crate::core::paths::{display_path, resolve_under};
use crate::core::render::{RenderConfig, Renderer};
use crate::core::status::Status;

/// Errors raised by a single file operation
#[derive(Debug, Error)]
pub enum OpError {
    #[error("{0}: no such file")]
    Missing(PathBuf),

    #[error("destination {0} is not an existing directory")]
    BadDestination(PathBuf),

    #[error("{0} and its destination are the same file")]
    SameFile(PathBuf),

    #[error("failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to move {from} to {to}: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to delete {path}: {source}")]
    Delete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: opener::OpenError,
    },

    #[error("Failed to create folder: {source}")]
    CreateFolder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A file operation and how its results are labelled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Copy,
    Move,
    Delete,
    Open,
    Mkdir,
}

impl Operation {
    /// Result kind for items produced by this operation
    pub fn kind(self) -> Kind {
        match self {
            Operation::Copy => Kind::Copy,
            Operation::Move => Kind::Move,
            Operation::Delete => Kind::Delete,
            Operation::Open => Kind::Open,
            Operation::Mkdir => Kind::Folder,
        }
    }

    /// Stable error code for a failed item
    pub fn failure_code(self) -> &'static str {
        match self {
            Operation::Copy => "COPY_FAILED",
            Operation::Move => "MOVE_FAILED",
            Operation::Delete => "DELETE_FAILED",
            Operation::Open => "OPEN_FAILED",
            Operation::Mkdir => "MKDIR_FAILED",
        }
    }
}

/// Expand the FILES arguments: `-` reads paths from stdin
pub fn collect_paths(root: &Path, inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.as_os_str() == "-" {
            let stdin = std::io::stdin();
            paths.extend(read_path_list(stdin.lock())?);
        } else {
            paths.push(input.clone());
        }
    }
    Ok(paths.iter().map(|p| resolve_under(root, p)).collect())
}

/// Read one path per line. A line may also be a jsonl result item, in which
/// case its destination (if any) or its path is used.
pub fn read_path_list<R: BufRead>(reader: R) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.context("failed to read path list")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with('{') {
            let item: ResultItem = serde_json::from_str(line)
                .with_context(|| format!("invalid result item on line {}", index + 1))?;
            match item.dest.or(item.path) {
                Some(path) if item.errors.is_empty() => paths.push(PathBuf::from(path)),
                _ => warn!("Ignoring line {}: no usable path", index + 1),
            }
        } else {
            paths.push(PathBuf::from(line));
        }
    }
    Ok(paths)
}

/// Apply `op` to every path. `op` returns the destination it produced, if any.
pub fn run_batch<F>(
    operation: Operation,
    paths: &[PathBuf],
    fail_fast: bool,
    mut op: F,
) -> ResultSet
where
    F: FnMut(&Path) -> Result<Option<PathBuf>, OpError>,
{
    let mut result_set = ResultSet::new();

    for path in paths {
        let item = ResultItem::operation(operation.kind(), display_path(path));
        match op(path) {
            Ok(Some(dest)) => result_set.push(item.with_dest(display_path(&dest))),
            Ok(None) => result_set.push(item),
            Err(err) => {
                warn!("{}", err);
                let error = ItemError::new(operation.failure_code(), err.to_string());
                result_set.push(item.with_error(error));
                if fail_fast {
                    break;
                }
            }
        }
    }

    result_set
}

/// Render a finished batch and turn failures into a command error
pub fn finish_batch(
    result_set: &ResultSet,
    config: RenderConfig,
    status: Status,
    success: &str,
) -> Result<()> {
    Renderer::with_config(config).print(result_set);

    let failures = result_set.failures();
    if failures == 0 {
        if !result_set.is_empty() {
            status.success(success);
        }
        return Ok(());
    }

    status.failure(&format!(
        "{} of {} operations failed",
        failures,
        result_set.len()
    ));
    bail!("{} of {} operations failed", failures, result_set.len())
}
