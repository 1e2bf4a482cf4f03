//! Open files with the OS default application

use anyhow::Result;
use std::path::{Path, PathBuf};

use super::{finish_batch, run_batch, OpError, Operation};
use crate::core::render::RenderConfig;
use crate::core::status::Status;

/// Launch the default handler for `path`. The handler runs detached, so a
/// missing file is checked up front rather than left to the handler.
pub fn open_file(path: &Path) -> Result<(), OpError> {
    if !path.exists() {
        return Err(OpError::Missing(path.to_path_buf()));
    }
    opener::open(path).map_err(|e| OpError::Open {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Run the open command
pub fn run_open(
    paths: &[PathBuf],
    fail_fast: bool,
    config: RenderConfig,
    status: Status,
) -> Result<()> {
    let result_set = run_batch(Operation::Open, paths, fail_fast, |p| {
        open_file(p).map(|_| None)
    });
    finish_batch(&result_set, config, status, "Files opened.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_file() {
        let temp = tempfile::tempdir().unwrap();
        let err = open_file(&temp.path().join("ghost.xlsx")).unwrap_err();
        assert!(matches!(err, OpError::Missing(_)));
    }
}
