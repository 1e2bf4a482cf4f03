//! Create a folder under root

use anyhow::{bail, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::{OpError, Operation};
use crate::core::model::{ItemError, ResultItem, ResultSet};
use crate::core::paths::display_path;
use crate::core::render::{RenderConfig, Renderer};
use crate::core::status::Status;

/// Status when no folder name was given
pub const MISSING_NAME: &str = "Please enter a folder name.";

/// Create `root/name` (one level; the parent must exist)
pub fn create_folder(root: &Path, name: &str) -> Result<PathBuf, OpError> {
    let path = root.join(name);
    fs::create_dir(&path).map_err(|e| OpError::CreateFolder {
        path: path.clone(),
        source: e,
    })?;
    Ok(path)
}

/// Run the mkdir command
pub fn run_mkdir(root: &Path, name: &str, config: RenderConfig, status: Status) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        status.notice(MISSING_NAME);
        return Ok(());
    }

    let renderer = Renderer::with_config(config);
    match create_folder(root, name) {
        Ok(path) => {
            let item = ResultItem::operation(Operation::Mkdir.kind(), display_path(&path));
            let result_set: ResultSet = std::iter::once(item).collect();
            renderer.print(&result_set);
            status.success("Folder created successfully!");
            Ok(())
        }
        Err(err) => {
            let message = err.to_string();
            let error = ItemError::new(Operation::Mkdir.failure_code(), message.clone());
            let item = ResultItem::operation(Operation::Mkdir.kind(), display_path(&root.join(name)))
                .with_error(error);
            renderer.print(&std::iter::once(item).collect());
            status.failure(&message);
            bail!(message)
        }
    }
}
