//! Directory scanner
//!
//! Walks root with walkdir (no ignore rules, hidden entries included,
//! directory links not descended into), keeps files whose name ends with the
//! requested extension and tests each one for a cell equal to the target
//! value. A link to a file counts as a file; a dangling link is kept so the
//! failure to read it is logged like any other unreadable file.

use anyhow::Result;
use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::core::model::{CellHit, ResultItem, ResultSet};
use crate::core::paths::{display_path, name_ends_with};
use crate::core::render::{RenderConfig, Renderer};
use crate::core::status::{Status, DATA_FOUND, DATA_NOT_FOUND, MISSING_INPUT};
use crate::core::util::file_meta;
use crate::table::{self, TableFormat};

use super::request::{SearchOptions, SearchRequest};

/// A file whose table contains the target value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMatch {
    pub path: PathBuf,
    pub format: TableFormat,
    pub hit: CellHit,
}

impl FileMatch {
    pub fn to_result_item(&self) -> ResultItem {
        let mut meta = file_meta(&self.path);
        meta.format = Some(self.format.as_str().to_string());
        meta.hit = Some(self.hit.clone());
        ResultItem::matched(display_path(&self.path)).with_meta(meta)
    }
}

/// What a search produced, as shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    MissingInput,
    NotFound,
    Found(Vec<FileMatch>),
}

impl SearchOutcome {
    pub fn status_message(&self) -> &'static str {
        match self {
            SearchOutcome::MissingInput => MISSING_INPUT,
            SearchOutcome::NotFound => DATA_NOT_FOUND,
            SearchOutcome::Found(_) => DATA_FOUND,
        }
    }
}

/// Files under root whose name ends with the requested extension
pub fn candidate_files(request: &SearchRequest) -> Vec<PathBuf> {
    let mut walker = WalkDir::new(request.root()).follow_links(false);
    if let Some(depth) = request.options().max_depth {
        walker = walker.max_depth(depth);
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                warn!("Skipping unreadable entry: {}", err);
                continue;
            }
        };

        if is_file_entry(&entry) && name_ends_with(entry.path(), request.extension()) {
            files.push(entry.into_path());
        }
    }
    files
}

fn is_file_entry(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_file() || (entry.path_is_symlink() && !entry.path().is_dir())
}

/// Test one file; load failures are logged and count as no match
pub fn test_file(path: &Path, target: &str, options: SearchOptions) -> Option<FileMatch> {
    match table::load(path, options.has_header) {
        Ok((format, table)) => {
            debug!(
                "Read {} as {} ({} rows x {} columns)",
                path.display(),
                format.as_str(),
                table.height(),
                table.width()
            );
            table.find(target).map(|hit| FileMatch {
                path: path.to_path_buf(),
                format,
                hit,
            })
        }
        Err(err) => {
            warn!("Error occurred when searching in {}: {}", path.display(), err);
            None
        }
    }
}

/// Run a search and return every matching file, sorted by path
pub fn search(request: &SearchRequest) -> Vec<FileMatch> {
    let candidates = candidate_files(request);
    debug!(
        "{} candidate files under {}",
        candidates.len(),
        request.root().display()
    );

    #[cfg(feature = "parallel")]
    let mut matches: Vec<FileMatch> = {
        use rayon::prelude::*;
        candidates
            .par_iter()
            .filter_map(|path| test_file(path, request.target(), request.options()))
            .collect()
    };

    #[cfg(not(feature = "parallel"))]
    let mut matches: Vec<FileMatch> = candidates
        .iter()
        .filter_map(|path| test_file(path, request.target(), request.options()))
        .collect();

    matches.sort_by(|a, b| a.path.cmp(&b.path));
    matches
}

/// Validate raw input and search
pub fn search_outcome(
    root: &Path,
    extension: &str,
    value: &str,
    options: SearchOptions,
) -> SearchOutcome {
    let Some(request) = SearchRequest::new(root, extension, value, options) else {
        return SearchOutcome::MissingInput;
    };

    let matches = search(&request);
    if matches.is_empty() {
        SearchOutcome::NotFound
    } else {
        SearchOutcome::Found(matches)
    }
}

/// Run the search command
pub fn run_search(
    root: &Path,
    extension: &str,
    value: &str,
    options: SearchOptions,
    config: RenderConfig,
    status: Status,
) -> Result<()> {
    let outcome = search_outcome(root, extension, value, options);

    let result_set: ResultSet = match &outcome {
        SearchOutcome::Found(matches) => matches.iter().map(FileMatch::to_result_item).collect(),
        _ => ResultSet::new(),
    };
    Renderer::with_config(config).print(&result_set);

    match outcome {
        SearchOutcome::Found(matches) => status.success(&format!(
            "{} ({} {})",
            DATA_FOUND,
            matches.len(),
            if matches.len() == 1 { "file" } else { "files" }
        )),
        other => status.notice(other.status_message()),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn names(matches: &[FileMatch]) -> Vec<String> {
        matches
            .iter()
            .map(|m| m.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_only_matching_file_is_returned() {
        let temp = tempdir().unwrap();
        write(&temp.path().join("a.csv"), "id,name\n42,alice\n");
        write(&temp.path().join("b.csv"), "id,name\n7,bob\n");

        let outcome = search_outcome(temp.path(), ".csv", "42", SearchOptions::default());
        match outcome {
            SearchOutcome::Found(matches) => assert_eq!(names(&matches), vec!["a.csv"]),
            other => panic!("expected a match, got {:?}", other),
        }
    }

    #[test]
    fn test_recurses_and_filters_by_extension() {
        let temp = tempdir().unwrap();
        write(&temp.path().join("top.csv"), "v\n42\n");
        write(&temp.path().join("deep/er/nested.csv"), "v\n42\n");
        write(&temp.path().join("deep/other.tsv"), "v\n42\n");
        write(&temp.path().join("deep/notes.txt"), "42\n");

        let request =
            SearchRequest::new(temp.path(), ".csv", "42", SearchOptions::default()).unwrap();
        let matches = search(&request);
        assert_eq!(names(&matches), vec!["nested.csv", "top.csv"]);
        assert!(matches.iter().all(|m| m.path.starts_with(temp.path())));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_files_are_searched() {
        use std::os::unix::fs::symlink;

        let outside = tempdir().unwrap();
        write(&outside.path().join("real.csv"), "v\n42\n");
        write(&outside.path().join("dir/inner.csv"), "v\n42\n");

        let temp = tempdir().unwrap();
        symlink(outside.path().join("real.csv"), temp.path().join("link.csv")).unwrap();
        symlink(outside.path().join("dir"), temp.path().join("linked_dir.csv")).unwrap();
        symlink(outside.path().join("gone.csv"), temp.path().join("broken.csv")).unwrap();

        let outcome = search_outcome(temp.path(), ".csv", "42", SearchOptions::default());
        match outcome {
            SearchOutcome::Found(matches) => {
                assert_eq!(names(&matches), vec!["link.csv"]);
                assert!(matches[0].path.starts_with(temp.path()));
            }
            other => panic!("expected a match, got {:?}", other),
        }
    }

    #[test]
    fn test_max_depth_limits_walk() {
        let temp = tempdir().unwrap();
        write(&temp.path().join("top.csv"), "v\n42\n");
        write(&temp.path().join("sub/nested.csv"), "v\n42\n");

        let options = SearchOptions {
            max_depth: Some(1),
            ..Default::default()
        };
        let request = SearchRequest::new(temp.path(), ".csv", "42", options).unwrap();
        assert_eq!(names(&search(&request)), vec!["top.csv"]);
    }

    #[test]
    fn test_broken_file_is_skipped() {
        let temp = tempdir().unwrap();
        write(&temp.path().join("good.csv"), "v\n42\n");
        write(&temp.path().join("bad.csv"), "a,b\n1,2\n3,4,5\n");
        write(&temp.path().join("fake.xlsx"), "not a zip");

        // bad.csv has a ragged row and fails to load; good.csv still matches
        let outcome = search_outcome(temp.path(), "sv", "42", SearchOptions::default());
        assert_eq!(outcome.status_message(), DATA_FOUND);

        let outcome = search_outcome(temp.path(), "x", "42", SearchOptions::default());
        assert_eq!(outcome, SearchOutcome::NotFound);
    }

    #[test]
    fn test_unrecognized_format_is_a_non_match() {
        let temp = tempdir().unwrap();
        write(&temp.path().join("data.txt"), "42\n");

        let outcome = search_outcome(temp.path(), ".txt", "42", SearchOptions::default());
        assert_eq!(outcome, SearchOutcome::NotFound);
    }

    #[test]
    fn test_missing_input() {
        let temp = tempdir().unwrap();
        let outcome = search_outcome(temp.path(), ".csv", " ", SearchOptions::default());
        assert_eq!(outcome, SearchOutcome::MissingInput);
        assert_eq!(outcome.status_message(), MISSING_INPUT);
    }

    #[test]
    fn test_search_is_idempotent() {
        let temp = tempdir().unwrap();
        write(&temp.path().join("x/1.csv"), "v\n42\n");
        write(&temp.path().join("y/2.csv"), "v\n42\n");
        write(&temp.path().join("z/3.csv"), "v\n43\n");

        let request =
            SearchRequest::new(temp.path(), ".csv", "42", SearchOptions::default()).unwrap();
        let first = search(&request);
        let second = search(&request);
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_hit_is_reported() {
        let temp = tempdir().unwrap();
        write(&temp.path().join("a.csv"), "id,code\n1,x\n2,42\n");

        let request =
            SearchRequest::new(temp.path(), ".csv", "42", SearchOptions::default()).unwrap();
        let matches = search(&request);
        assert_eq!(matches[0].format, TableFormat::Csv);
        assert_eq!(matches[0].hit.row, 3);
        assert_eq!(matches[0].hit.column_name.as_deref(), Some("code"));

        let item = matches[0].to_result_item();
        assert_eq!(item.meta.format.as_deref(), Some("csv"));
        assert!(item.meta.size.is_some());
    }
}
