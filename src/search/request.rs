//! Search request built from user input

use std::path::{Path, PathBuf};

/// Options that change how files are walked and read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Treat the first row of each table as a header (never searched)
    pub has_header: bool,

    /// Maximum directory depth below root
    pub max_depth: Option<usize>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            max_depth: None,
        }
    }
}

/// One search: immutable once built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    root: PathBuf,
    extension: String,
    target: String,
    options: SearchOptions,
}

impl SearchRequest {
    /// Build a request from raw input. Extension and target are trimmed;
    /// returns `None` when either is blank.
    pub fn new(
        root: impl Into<PathBuf>,
        extension: &str,
        target: &str,
        options: SearchOptions,
    ) -> Option<Self> {
        let extension = extension.trim();
        let target = target.trim();
        if extension.is_empty() || target.is_empty() {
            return None;
        }

        Some(Self {
            root: root.into(),
            extension: extension.to_string(),
            target: target.to_string(),
            options,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn options(&self) -> SearchOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_input() {
        let request =
            SearchRequest::new("/data", "  .csv ", " 42\t", SearchOptions::default()).unwrap();
        assert_eq!(request.extension(), ".csv");
        assert_eq!(request.target(), "42");
        assert_eq!(request.root(), Path::new("/data"));
        assert!(request.options().has_header);
    }

    #[test]
    fn test_blank_target_is_rejected() {
        assert!(SearchRequest::new("/data", ".csv", "", SearchOptions::default()).is_none());
        assert!(SearchRequest::new("/data", ".csv", "   ", SearchOptions::default()).is_none());
    }

    #[test]
    fn test_blank_extension_is_rejected() {
        assert!(SearchRequest::new("/data", " ", "42", SearchOptions::default()).is_none());
    }
}
