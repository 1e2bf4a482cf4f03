//! Unified Result Model
//!
//! Search matches and file operations both map to this model before
//! rendering output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kind of result item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Match,
    Copy,
    Move,
    Delete,
    Open,
    Folder,
}

impl Kind {
    /// Whether this kind is produced by a file operation
    pub fn is_operation(self) -> bool {
        matches!(
            self,
            Kind::Copy | Kind::Move | Kind::Delete | Kind::Open | Kind::Folder
        )
    }
}

/// Location of the first cell that matched the target value.
///
/// `row` and `column` are 1-based positions in the file as a spreadsheet
/// program would show them, so a header line is row 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellHit {
    pub row: usize,
    pub column: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_name: Option<String>,
}

/// Metadata for a result item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Meta {
    /// Last modification time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,

    /// File size in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// Table format the file was read as (csv/tsv/xlsx)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// First matching cell
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hit: Option<CellHit>,
}

/// Error information for a result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemError {
    pub code: String,
    pub message: String,
}

impl ItemError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// The unified result item that all commands produce
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultItem {
    /// The kind of this result
    pub kind: Kind,

    /// Absolute path of the file (or folder) this item is about
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Destination path for copy/move
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest: Option<String>,

    /// Metadata
    #[serde(default)]
    pub meta: Meta,

    /// Errors (if any)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ItemError>,
}

impl ResultItem {
    /// Create a new match result
    pub fn matched(path: impl Into<String>) -> Self {
        Self::operation(Kind::Match, path)
    }

    /// Create a result for an operation on `path`
    pub fn operation(kind: Kind, path: impl Into<String>) -> Self {
        Self {
            kind,
            path: Some(path.into()),
            dest: None,
            meta: Meta::default(),
            errors: Vec::new(),
        }
    }

    /// Set destination
    pub fn with_dest(mut self, dest: impl Into<String>) -> Self {
        self.dest = Some(dest.into());
        self
    }

    /// Set metadata
    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }

    /// Add an error
    pub fn with_error(mut self, error: ItemError) -> Self {
        self.errors.push(error);
        self
    }

    /// True when the item carries no errors
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Result set containing multiple result items
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultSet {
    pub items: Vec<ResultItem>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, item: ResultItem) {
        self.items.push(item);
    }

    /// Number of items that carry at least one error
    pub fn failures(&self) -> usize {
        self.items.iter().filter(|item| !item.is_ok()).count()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<ResultItem> for ResultSet {
    fn from_iter<T: IntoIterator<Item = ResultItem>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
