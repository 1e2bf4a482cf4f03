//! Table module - Loads tabular files into typed cells
//!
//! Provides:
//! - delimited: CSV/TSV via the csv crate
//! - xlsx: first worksheet of an Office Open XML workbook
//! - styles: date-formatted workbook cells
//! - cell: cell typing and string rendering

pub mod cell;
pub mod delimited;
pub mod styles;
pub mod xlsx;

use std::path::Path;
use thiserror::Error;

use crate::core::model::CellHit;
use cell::{render_column, Cell};

/// Errors raised while loading a table
#[derive(Debug, Error)]
pub enum TableError {
    #[error("unsupported file format: {0}")]
    Unsupported(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("invalid workbook archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("malformed xml in {part}: {source}")]
    Xml {
        part: String,
        #[source]
        source: xml::reader::Error,
    },

    #[error("no columns to parse from file")]
    NoColumns,

    #[error("expected {expected} fields in line {line}, saw {found}")]
    RaggedRow {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("workbook has no worksheets")]
    NoSheets,

    #[error("invalid cell reference {0:?}")]
    CellRef(String),

    #[error("shared string index {0:?} out of range")]
    SharedString(String),
}

/// Supported table formats, chosen by file name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Tsv,
    Xlsx,
}

impl TableFormat {
    /// Detect the format from a file name (case-insensitive extension)
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(TableFormat::Csv),
            "tsv" => Some(TableFormat::Tsv),
            "xlsx" => Some(TableFormat::Xlsx),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TableFormat::Csv => "csv",
            TableFormat::Tsv => "tsv",
            TableFormat::Xlsx => "xlsx",
        }
    }
}

/// A row of cells together with its 1-based line/row number in the file
#[derive(Debug, Clone)]
pub struct Row {
    pub number: usize,
    pub cells: Vec<Cell>,
}

/// A rectangular table: optional header plus data rows of equal width
#[derive(Debug, Clone)]
pub struct Table {
    header: Option<Vec<String>>,
    rows: Vec<Row>,
    width: usize,
}

impl Table {
    /// Build a table, padding every row to `width` with empty cells
    pub fn new(header: Option<Vec<String>>, mut rows: Vec<Row>, width: usize) -> Self {
        for row in &mut rows {
            row.cells.resize(width, Cell::Empty);
        }
        Self {
            header,
            rows,
            width,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    /// Every data cell as a string, column by column
    pub fn rendered_columns(&self) -> Vec<Vec<String>> {
        (0..self.width)
            .map(|col| {
                let cells: Vec<&Cell> = self.rows.iter().map(|row| &row.cells[col]).collect();
                render_column(&cells)
            })
            .collect()
    }

    /// First data cell (row-major) whose string form equals `target`
    pub fn find(&self, target: &str) -> Option<CellHit> {
        let columns = self.rendered_columns();
        for (r, row) in self.rows.iter().enumerate() {
            for (c, column) in columns.iter().enumerate() {
                if column[r] == target {
                    return Some(CellHit {
                        row: row.number,
                        column: c + 1,
                        column_name: self.header().and_then(|names| names.get(c)).cloned(),
                    });
                }
            }
        }
        None
    }
}

/// Header names from a header row; blank names get positional placeholders
pub fn header_names(cells: &[Cell]) -> Vec<String> {
    cells
        .iter()
        .enumerate()
        .map(|(i, cell)| match cell {
            Cell::Empty => format!("Unnamed: {}", i),
            other => other.render(),
        })
        .collect()
}

/// Load a file as a table, choosing the reader from its name
pub fn load(path: &Path, has_header: bool) -> Result<(TableFormat, Table), TableError> {
    let format = TableFormat::from_path(path)
        .ok_or_else(|| TableError::Unsupported(path.to_string_lossy().into_owned()))?;

    let table = match format {
        TableFormat::Csv => delimited::read(path, b',', has_header)?,
        TableFormat::Tsv => delimited::read(path, b'\t', has_header)?,
        TableFormat::Xlsx => xlsx::read(path, has_header)?,
    };

    Ok((format, table))
}
