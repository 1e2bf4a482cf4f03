//! Delimited text tables (CSV/TSV)
//!
//! The first record fixes the table width. Shorter records are padded,
//! longer ones are rejected. Blank lines are skipped by the csv reader.

use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::cell::{infer_text_columns, Cell};
use super::{header_names, Row, Table, TableError};

/// Read a delimited file from disk
pub fn read(path: &Path, delimiter: u8, has_header: bool) -> Result<Table, TableError> {
    let file = File::open(path)?;
    from_reader(file, delimiter, has_header)
}

/// Read a delimited table from any reader
pub fn from_reader<R: Read>(
    reader: R,
    delimiter: u8,
    has_header: bool,
) -> Result<Table, TableError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut width = None;
    let mut numbers = Vec::new();
    let mut records = Vec::new();

    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let expected = *width.get_or_insert(record.len());
        if record.len() > expected {
            return Err(TableError::RaggedRow {
                line,
                expected,
                found: record.len(),
            });
        }

        numbers.push(line as usize);
        records.push(record.iter().map(Cell::from_field).collect::<Vec<_>>());
    }

    let width = width.ok_or(TableError::NoColumns)?;

    let header = if has_header && !records.is_empty() {
        numbers.remove(0);
        Some(header_names(&records.remove(0)))
    } else {
        None
    };

    for cells in &mut records {
        cells.resize(width, Cell::Empty);
    }
    infer_text_columns(&mut records, width);

    let rows = numbers
        .into_iter()
        .zip(records)
        .map(|(number, cells)| Row { number, cells })
        .collect();

    Ok(Table::new(header, rows, width))
}
