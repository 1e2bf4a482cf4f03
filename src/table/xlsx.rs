//! XLSX worksheets
//!
//! Reads the first worksheet of a workbook. Cell values are read as stored;
//! styles are consulted only to recognise date formats, and formula cells
//! use their cached result.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use xml::reader::{EventReader, XmlEvent};
use zip::result::ZipError;
use zip::ZipArchive;

use super::cell::{infer_text_columns, Cell};
use super::styles::{parse_iso, DateSystem, Styles, STYLES};
use super::{header_names, Row, Table, TableError};

pub(super) const WORKBOOK: &str = "xl/workbook.xml";
const WORKBOOK_RELS: &str = "xl/_rels/workbook.xml.rels";
const SHARED_STRINGS: &str = "xl/sharedStrings.xml";
const DEFAULT_SHEET: &str = "xl/worksheets/sheet1.xml";

static CELL_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\$?([A-Za-z]{1,3})\$?([0-9]+)$").expect("valid cell ref regex"));

/// Read the first worksheet of a workbook on disk
pub fn read(path: &Path, has_header: bool) -> Result<Table, TableError> {
    let file = File::open(path)?;
    from_reader(file, has_header)
}

/// Read the first worksheet of a workbook from any seekable reader
pub fn from_reader<R: Read + Seek>(reader: R, has_header: bool) -> Result<Table, TableError> {
    let mut archive = ZipArchive::new(reader)?;

    let shared = match read_part(&mut archive, SHARED_STRINGS)? {
        Some(xml) => parse_shared_strings(&xml)?,
        None => Vec::new(),
    };

    let workbook = read_part(&mut archive, WORKBOOK)?;
    let mut styles = match read_part(&mut archive, STYLES)? {
        Some(xml) => Styles::parse(&xml)?,
        None => Styles::default(),
    };
    if let Some(xml) = workbook.as_deref() {
        styles.date_system = DateSystem::from_workbook(xml)?;
    }

    let sheet_path = first_sheet_path(&mut archive, workbook.as_deref())?;
    let sheet = read_part(&mut archive, &sheet_path)?.ok_or(TableError::NoSheets)?;
    let cells = parse_sheet(&sheet, &sheet_path, &shared, &styles)?;

    Ok(build_table(cells, has_header))
}

fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<String>, TableError> {
    match archive.by_name(name) {
        Ok(mut part) => {
            let mut xml = String::new();
            part.read_to_string(&mut xml)?;
            Ok(Some(xml))
        }
        Err(ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub(super) fn events<'a>(
    xml: &'a str,
    part: &'a str,
) -> impl Iterator<Item = Result<XmlEvent, TableError>> + 'a {
    EventReader::from_str(xml)
        .into_iter()
        .map(move |event| {
            event.map_err(|source| TableError::Xml {
                part: part.to_string(),
                source,
            })
        })
}

pub(super) fn attr(attributes: &[xml::attribute::OwnedAttribute], local_name: &str) -> Option<String> {
    attributes
        .iter()
        .find(|a| a.name.local_name == local_name)
        .map(|a| a.value.clone())
}

/// Zip path of the first worksheet in workbook order
fn first_sheet_path<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    workbook: Option<&str>,
) -> Result<String, TableError> {
    let rels = read_part(archive, WORKBOOK_RELS)?;

    if let (Some(workbook), Some(rels)) = (workbook, rels) {
        if let Some(rel_id) = first_sheet_rel(workbook)? {
            if let Some(target) = relationship_target(&rels, &rel_id)? {
                return Ok(resolve_target(&target));
            }
        }
    }

    Ok(DEFAULT_SHEET.to_string())
}

fn first_sheet_rel(workbook: &str) -> Result<Option<String>, TableError> {
    for event in events(workbook, WORKBOOK) {
        if let XmlEvent::StartElement {
            name, attributes, ..
        } = event?
        {
            if name.local_name == "sheet" {
                return Ok(attr(&attributes, "id"));
            }
        }
    }
    Ok(None)
}

fn relationship_target(rels: &str, rel_id: &str) -> Result<Option<String>, TableError> {
    for event in events(rels, WORKBOOK_RELS) {
        if let XmlEvent::StartElement {
            name, attributes, ..
        } = event?
        {
            if name.local_name == "Relationship"
                && attr(&attributes, "Id").as_deref() == Some(rel_id)
            {
                return Ok(attr(&attributes, "Target"));
            }
        }
    }
    Ok(None)
}

/// Relationship targets are relative to `xl/` unless they start with `/`
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target),
    }
}

fn parse_shared_strings(xml: &str) -> Result<Vec<String>, TableError> {
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_text = false;
    let mut in_phonetic = false;

    for event in events(xml, SHARED_STRINGS) {
        match event? {
            XmlEvent::StartElement { name, .. } => match name.local_name.as_str() {
                "si" => current.clear(),
                "rPh" => in_phonetic = true,
                "t" if !in_phonetic => in_text = true,
                _ => {}
            },
            XmlEvent::EndElement { name } => match name.local_name.as_str() {
                "si" => strings.push(std::mem::take(&mut current)),
                "rPh" => in_phonetic = false,
                "t" => in_text = false,
                _ => {}
            },
            XmlEvent::Characters(text) | XmlEvent::Whitespace(text) | XmlEvent::CData(text)
                if in_text =>
            {
                current.push_str(&text)
            }
            _ => {}
        }
    }

    Ok(strings)
}

/// Parse a reference such as `B7` into zero-based column and 1-based row
fn parse_cell_ref(reference: &str) -> Result<(usize, usize), TableError> {
    let caps = CELL_REF
        .captures(reference)
        .ok_or_else(|| TableError::CellRef(reference.to_string()))?;

    let col = caps[1]
        .chars()
        .fold(0usize, |acc, c| acc * 26 + (c.to_ascii_uppercase() as usize - 'A' as usize + 1));
    let row = caps[2]
        .parse::<usize>()
        .map_err(|_| TableError::CellRef(reference.to_string()))?;

    Ok((col - 1, row))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    None,
    Value,
    Inline,
}

#[derive(Debug)]
struct PendingCell {
    row: usize,
    col: usize,
    kind: Option<String>,
    style: Option<usize>,
    value: String,
    inline: String,
}

impl PendingCell {
    fn into_cell(self, shared: &[String], styles: &Styles) -> Result<Option<Cell>, TableError> {
        let cell = match self.kind.as_deref() {
            Some("s") => {
                let text = self
                    .value
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .and_then(|idx| shared.get(idx))
                    .ok_or_else(|| TableError::SharedString(self.value.clone()))?;
                Cell::from_field(text)
            }
            Some("inlineStr") => Cell::from_field(&self.inline),
            Some("b") => Cell::Bool(self.value.trim() == "1"),
            Some("d") => parse_iso(&self.value).unwrap_or_else(|| Cell::from_field(&self.value)),
            Some("str") | Some("e") => Cell::from_field(&self.value),
            _ if self.value.trim().is_empty() => return Ok(None),
            _ => {
                let date = if styles.is_date(self.style) {
                    self.value
                        .trim()
                        .parse::<f64>()
                        .ok()
                        .and_then(|serial| styles.date_system.cell_for(serial))
                } else {
                    None
                };
                match date {
                    Some(cell) => cell,
                    None => Cell::from_number(&self.value)
                        .unwrap_or_else(|| Cell::from_field(&self.value)),
                }
            }
        };
        Ok(Some(cell))
    }
}

/// Collect `(row, column, cell)` triples for every cell holding a value
fn parse_sheet(
    xml: &str,
    part: &str,
    shared: &[String],
    styles: &Styles,
) -> Result<Vec<(usize, usize, Cell)>, TableError> {
    let mut cells = Vec::new();
    let mut current_row = 0usize;
    let mut next_col = 0usize;
    let mut pending: Option<PendingCell> = None;
    let mut capture = Capture::None;

    for event in events(xml, part) {
        match event? {
            XmlEvent::StartElement {
                name, attributes, ..
            } => match name.local_name.as_str() {
                "row" => {
                    current_row = attr(&attributes, "r")
                        .and_then(|r| r.parse().ok())
                        .unwrap_or(current_row + 1);
                    next_col = 0;
                }
                "c" => {
                    let (col, row) = match attr(&attributes, "r") {
                        Some(reference) => parse_cell_ref(&reference)?,
                        None => (next_col, current_row),
                    };
                    next_col = col + 1;
                    pending = Some(PendingCell {
                        row,
                        col,
                        kind: attr(&attributes, "t"),
                        style: attr(&attributes, "s").and_then(|s| s.parse().ok()),
                        value: String::new(),
                        inline: String::new(),
                    });
                }
                "v" => capture = Capture::Value,
                "t" if pending.is_some() => capture = Capture::Inline,
                _ => {}
            },
            XmlEvent::Characters(text) | XmlEvent::Whitespace(text) | XmlEvent::CData(text) => {
                if let Some(cell) = pending.as_mut() {
                    match capture {
                        Capture::Value => cell.value.push_str(&text),
                        Capture::Inline => cell.inline.push_str(&text),
                        Capture::None => {}
                    }
                }
            }
            XmlEvent::EndElement { name } => match name.local_name.as_str() {
                "v" | "t" => capture = Capture::None,
                "c" => {
                    if let Some(done) = pending.take() {
                        let (row, col) = (done.row, done.col);
                        if let Some(cell) = done.into_cell(shared, styles)? {
                            cells.push((row, col, cell));
                        }
                    }
                }
                _ => {}
            },
            _ => {}
        }
    }

    Ok(cells)
}

/// Lay cells out on a grid starting at column A. Rows without any value
/// are skipped, like blank lines in delimited text.
fn build_table(mut cells: Vec<(usize, usize, Cell)>, has_header: bool) -> Table {
    let width = cells.iter().map(|(_, col, _)| col + 1).max().unwrap_or(0);
    cells.sort_by_key(|(row, col, _)| (*row, *col));

    let mut rows: Vec<Row> = Vec::new();
    for (number, col, cell) in cells {
        if rows.last().map(|r| r.number) != Some(number) {
            rows.push(Row {
                number,
                cells: vec![Cell::Empty; width],
            });
        }
        if let Some(last) = rows.last_mut() {
            last.cells[col] = cell;
        }
    }

    let header = if has_header && !rows.is_empty() {
        Some(header_names(&rows.remove(0).cells))
    } else {
        None
    };

    let mut grid: Vec<Vec<Cell>> = rows.iter_mut().map(|r| std::mem::take(&mut r.cells)).collect();
    infer_text_columns(&mut grid, width);
    for (row, cells) in rows.iter_mut().zip(grid) {
        row.cells = cells;
    }

    Table::new(header, rows, width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::FileOptions;
    use zip::ZipWriter;

    const WORKBOOK_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="Data" sheetId="1" r:id="rId2"/><sheet name="Other" sheetId="2" r:id="rId1"/></sheets>
</workbook>"#;

    const RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="/xl/worksheets/data.xml"/>
</Relationships>"#;

    const SHARED_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="3" uniqueCount="3">
<si><t>id</t></si>
<si><t>name</t></si>
<si><r><t>Ali</t></r><r><rPr><b/></rPr><t>ce</t></r><rPh><t>x</t></rPh></si>
</sst>"#;

    fn sheet_xml(rows: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{}</sheetData></worksheet>"#,
            rows
        )
    }

    fn workbook(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in parts {
            zip.start_file(*name, FileOptions::default()).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    fn data_sheet() -> String {
        sheet_xml(
            r#"<row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c></row>
<row r="2"><c r="A2"><v>123</v></c><c r="B2" t="s"><v>2</v></c></row>
<row r="4"><c r="A4"><v>456</v></c><c r="B4" t="inlineStr"><is><t>Bob</t></is></c><c r="D4" t="b"><v>1</v></c></row>"#,
        )
    }

    #[test]
    fn test_reads_first_sheet_in_workbook_order() {
        let other = sheet_xml(r#"<row r="1"><c r="A1"><v>999</v></c></row>"#);
        let data = data_sheet();
        let bytes = workbook(&[
            (WORKBOOK, WORKBOOK_XML),
            (WORKBOOK_RELS, RELS_XML),
            (SHARED_STRINGS, SHARED_XML),
            ("xl/worksheets/sheet1.xml", other.as_str()),
            ("xl/worksheets/data.xml", data.as_str()),
        ]);

        let table = from_reader(Cursor::new(bytes), true).unwrap();
        assert_eq!(table.header().unwrap(), ["id", "name", "Unnamed: 2", "Unnamed: 3"]);
        assert!(table.find("999").is_none());

        let hit = table.find("123").unwrap();
        assert_eq!((hit.row, hit.column), (2, 1));
        assert_eq!(hit.column_name.as_deref(), Some("id"));

        // rich text runs are joined, phonetic hints dropped
        assert!(table.find("Alice").is_some());
        assert!(table.find("Bob").is_some());
        assert!(table.find("True").is_some());
    }

    #[test]
    fn test_falls_back_to_sheet1() {
        let data = data_sheet();
        let bytes = workbook(&[
            (SHARED_STRINGS, SHARED_XML),
            (DEFAULT_SHEET, data.as_str()),
        ]);

        let table = from_reader(Cursor::new(bytes), true).unwrap();
        assert_eq!(table.height(), 2);
        assert!(table.find("456").is_some());
    }

    #[test]
    fn test_blank_rows_are_skipped() {
        let data = data_sheet();
        let bytes = workbook(&[(SHARED_STRINGS, SHARED_XML), (DEFAULT_SHEET, data.as_str())]);

        let table = from_reader(Cursor::new(bytes), true).unwrap();
        // row 3 is absent, so the id column stays integral
        assert!(table.find("456").is_some());
        assert!(table.find("456.0").is_none());
        assert_eq!(table.find("456").unwrap().row, 4);
    }

    #[test]
    fn test_float_and_formula_string_cells() {
        let data = sheet_xml(
            r#"<row r="1"><c r="A1" t="str"><f>"n"&amp;"o"</f><v>no</v></c></row>
<row r="2"><c r="A2"><v>1.5</v></c></row>"#,
        );
        let bytes = workbook(&[(DEFAULT_SHEET, data.as_str())]);

        let table = from_reader(Cursor::new(bytes), false).unwrap();
        assert!(table.find("no").is_some());
        assert!(table.find("1.5").is_some());
    }

    #[test]
    fn test_numeric_text_cells_are_typed() {
        let data = sheet_xml(
            r#"<row r="1"><c r="A1" t="inlineStr"><is><t>00123</t></is></c></row>
<row r="2"><c r="A2"><v>7</v></c></row>"#,
        );
        let bytes = workbook(&[(DEFAULT_SHEET, data.as_str())]);

        let table = from_reader(Cursor::new(bytes), false).unwrap();
        assert!(table.find("123").is_some());
        assert!(table.find("00123").is_none());
    }

    #[test]
    fn test_date_styled_cells_render_as_dates() {
        let styles = r#"<?xml version="1.0" encoding="UTF-8"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<numFmts count="1"><numFmt numFmtId="164" formatCode="yyyy-mm-dd hh:mm"/></numFmts>
<cellXfs count="3"><xf numFmtId="0"/><xf numFmtId="14"/><xf numFmtId="164"/></cellXfs>
</styleSheet>"#;
        let data = sheet_xml(
            r#"<row r="1"><c r="A1" s="1"><v>45306</v></c><c r="B1" s="2"><v>45306.5</v></c><c r="C1"><v>45306</v></c><c r="D1" t="d"><v>2024-03-01T00:00:00</v></c><c r="E1" s="1"><v>0.5</v></c></row>
<row r="2"><c r="B2" s="2"><v>45307</v></c><c r="C2"><v>7</v></c><c r="D2" t="d"><v>2024-03-02</v></c></row>"#,
        );
        let bytes = workbook(&[("xl/styles.xml", styles), (DEFAULT_SHEET, data.as_str())]);

        let table = from_reader(Cursor::new(bytes), false).unwrap();
        assert_eq!(
            table.rendered_columns(),
            vec![
                vec!["2024-01-15", "NaT"],
                vec!["2024-01-15 12:00:00", "2024-01-16 00:00:00"],
                vec!["45306", "7"],
                vec!["2024-03-01", "2024-03-02"],
                vec!["12:00:00", "nan"],
            ]
        );
        assert!(table.find("2024-01-15").is_some());
        assert!(table.find("45306.0").is_none());
    }

    #[test]
    fn test_1904_workbook_dates() {
        let book = r#"<?xml version="1.0" encoding="UTF-8"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><workbookPr date1904="1"/><sheets/></workbook>"#;
        let styles = r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><cellXfs count="2"><xf numFmtId="0"/><xf numFmtId="14"/></cellXfs></styleSheet>"#;
        let data = sheet_xml(r#"<row r="1"><c r="A1" s="1"><v>1</v></c></row>"#);
        let bytes = workbook(&[
            (WORKBOOK, book),
            ("xl/styles.xml", styles),
            (DEFAULT_SHEET, data.as_str()),
        ]);

        let table = from_reader(Cursor::new(bytes), false).unwrap();
        assert!(table.find("1904-01-02").is_some());
    }

    #[test]
    fn test_missing_sheet_is_an_error() {
        let bytes = workbook(&[(SHARED_STRINGS, SHARED_XML)]);
        let err = from_reader(Cursor::new(bytes), true).unwrap_err();
        assert!(matches!(err, TableError::NoSheets));
    }

    #[test]
    fn test_not_a_zip_is_an_error() {
        let err = from_reader(Cursor::new(b"id,name\n".to_vec()), true).unwrap_err();
        assert!(matches!(err, TableError::Zip(_)));
    }

    #[test]
    fn test_bad_shared_string_index() {
        let data = sheet_xml(r#"<row r="1"><c r="A1" t="s"><v>7</v></c></row>"#);
        let bytes = workbook(&[(SHARED_STRINGS, SHARED_XML), (DEFAULT_SHEET, data.as_str())]);
        let err = from_reader(Cursor::new(bytes), true).unwrap_err();
        assert!(matches!(err, TableError::SharedString(_)));
    }

    #[test]
    fn test_parse_cell_ref() {
        assert_eq!(parse_cell_ref("A1").unwrap(), (0, 1));
        assert_eq!(parse_cell_ref("B7").unwrap(), (1, 7));
        assert_eq!(parse_cell_ref("Z3").unwrap(), (25, 3));
        assert_eq!(parse_cell_ref("AA10").unwrap(), (26, 10));
        assert_eq!(parse_cell_ref("$C$2").unwrap(), (2, 2));
        assert!(parse_cell_ref("7A").is_err());
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target("worksheets/sheet2.xml"), "xl/worksheets/sheet2.xml");
        assert_eq!(resolve_target("/xl/worksheets/a.xml"), "xl/worksheets/a.xml");
    }

    #[test]
    fn test_empty_sheet_is_empty_table() {
        let data = sheet_xml("");
        let bytes = workbook(&[(DEFAULT_SHEET, data.as_str())]);
        let table = from_reader(Cursor::new(bytes), true).unwrap();
        assert_eq!(table.width(), 0);
        assert_eq!(table.height(), 0);
    }
}
