//! Typed cells and their string forms
//!
//! Matching compares strings, so every cell is rendered the way a dataframe
//! would print it after casting the whole table to `str`. Rendering is
//! decided per column: an integer column that has a gap is shown as floats,
//! a column of mixed types keeps each cell's own form, and so on.

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Field values treated as missing when reading delimited text
static NA_VALUES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
        "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
    ]
    .into_iter()
    .collect()
});

/// String form of a missing value
pub const MISSING: &str = "nan";

/// String form of a missing value in a datetime column
pub const MISSING_DATETIME: &str = "NaT";

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Int(i64),
    /// Integers above `i64::MAX`
    UInt(u64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
}

impl Cell {
    /// Cell for a raw delimited field; only the missing-value markers are
    /// interpreted here, typing happens per column in [`infer_text_columns`].
    pub fn from_field(field: &str) -> Self {
        if NA_VALUES.contains(field) {
            Cell::Empty
        } else {
            Cell::Text(field.to_string())
        }
    }

    /// Cell for a spreadsheet number; integral values read back as integers
    pub fn from_number(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            return Some(Cell::Int(i));
        }
        let f = trimmed.parse::<f64>().ok()?;
        if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 {
            Some(Cell::Int(f as i64))
        } else {
            Some(Cell::Float(f))
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// The cell's own string form, used for mixed-type columns
    pub fn render(&self) -> String {
        match self {
            Cell::Empty => MISSING.to_string(),
            Cell::Text(s) => s.clone(),
            Cell::Int(i) => i.to_string(),
            Cell::UInt(u) => u.to_string(),
            Cell::Float(f) => float_repr(*f),
            Cell::Bool(b) => bool_repr(*b).to_string(),
            Cell::DateTime(dt) => datetime_repr(dt, false),
            Cell::Time(t) => time_repr(t),
        }
    }

    fn is_integer(&self) -> bool {
        matches!(self, Cell::Int(_) | Cell::UInt(_))
    }

    fn as_float(&self) -> Option<f64> {
        match self {
            Cell::Int(i) => Some(*i as f64),
            Cell::UInt(u) => Some(*u as f64),
            Cell::Float(f) => Some(*f),
            _ => None,
        }
    }
}

fn bool_repr(b: bool) -> &'static str {
    if b {
        "True"
    } else {
        "False"
    }
}

fn fraction_suffix(nanos: u32) -> String {
    if nanos == 0 {
        String::new()
    } else {
        format!(".{:06}", nanos / 1_000)
    }
}

/// `2024-01-15 08:30:00`, or just the date when `date_only`
fn datetime_repr(dt: &NaiveDateTime, date_only: bool) -> String {
    if date_only {
        return dt.format("%Y-%m-%d").to_string();
    }
    format!(
        "{}{}",
        dt.format("%Y-%m-%d %H:%M:%S"),
        fraction_suffix(dt.nanosecond())
    )
}

fn is_midnight(dt: &NaiveDateTime) -> bool {
    dt.num_seconds_from_midnight() == 0 && dt.nanosecond() == 0
}

fn time_repr(t: &NaiveTime) -> String {
    format!("{}{}", t.format("%H:%M:%S"), fraction_suffix(t.nanosecond()))
}

fn parse_bool(field: &str) -> Option<bool> {
    match field {
        "True" | "TRUE" | "true" => Some(true),
        "False" | "FALSE" | "false" => Some(false),
        _ => None,
    }
}

/// Shortest round-trip float text with `.0` on integral values and
/// exponent form outside `[1e-4, 1e16)`, e.g. `42.0`, `1e+16`, `1.5e-05`.
pub fn float_repr(f: f64) -> String {
    if f.is_nan() {
        return MISSING.to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let magnitude = f.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let sci = format!("{:e}", f);
        let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
        let (sign, digits) = match exponent.strip_prefix('-') {
            Some(digits) => ('-', digits),
            None => ('+', exponent),
        };
        return format!("{}e{}{:0>2}", mantissa, sign, digits);
    }

    let text = f.to_string();
    if text.contains('.') {
        text
    } else {
        format!("{}.0", text)
    }
}

fn text_fields(rows: &[Vec<Cell>], col: usize) -> impl Iterator<Item = &str> {
    rows.iter().filter_map(move |row| match row.get(col) {
        Some(Cell::Text(s)) => Some(s.as_str()),
        _ => None,
    })
}

/// Convert text columns whose every non-empty value is an integer, an
/// unsigned integer too large for `i64`, a number or a boolean literal into
/// typed cells. Columns with any other value keep
/// their raw text.
pub fn infer_text_columns(rows: &mut [Vec<Cell>], width: usize) {
    for col in 0..width {
        if text_fields(rows, col).next().is_none() {
            continue;
        }

        let convert: fn(&str) -> Option<Cell> =
            if text_fields(rows, col).all(|s| s.trim().parse::<i64>().is_ok()) {
                |s| s.trim().parse::<i64>().ok().map(Cell::Int)
            } else if text_fields(rows, col).all(|s| s.trim().parse::<u64>().is_ok()) {
                |s| match s.trim().parse::<i64>() {
                    Ok(i) => Some(Cell::Int(i)),
                    Err(_) => s.trim().parse::<u64>().ok().map(Cell::UInt),
                }
            } else if text_fields(rows, col).all(|s| s.trim().parse::<f64>().is_ok()) {
                |s| s.trim().parse::<f64>().ok().map(Cell::Float)
            } else if text_fields(rows, col).all(|s| parse_bool(s).is_some()) {
                |s| parse_bool(s).map(Cell::Bool)
            } else {
                continue;
            };

        for cell in rows.iter_mut().filter_map(|row| row.get_mut(col)) {
            let typed = match cell {
                Cell::Text(s) => convert(s),
                _ => None,
            };
            if let Some(typed) = typed {
                *cell = typed;
            }
        }
    }
}

/// Render one column of cells to strings
pub fn render_column(cells: &[&Cell]) -> Vec<String> {
    let has_empty = cells.iter().any(|c| c.is_empty());
    let values = || cells.iter().filter(|c| !c.is_empty());

    if values().next().is_none() {
        return vec![MISSING.to_string(); cells.len()];
    }

    if values().all(|c| matches!(c, Cell::DateTime(_))) {
        let date_only = values().all(|c| match c {
            Cell::DateTime(dt) => is_midnight(dt),
            _ => false,
        });
        return cells
            .iter()
            .map(|c| match c {
                Cell::DateTime(dt) => datetime_repr(dt, date_only),
                _ => MISSING_DATETIME.to_string(),
            })
            .collect();
    }

    if values().all(|c| c.is_integer()) && !has_empty {
        return cells.iter().map(|c| c.render()).collect();
    }

    if values().all(|c| c.as_float().is_some()) {
        return cells
            .iter()
            .map(|c| float_repr(c.as_float().unwrap_or(f64::NAN)))
            .collect();
    }

    cells.iter().map(|c| c.render()).collect()
}
