//! Date-formatted workbook cells
//!
//! A workbook stores dates as serial day numbers; only the cell's number
//! format says whether a value is a date. The formats come from the
//! `cellXfs` list in `xl/styles.xml`, indexed by each cell's `s` attribute.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use xml::reader::XmlEvent;

use super::cell::Cell;
use super::xlsx::{attr, events};
use super::TableError;

pub const STYLES: &str = "xl/styles.xml";

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Largest serial Excel accepts (9999-12-31)
const MAX_SERIAL: f64 = 2_958_466.0;

/// Quoted literals, bracketed colors/locales, escaped and padding characters
static FORMAT_LITERALS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\[[^\]]*\]|"[^"]*"|\\.|_.|\*."#).expect("valid format literal regex")
});

static DATE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new("[dmhysDMHYS]").expect("valid date token regex"));

/// `[h]`, `[mm]`, `[ss]`: durations rather than points in time
static ELAPSED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(?:[hH]+|[mM]+|[sS]+)\]").expect("valid elapsed regex"));

/// Built-in number format ids that display a date or a time
fn builtin_is_date(id: u32) -> bool {
    matches!(id, 14..=22 | 45..=47)
}

/// Whether a custom format code displays a date or a time. Only the first
/// section (positive numbers) is considered.
pub fn is_date_format(code: &str) -> bool {
    let section = code.split(';').next().unwrap_or_default();
    if ELAPSED.is_match(section) {
        return false;
    }
    DATE_TOKEN.is_match(&FORMAT_LITERALS.replace_all(section, ""))
}

/// Serial day numbers count from 1899-12-30, or from 1904-01-01 for
/// workbooks saved with the 1904 date system
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateSystem {
    #[default]
    Windows1900,
    Mac1904,
}

impl DateSystem {
    /// Read `workbookPr/@date1904` from the workbook part
    pub fn from_workbook(workbook: &str) -> Result<Self, TableError> {
        for event in events(workbook, super::xlsx::WORKBOOK) {
            if let XmlEvent::StartElement {
                name, attributes, ..
            } = event?
            {
                match name.local_name.as_str() {
                    "workbookPr" => {
                        let flag = attr(&attributes, "date1904");
                        return Ok(match flag.as_deref() {
                            Some("1") | Some("true") => DateSystem::Mac1904,
                            _ => DateSystem::Windows1900,
                        });
                    }
                    "sheets" => break,
                    _ => {}
                }
            }
        }
        Ok(DateSystem::Windows1900)
    }

    fn epoch(self) -> Option<NaiveDateTime> {
        let date = match self {
            DateSystem::Windows1900 => NaiveDate::from_ymd_opt(1899, 12, 30),
            DateSystem::Mac1904 => NaiveDate::from_ymd_opt(1904, 1, 1),
        };
        date.and_then(|d| d.and_hms_opt(0, 0, 0))
    }

    /// Convert a serial to a date cell. Fractions are rounded to the
    /// millisecond. Values below one day are a time of day. In the 1900
    /// system serials below 60 skip Excel's phantom 1900-02-29.
    pub fn cell_for(self, serial: f64) -> Option<Cell> {
        if !serial.is_finite() || !(0.0..MAX_SERIAL).contains(&serial) {
            return None;
        }

        let mut days = serial.floor() as i64;
        let millis = ((serial - serial.floor()) * MILLIS_PER_DAY as f64).round() as i64;

        if serial < 1.0 && millis < MILLIS_PER_DAY {
            let time = NaiveTime::from_num_seconds_from_midnight_opt(
                (millis / 1_000) as u32,
                (millis % 1_000) as u32 * 1_000_000,
            )?;
            return Some(Cell::Time(time));
        }

        if self == DateSystem::Windows1900 && serial > 0.0 && serial < 60.0 {
            days += 1;
        }

        let offset = Duration::days(days) + Duration::milliseconds(millis);
        self.epoch()?.checked_add_signed(offset).map(Cell::DateTime)
    }
}

/// ISO 8601 value of a `t="d"` cell
pub fn parse_iso(value: &str) -> Option<Cell> {
    let value = value.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Cell::DateTime(dt));
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(Cell::DateTime);
    }
    NaiveTime::parse_from_str(value, "%H:%M:%S%.f")
        .ok()
        .map(Cell::Time)
}

/// Which cell style indexes carry a date format, plus the date system
#[derive(Debug, Default)]
pub struct Styles {
    date_xfs: Vec<bool>,
    pub date_system: DateSystem,
}

impl Styles {
    pub fn is_date(&self, style: Option<usize>) -> bool {
        style
            .and_then(|index| self.date_xfs.get(index))
            .copied()
            .unwrap_or(false)
    }

    pub fn parse(xml: &str) -> Result<Self, TableError> {
        let mut custom: HashMap<u32, String> = HashMap::new();
        let mut xf_formats: Vec<u32> = Vec::new();
        let mut in_cell_xfs = false;

        for event in events(xml, STYLES) {
            match event? {
                XmlEvent::StartElement {
                    name, attributes, ..
                } => match name.local_name.as_str() {
                    "numFmt" => {
                        let id = attr(&attributes, "numFmtId").and_then(|v| v.parse::<u32>().ok());
                        if let (Some(id), Some(code)) = (id, attr(&attributes, "formatCode")) {
                            custom.insert(id, code);
                        }
                    }
                    "cellXfs" => in_cell_xfs = true,
                    "xf" if in_cell_xfs => xf_formats.push(
                        attr(&attributes, "numFmtId")
                            .and_then(|v| v.parse::<u32>().ok())
                            .unwrap_or(0),
                    ),
                    _ => {}
                },
                XmlEvent::EndElement { name } if name.local_name == "cellXfs" => {
                    in_cell_xfs = false
                }
                _ => {}
            }
        }

        let date_xfs = xf_formats
            .into_iter()
            .map(|id| match custom.get(&id) {
                Some(code) => is_date_format(code),
                None => builtin_is_date(id),
            })
            .collect();

        Ok(Self {
            date_xfs,
            date_system: DateSystem::default(),
        })
    }
}
