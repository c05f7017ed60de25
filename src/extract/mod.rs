// src/extract/mod.rs
//! Row extraction from the catalogue sheet.
//!
//! `Extractor` walks the sheet lazily, one record per row, beginning right
//! after the header. Optional cells get their defaults here so that nothing
//! downstream has to care about blank cells.

pub mod types;
pub mod workbook;

use calamine::{Data, Range};
use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

pub use types::{CellValue, ColumnMap, SourceRecord, StopPolicy, DEFAULT_DESCRIPTION, DEFAULT_NAME};
pub use workbook::{SheetSource, WorkbookFile, DEFAULT_SHEET};

/// Lazy iterator over the data rows of a sheet.
pub struct Extractor<'a> {
    range: &'a Range<Data>,
    columns: ColumnMap,
    policy: StopPolicy,
    next_row: u32,
    last_row: u32,
    blank_run: usize,
    done: bool,
}

impl<'a> Extractor<'a> {
    pub fn new(range: &'a Range<Data>, columns: ColumnMap, policy: StopPolicy) -> Self {
        let (last_row, done) = match range.end() {
            Some((row, _)) => (row, false),
            None => (0, true),
        };
        Self {
            range,
            columns,
            policy,
            // Row 0 is the header.
            next_row: 1,
            last_row,
            blank_run: 0,
            done,
        }
    }

    fn cell(&self, row: u32, col: u32) -> Option<&'a Data> {
        // Columns are 1-based; a 0 in the map simply reads nothing.
        let col = col.checked_sub(1)?;
        self.range.get_value((row, col))
    }

    fn record_at(&self, row: u32, gpt_id: String) -> SourceRecord {
        let c = &self.columns;
        SourceRecord {
            gpt_id,
            name: cell_text(self.cell(row, c.name)).unwrap_or_else(|| DEFAULT_NAME.to_string()),
            description: cell_text(self.cell(row, c.description))
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            creator_email: cell_text(self.cell(row, c.creator_email)),
            tags: cell_text(self.cell(row, c.tags)),
            first_active: cell_value(self.cell(row, c.first_active)),
            last_active: cell_value(self.cell(row, c.last_active)),
            total_messages: cell_count(self.cell(row, c.total_messages)),
            unique_users: cell_count(self.cell(row, c.unique_users)),
            average_score: cell_value(self.cell(row, c.average_score))
                .unwrap_or(CellValue::Number(0.0)),
        }
    }

    fn populated_rows_after(&self, row: u32) -> usize {
        (row + 1..=self.last_row)
            .filter(|r| !is_blank(self.cell(*r, self.columns.gpt_id)))
            .count()
    }
}

impl Iterator for Extractor<'_> {
    type Item = SourceRecord;

    fn next(&mut self) -> Option<SourceRecord> {
        while !self.done {
            if self.next_row > self.last_row {
                self.done = true;
                break;
            }
            let row = self.next_row;
            self.next_row += 1;

            let id_cell = self.cell(row, self.columns.gpt_id);
            if !is_blank(id_cell) {
                self.blank_run = 0;
                match cell_text(id_cell) {
                    Some(gpt_id) => return Some(self.record_at(row, gpt_id)),
                    None => {
                        // Whitespace or an error value: not the end of data, but nothing to key on.
                        warn!(target: "extract", sheet_row = row + 1, "unusable identifier; row skipped");
                        continue;
                    }
                }
            }
            self.blank_run += 1;
            if self.policy.stops_after(self.blank_run) {
                self.done = true;
                let ignored = self.populated_rows_after(row);
                if ignored > 0 {
                    warn!(
                        target: "extract",
                        sheet_row = row + 1,
                        ignored,
                        "blank identifier ends extraction; later rows are not read"
                    );
                } else {
                    debug!(target: "extract", sheet_row = row + 1, "end of data");
                }
            }
        }
        None
    }
}

/// End-of-data marker for the identifier column: a missing cell or an empty
/// string. Whitespace-only text is not blank here.
pub(crate) fn is_blank(cell: Option<&Data>) -> bool {
    match cell {
        None | Some(Data::Empty) => true,
        Some(Data::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// Text content of a cell; blank strings and error cells count as absent.
pub(crate) fn cell_text(cell: Option<&Data>) -> Option<String> {
    let text = match cell? {
        Data::Empty | Data::Error(_) => return None,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                format!("{:.0}", f)
            } else {
                format!("{}", f)
            }
        }
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => {
            if *b {
                "TRUE".to_string()
            } else {
                "FALSE".to_string()
            }
        }
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) => ndt.format("%Y-%m-%dT%H:%M:%S").to_string(),
            None => dt.as_f64().to_string(),
        },
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Integer count; fractional values truncate, anything unparseable is 0.
pub(crate) fn cell_count(cell: Option<&Data>) -> i64 {
    match cell {
        Some(Data::Int(i)) => *i,
        Some(Data::Float(f)) if f.is_finite() => f.trunc() as i64,
        Some(Data::Bool(b)) => i64::from(*b),
        Some(Data::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite())
                        .map(|f| f.trunc() as i64)
                })
                .unwrap_or(0)
        }
        _ => 0,
    }
}

/// Raw value for score and date columns.
pub(crate) fn cell_value(cell: Option<&Data>) -> Option<CellValue> {
    match cell? {
        Data::Empty | Data::Error(_) => None,
        Data::Int(i) => Some(CellValue::Number(*i as f64)),
        Data::Float(f) => Some(CellValue::Number(*f)),
        Data::Bool(b) => Some(CellValue::Bool(*b)),
        Data::String(s) | Data::DurationIso(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| CellValue::Text(s.to_string()))
        }
        Data::DateTimeIso(s) => Some(
            parse_iso_datetime(s)
                .map(CellValue::DateTime)
                .unwrap_or_else(|| CellValue::Text(s.clone())),
        ),
        Data::DateTime(dt) => Some(
            dt.as_datetime()
                .map(CellValue::DateTime)
                .unwrap_or_else(|| CellValue::Number(dt.as_f64())),
        ),
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
