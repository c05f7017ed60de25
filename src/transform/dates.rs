// src/transform/dates.rs
//! Timestamp normalization for `created_at`.
//!
//! Unparseable input never errors: it falls back to "now". Output is naive
//! ISO-8601 (`YYYY-MM-DDTHH:MM:SS`, fractional seconds only when present).

use chrono::{NaiveDate, NaiveDateTime, Timelike, Utc};
use once_cell::sync::OnceCell;
use regex::Regex;

use crate::extract::CellValue;

const CANONICAL: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub fn canonical(dt: &NaiveDateTime) -> String {
    dt.format(CANONICAL).to_string()
}

/// Normalize against the wall clock (UTC, microsecond precision).
pub fn normalize(value: Option<&CellValue>) -> String {
    normalize_with(value, now_micros)
}

fn now_micros() -> NaiveDateTime {
    let now = Utc::now().naive_utc();
    let micros = now.nanosecond() / 1_000 * 1_000;
    now.with_nanosecond(micros).unwrap_or(now)
}

/// Same as [`normalize`] with an injectable clock.
pub fn normalize_with(value: Option<&CellValue>, now: impl FnOnce() -> NaiveDateTime) -> String {
    match value.and_then(to_datetime) {
        Some(dt) => canonical(&dt),
        None => canonical(&now()),
    }
}

fn to_datetime(value: &CellValue) -> Option<NaiveDateTime> {
    match value {
        CellValue::DateTime(dt) => Some(*dt),
        CellValue::Text(s) => parse_calendar_date(s),
        CellValue::Number(_) | CellValue::Bool(_) => None,
    }
}

fn parse_calendar_date(s: &str) -> Option<NaiveDateTime> {
    static RE_DATE: OnceCell<Regex> = OnceCell::new();
    let re = RE_DATE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"));
    let s = s.trim();
    if !re.is_match(s) {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
