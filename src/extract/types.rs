// src/extract/types.rs
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub const DEFAULT_NAME: &str = "Untitled GPT";
pub const DEFAULT_DESCRIPTION: &str = "No description available";

/// Raw value of a score or date cell, kept as-is until ranking/normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Bool(bool),
    DateTime(NaiveDateTime),
}

/// One catalogue row.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRecord {
    pub gpt_id: String,
    pub name: String,
    pub description: String,
    pub creator_email: Option<String>,
    pub tags: Option<String>,
    pub first_active: Option<CellValue>,
    pub last_active: Option<CellValue>,
    pub total_messages: i64,
    pub unique_users: i64,
    pub average_score: CellValue,
}

impl SourceRecord {
    /// Record with every optional field at its extraction default.
    pub fn new(gpt_id: impl Into<String>) -> Self {
        Self {
            gpt_id: gpt_id.into(),
            name: DEFAULT_NAME.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            creator_email: None,
            tags: None,
            first_active: None,
            last_active: None,
            total_messages: 0,
            unique_users: 0,
            average_score: CellValue::Number(0.0),
        }
    }
}

fn col_gpt_id() -> u32 {
    1
}
fn col_name() -> u32 {
    2
}
fn col_description() -> u32 {
    3
}
fn col_creator_email() -> u32 {
    4
}
fn col_tags() -> u32 {
    5
}
fn col_first_active() -> u32 {
    6
}
fn col_last_active() -> u32 {
    7
}
fn col_total_messages() -> u32 {
    10
}
fn col_unique_users() -> u32 {
    12
}
fn col_average_score() -> u32 {
    16
}

/// 1-based column positions in the catalogue sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMap {
    #[serde(default = "col_gpt_id")]
    pub gpt_id: u32,
    #[serde(default = "col_name")]
    pub name: u32,
    #[serde(default = "col_description")]
    pub description: u32,
    #[serde(default = "col_creator_email")]
    pub creator_email: u32,
    #[serde(default = "col_tags")]
    pub tags: u32,
    #[serde(default = "col_first_active")]
    pub first_active: u32,
    #[serde(default = "col_last_active")]
    pub last_active: u32,
    #[serde(default = "col_total_messages")]
    pub total_messages: u32,
    #[serde(default = "col_unique_users")]
    pub unique_users: u32,
    #[serde(default = "col_average_score")]
    pub average_score: u32,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            gpt_id: col_gpt_id(),
            name: col_name(),
            description: col_description(),
            creator_email: col_creator_email(),
            tags: col_tags(),
            first_active: col_first_active(),
            last_active: col_last_active(),
            total_messages: col_total_messages(),
            unique_users: col_unique_users(),
            average_score: col_average_score(),
        }
    }
}

/// When the extractor stops scanning.
///
/// `FirstBlankIdentifier` truncates at the first row without an identifier,
/// even if populated rows follow it. The other variants skip blank rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopPolicy {
    #[default]
    FirstBlankIdentifier,
    ConsecutiveBlank(usize),
    EndOfSheet,
}

impl StopPolicy {
    /// Whether a run of `blank_run` consecutive blank identifiers ends the scan.
    pub fn stops_after(&self, blank_run: usize) -> bool {
        match self {
            StopPolicy::FirstBlankIdentifier => blank_run >= 1,
            StopPolicy::ConsecutiveBlank(n) => blank_run >= (*n).max(1),
            StopPolicy::EndOfSheet => false,
        }
    }
}
