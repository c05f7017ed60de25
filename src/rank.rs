// src/rank.rs
//! Top-N selection by average score.

use std::cmp::Ordering;

use crate::extract::{CellValue, SourceRecord};

/// Score used for ranking. Numeric text is parsed; anything else ranks as 0.
pub fn score_of(value: &CellValue) -> f64 {
    let raw = match value {
        CellValue::Number(n) => *n,
        CellValue::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        CellValue::Bool(b) => f64::from(u8::from(*b)),
        CellValue::DateTime(_) => 0.0,
    };
    if raw.is_nan() {
        0.0
    } else {
        raw
    }
}

/// Records ordered by score, best first, at most N of them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedSelection(Vec<SourceRecord>);

impl RankedSelection {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SourceRecord> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<SourceRecord> {
        self.0
    }
}

impl IntoIterator for RankedSelection {
    type Item = SourceRecord;
    type IntoIter = std::vec::IntoIter<SourceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Stable descending sort: equal scores keep extraction order.
pub fn select_top(records: impl IntoIterator<Item = SourceRecord>, n: usize) -> RankedSelection {
    let mut scored: Vec<(f64, SourceRecord)> = records
        .into_iter()
        .map(|r| (score_of(&r.average_score), r))
        .collect();
    // `sort_by` is stable.
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
    scored.truncate(n);
    RankedSelection(scored.into_iter().map(|(_, r)| r).collect())
}
