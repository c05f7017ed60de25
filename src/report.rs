// src/report.rs
//! Human-readable output for the CLI.

use std::fmt;

use crate::runner::{MigrationReport, SelectedEntry};

const BANNER_WIDTH: usize = 60;

pub fn banner(title: &str) -> String {
    let rule = "=".repeat(BANNER_WIDTH);
    format!("{rule}\n{title}\n{rule}")
}

pub fn render_selection(entries: &[SelectedEntry]) -> String {
    let mut out = String::new();
    for e in entries {
        out.push_str(&format!(
            "   {}. {}\n      Score: {}, Users: {}, Messages: {}\n",
            e.rank, e.name, e.score, e.unique_users, e.total_messages
        ));
    }
    out
}

impl fmt::Display for MigrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cleared {} existing rows:", self.reset.total())?;
        for (table, n) in &self.reset.deleted {
            writeln!(f, "   {table}: {n}")?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "Found {} records; selected top {} by average score:",
            self.extracted,
            self.selected.len()
        )?;
        write!(f, "{}", render_selection(&self.selected))?;
        if !self.skipped.is_empty() {
            let ranks: Vec<String> = self.skipped.iter().map(|r| r.to_string()).collect();
            writeln!(f, "Skipped (no identifier) at rank: {}", ranks.join(", "))?;
        }
        writeln!(f)?;
        for failure in self.load.failures() {
            writeln!(f, "Error inserting {}: {}", failure.name, failure.source)?;
        }
        writeln!(
            f,
            "Successfully inserted {}/{} records",
            self.inserted(),
            self.attempted()
        )
    }
}
