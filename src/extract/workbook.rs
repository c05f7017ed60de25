// src/extract/workbook.rs
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Range, Reader};
use tracing::info;

use crate::error::ExtractionError;

pub const DEFAULT_SHEET: &str = "Centralized Database";

/// Something that can hand over the catalogue sheet as a cell range.
pub trait SheetSource {
    fn load_sheet(&self) -> Result<Range<Data>, ExtractionError>;

    /// Label for progress output.
    fn describe(&self) -> String;
}

/// Workbook on disk (xlsx, xls, xlsb or ods).
#[derive(Debug, Clone)]
pub struct WorkbookFile {
    pub path: PathBuf,
    pub sheet: String,
}

impl WorkbookFile {
    pub fn new(path: impl Into<PathBuf>, sheet: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sheet: sheet.into(),
        }
    }
}

impl SheetSource for WorkbookFile {
    fn load_sheet(&self) -> Result<Range<Data>, ExtractionError> {
        read_sheet(&self.path, &self.sheet)
    }

    fn describe(&self) -> String {
        format!("{} [{}]", self.path.display(), self.sheet)
    }
}

/// In-memory sheets, used by tests and callers that already hold a range.
impl SheetSource for Range<Data> {
    fn load_sheet(&self) -> Result<Range<Data>, ExtractionError> {
        Ok(self.clone())
    }

    fn describe(&self) -> String {
        let (rows, cols) = self.get_size();
        format!("in-memory sheet ({rows}x{cols})")
    }
}

pub fn read_sheet(path: &Path, sheet: &str) -> Result<Range<Data>, ExtractionError> {
    if !path.exists() {
        return Err(ExtractionError::WorkbookNotFound(path.to_path_buf()));
    }
    let mut workbook = open_workbook_auto(path).map_err(|source| ExtractionError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let names = workbook.sheet_names().to_vec();
    if !names.iter().any(|n| n == sheet) {
        return Err(ExtractionError::SheetNotFound {
            sheet: sheet.to_string(),
            available: names.join(", "),
        });
    }

    let range = workbook
        .worksheet_range(sheet)
        .map_err(|source| ExtractionError::Sheet {
            sheet: sheet.to_string(),
            source,
        })?;
    let (rows, cols) = range.get_size();
    info!(target: "extract", path = %path.display(), sheet, rows, cols, "sheet loaded");
    Ok(range)
}
