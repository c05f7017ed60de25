// src/error.rs
//! Error taxonomy for the migration pipeline.
//!
//! Fatal classes (`ConfigError`, `ExtractionError`, `ResetError`) bubble up to
//! `MigrationError` and abort the run. `RecordLoadError` and the schema-apply
//! rejection are recovered where they happen and only show up in reports.

use std::path::PathBuf;

use thiserror::Error;

use crate::store::Table;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {0} (set it in the environment or .env)")]
    MissingSetting(&'static str),
    #[error("reading config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{var} points to non-existent path {path}")]
    MissingFile { var: &'static str, path: PathBuf },
    #[error("url_template {0:?} has no {{id}} placeholder")]
    InvalidUrlTemplate(String),
    #[error("building HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("workbook not found: {0}")]
    WorkbookNotFound(PathBuf),
    #[error("opening workbook {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },
    #[error("sheet {sheet:?} not found (available: {available})")]
    SheetNotFound { sheet: String, available: String },
    #[error("reading sheet {sheet:?}: {source}")]
    Sheet {
        sheet: String,
        #[source]
        source: calamine::Error,
    },
}

/// Failure of a single store call.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("store returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("foreign key violation: {0}")]
    Constraint(String),
    #[error("{0}")]
    Rejected(String),
}

impl StoreError {
    /// True when the store refused the call for lack of privileges.
    pub fn is_permission_denied(&self) -> bool {
        match self {
            StoreError::Status { status, body } => {
                matches!(status, 401 | 403) || body.contains("permission denied")
            }
            StoreError::Rejected(msg) => msg.contains("permission denied"),
            _ => false,
        }
    }
}

#[derive(Debug, Error)]
#[error("clearing table {table}: {source}")]
pub struct ResetError {
    pub table: Table,
    #[source]
    pub source: StoreError,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransformError {
    #[error("record has no identifier")]
    MissingIdentifier,
}

/// A single insert that failed; the load carries on without it.
#[derive(Debug, Error)]
#[error("inserting {name}: {source}")]
pub struct RecordLoadError {
    pub name: String,
    #[source]
    pub source: StoreError,
}

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Reset(#[from] ResetError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_detection_covers_status_and_message() {
        let forbidden = StoreError::Status {
            status: 403,
            body: String::new(),
        };
        assert!(forbidden.is_permission_denied());

        let pg = StoreError::Status {
            status: 400,
            body: r#"{"message":"permission denied for schema public"}"#.into(),
        };
        assert!(pg.is_permission_denied());

        let missing = StoreError::Status {
            status: 404,
            body: "function exec does not exist".into(),
        };
        assert!(!missing.is_permission_denied());
    }

    #[test]
    fn reset_error_names_the_table() {
        let err = ResetError {
            table: Table::SavedPrompts,
            source: StoreError::Rejected("boom".into()),
        };
        assert_eq!(err.to_string(), "clearing table saved_prompts: boom");
    }
}
