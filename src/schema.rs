// src/schema.rs
//! Schema-altering statements: try the `exec` procedure, otherwise hand the
//! statement to the operator.

use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::store::PromptStore;

const RULER_WIDTH: usize = 60;

/// Instructions for running a statement by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualStep {
    pub statement: String,
    /// Where to paste it, when the project URL tells us.
    pub sql_editor_url: Option<String>,
    /// Why the automated path did not work, if it was tried.
    pub reason: Option<String>,
}

impl ManualStep {
    pub fn new(statement: impl Into<String>, sql_editor_url: Option<String>) -> Self {
        Self {
            statement: statement.into(),
            sql_editor_url,
            reason: None,
        }
    }
}

impl fmt::Display for ManualStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ruler = "-".repeat(RULER_WIDTH);
        if let Some(reason) = &self.reason {
            writeln!(f, "Automatic apply failed: {reason}")?;
            writeln!(f)?;
        }
        writeln!(f, "Please run this SQL manually in the Supabase SQL Editor:")?;
        writeln!(f)?;
        match &self.sql_editor_url {
            Some(url) => writeln!(f, "1. Go to {url}")?,
            None => writeln!(f, "1. Open the SQL Editor of your Supabase project")?,
        }
        writeln!(f, "2. Copy and paste this SQL:")?;
        writeln!(f)?;
        writeln!(f, "{ruler}")?;
        writeln!(f, "{}", self.statement.trim_end())?;
        writeln!(f, "{ruler}")?;
        writeln!(f)?;
        writeln!(f, "3. Click 'Run' to execute the migration")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    NeedsManualStep(ManualStep),
}

/// Never fails: a refused statement turns into a [`ManualStep`].
pub async fn apply_statement<S: PromptStore + ?Sized>(
    store: &S,
    statement: &str,
    sql_editor_url: Option<String>,
) -> ApplyOutcome {
    match store.execute_sql(statement).await {
        Ok(()) => {
            info!(target: "schema", store = store.name(), "statement applied");
            ApplyOutcome::Applied
        }
        Err(e) => {
            warn!(
                target: "schema",
                error = %e,
                permission_denied = e.is_permission_denied(),
                "statement not applied; falling back to manual step"
            );
            let mut step = ManualStep::new(statement, sql_editor_url);
            step.reason = Some(e.to_string());
            ApplyOutcome::NeedsManualStep(step)
        }
    }
}

/// Reads a migration file verbatim.
pub fn read_statement(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading migration SQL from {}", path.display()))
}
