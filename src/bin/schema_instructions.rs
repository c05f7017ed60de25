//! Prints a schema migration with instructions for running it by hand.
//! No credentials are needed; the project URL is only used to link the editor.

use std::path::PathBuf;

use anyhow::Result;
use gpt_catalog_migrate::report::banner;
use gpt_catalog_migrate::schema::read_statement;
use gpt_catalog_migrate::{init_tracing, ManualStep, StoreConfig};

const DEFAULT_SQL_PATH: &str = "supabase/migrations/003_add_is_broken_column.sql";

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let path = std::env::var("SCHEMA_SQL_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_SQL_PATH));

    println!("\n{}\n", banner(&format!("MIGRATION: {}", path.display())));
    let sql = read_statement(&path)?;
    tracing::info!(target: "schema", path = %path.display(), bytes = sql.len(), "statement loaded");
    println!("Migration SQL:\n{sql}\n");

    let editor = StoreConfig::from_env().ok().and_then(|c| c.sql_editor_url());
    println!("{}", ManualStep::new(sql, editor));
    println!("After running it, re-run the catalogue migration: gpt-catalog-migrate\n");
    Ok(())
}
