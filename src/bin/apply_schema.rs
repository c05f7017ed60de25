//! Applies a schema migration through the `exec` procedure, or prints it for
//! manual execution when the key is not allowed to run DDL.

use std::path::PathBuf;

use anyhow::{Context, Result};
use gpt_catalog_migrate::report::banner;
use gpt_catalog_migrate::schema::read_statement;
use gpt_catalog_migrate::{apply_statement, init_tracing, ApplyOutcome, StoreConfig, SupabaseStore};

const DEFAULT_SQL_PATH: &str = "supabase/migrations/002_add_uses_column.sql";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    println!("\n{}\n", banner("SUPABASE MIGRATION TOOL"));

    let store_cfg = StoreConfig::from_env().context("loading store credentials")?;
    let store = SupabaseStore::new(&store_cfg).context("initializing store client")?;
    println!("Connected to Supabase\n");

    let path = std::env::var("SCHEMA_SQL_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_SQL_PATH));
    println!("Applying migration: {}", path.display());
    let sql = read_statement(&path)?;

    match apply_statement(&store, &sql, store_cfg.sql_editor_url()).await {
        ApplyOutcome::Applied => println!("Migration applied successfully!"),
        ApplyOutcome::NeedsManualStep(step) => println!("\n{step}"),
    }
    Ok(())
}
