//! Catalogue migration: binary entrypoint.
//! Clears the prompts tables, then loads the top-ranked GPTs from the workbook.
//!
//! Settings come from `.env` / the environment and `config/migration.toml`;
//! see `gpt_catalog_migrate::config`.

use anyhow::{Context, Result};
use gpt_catalog_migrate::report::banner;
use gpt_catalog_migrate::{
    init_tracing, Metrics, MigrationRunner, MigrationSettings, RunSettings, StoreConfig,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env when present; real env vars win.
    let _ = dotenvy::dotenv();
    init_tracing();
    // Opt-in via MIGRATION_METRICS; counters are dumped after the summary.
    let metrics = Metrics::from_env();

    println!("\n{}\n", banner("GPT CATALOG MIGRATION"));

    let store_cfg = StoreConfig::from_env().context("loading store credentials")?;
    let settings = MigrationSettings::load_default().context("loading migration settings")?;

    let runner = MigrationRunner::connect(&store_cfg, settings.workbook(), RunSettings::from(&settings))
        .context("initializing store client")?;
    println!("Connected to Supabase\n");

    let report = runner.run().await.context("migration failed")?;

    println!("{report}");
    println!("{}", banner("MIGRATION COMPLETE!"));
    println!("Migrated {} records to Supabase\n", report.inserted());
    if let Some(m) = &metrics {
        println!("{}", m.render());
    }
    Ok(())
}
