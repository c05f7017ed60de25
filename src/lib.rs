// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod config;
pub mod error;
pub mod extract;
pub mod load;
pub mod rank;
pub mod report;
pub mod reset;
pub mod runner;
pub mod schema;
pub mod store;
pub mod telemetry;
pub mod transform;

// ---- Re-exports for stable public API ----
pub use crate::config::{MigrationSettings, StoreConfig};
pub use crate::error::{ConfigError, ExtractionError, MigrationError, ResetError, StoreError};
pub use crate::extract::{Extractor, SourceRecord, StopPolicy};
pub use crate::load::{LoadOutcome, Loader};
pub use crate::rank::{select_top, RankedSelection};
pub use crate::reset::DependencyOrderedResetter;
pub use crate::runner::{MigrationReport, MigrationRunner, RunSettings, RunState};
pub use crate::schema::{apply_statement, ApplyOutcome, ManualStep};
pub use crate::store::{MemoryStore, PromptStore, SupabaseStore, Table};
pub use crate::telemetry::Metrics;
pub use crate::transform::{DestinationRecord, Transformer};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact progress logs on stderr. `RUST_LOG` overrides the default `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A second init (tests, repeated calls) is harmless.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
        .try_init();
}
