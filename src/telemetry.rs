// src/telemetry.rs
//! Counters emitted by the pipeline, plus an opt-in Prometheus recorder.
//!
//! The library only emits through the `metrics` facade. With no recorder
//! installed the counters are dropped, so an embedding application that wants
//! them must install its own recorder or call [`Metrics::from_env`].

use metrics::describe_counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::warn;

pub const ENV_METRICS: &str = "MIGRATION_METRICS";

pub const DELETED_ROWS: &str = "migrate_deleted_rows_total";
pub const INSERTED: &str = "migrate_inserted_total";
pub const INSERT_FAILURES: &str = "migrate_insert_failures_total";

fn describe_all() {
    describe_counter!(DELETED_ROWS, "Rows removed by the dependency-ordered reset.");
    describe_counter!(INSERTED, "Prompts inserted.");
    describe_counter!(INSERT_FAILURES, "Prompt inserts that failed and were skipped.");
}

/// One-time descriptions for whatever recorder is current on first use.
pub(crate) fn ensure_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(describe_all);
}

fn requested() -> bool {
    std::env::var(ENV_METRICS)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Installs the global Prometheus recorder when `MIGRATION_METRICS` is
    /// truthy. Returns `None` when not requested or when a recorder is
    /// already installed.
    pub fn from_env() -> Option<Self> {
        if !requested() {
            return None;
        }
        match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                describe_all();
                Some(Self { handle })
            }
            Err(e) => {
                warn!(target: "metrics", error = %e, "recorder not installed");
                None
            }
        }
    }

    /// Prometheus exposition text of everything recorded so far.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}
