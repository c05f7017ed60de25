// src/load.rs
//! Record-by-record insert that keeps going past failures.

use metrics::counter;
use tracing::{info, warn};

use crate::error::RecordLoadError;
use crate::store::PromptStore;
use crate::telemetry;
use crate::transform::DestinationRecord;

/// Per-record result, in input order.
#[derive(Debug)]
pub struct RecordOutcome {
    pub name: String,
    pub url: String,
    pub result: Result<(), RecordLoadError>,
}

#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub records: Vec<RecordOutcome>,
}

impl LoadOutcome {
    pub fn attempted(&self) -> usize {
        self.records.len()
    }

    pub fn inserted(&self) -> usize {
        self.records.iter().filter(|r| r.result.is_ok()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &RecordLoadError> {
        self.records.iter().filter_map(|r| r.result.as_ref().err())
    }
}

pub struct Loader<'a, S: PromptStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: PromptStore + ?Sized> Loader<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub async fn load(&self, records: Vec<DestinationRecord>) -> LoadOutcome {
        telemetry::ensure_described();
        let mut outcome = LoadOutcome {
            records: Vec::with_capacity(records.len()),
        };
        for record in records {
            let result = self.insert_one(&record).await;
            outcome.records.push(RecordOutcome {
                name: record.generated_name,
                url: record.url,
                result,
            });
        }
        info!(
            target: "load",
            inserted = outcome.inserted(),
            attempted = outcome.attempted(),
            "load finished"
        );
        outcome
    }

    async fn insert_one(&self, record: &DestinationRecord) -> Result<(), RecordLoadError> {
        match self.store.insert_prompt(record).await {
            Ok(()) => {
                counter!(telemetry::INSERTED).increment(1);
                info!(
                    target: "load",
                    name = %record.generated_name,
                    url = %record.url,
                    tags = %record.tags.join(", "),
                    upvotes = record.upvotes,
                    uses = record.uses,
                    "inserted"
                );
                Ok(())
            }
            Err(source) => {
                counter!(telemetry::INSERT_FAILURES).increment(1);
                warn!(target: "load", name = %record.generated_name, error = %source, "insert failed");
                Err(RecordLoadError {
                    name: record.generated_name.clone(),
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::SourceRecord;
    use crate::store::{MemoryStore, Table};
    use crate::transform::Transformer;

    fn records(names: &[&str]) -> Vec<DestinationRecord> {
        let t = Transformer::default();
        names
            .iter()
            .map(|n| {
                let src = SourceRecord {
                    name: n.to_string(),
                    ..SourceRecord::new(format!("g-{n}"))
                };
                t.transform(&src).unwrap()
            })
            .collect()
    }

    #[tokio::test]
    async fn failures_do_not_stop_the_loop() {
        let store = MemoryStore::new();
        store.fail_inserts_named("b");
        store.fail_inserts_named("d");

        let out = Loader::new(&store).load(records(&["a", "b", "c", "d", "e"])).await;

        assert_eq!(out.attempted(), 5);
        assert_eq!(out.inserted(), 3);
        let failed: Vec<_> = out.failures().map(|e| e.name.as_str()).collect();
        assert_eq!(failed, vec!["b", "d"]);

        let stored: Vec<_> = store
            .prompts()
            .into_iter()
            .map(|p| p.record.generated_name)
            .collect();
        assert_eq!(stored, vec!["a", "c", "e"]);
    }

    #[tokio::test]
    async fn all_failing_yields_zero() {
        let store = MemoryStore::new();
        store.fail_inserts_named("x");
        let out = Loader::new(&store).load(records(&["x", "x"])).await;
        assert_eq!(out.inserted(), 0);
        assert_eq!(out.attempted(), 2);
        assert_eq!(store.row_count(Table::Prompts), 0);
    }

    #[tokio::test]
    async fn empty_input_is_a_no_op() {
        let store = MemoryStore::new();
        let out = Loader::new(&store).load(Vec::new()).await;
        assert_eq!((out.attempted(), out.inserted()), (0, 0));
    }

    #[tokio::test]
    async fn every_row_carries_the_migration_token() {
        let store = MemoryStore::new();
        Loader::new(&store).load(records(&["a", "b"])).await;
        let tokens: std::collections::HashSet<_> =
            store.prompts().iter().map(|p| p.record.user_token).collect();
        assert_eq!(tokens.len(), 1);
    }
}
