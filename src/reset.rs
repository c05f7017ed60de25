// src/reset.rs
//! Destructive reset of the destination tables, children before parent.

use metrics::counter;
use tracing::info;

use crate::error::ResetError;
use crate::store::{PromptStore, Table};
use crate::telemetry;

/// `prompts` is referenced by both child tables, so it goes last.
pub const RESET_ORDER: [Table; 3] = [Table::PromptUpvotes, Table::SavedPrompts, Table::Prompts];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResetReport {
    pub deleted: Vec<(Table, u64)>,
}

impl ResetReport {
    pub fn total(&self) -> u64 {
        self.deleted.iter().map(|(_, n)| n).sum()
    }

    pub fn deleted_from(&self, table: Table) -> Option<u64> {
        self.deleted
            .iter()
            .find(|(t, _)| *t == table)
            .map(|(_, n)| *n)
    }
}

pub struct DependencyOrderedResetter<'a, S: PromptStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: PromptStore + ?Sized> DependencyOrderedResetter<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Stops at the first failing table; tables after it are left untouched.
    pub async fn reset(&self) -> Result<ResetReport, ResetError> {
        telemetry::ensure_described();
        let mut report = ResetReport::default();
        for table in RESET_ORDER {
            let deleted = self
                .store
                .delete_all(table)
                .await
                .map_err(|source| ResetError { table, source })?;
            counter!(telemetry::DELETED_ROWS).increment(deleted);
            info!(target: "reset", %table, deleted, "table cleared");
            report.deleted.push((table, deleted));
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::SourceRecord;
    use crate::store::MemoryStore;
    use crate::transform::Transformer;

    fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        let t = Transformer::default();
        for id in ["a", "b"] {
            let p = store.seed_prompt(t.transform(&SourceRecord::new(id)).unwrap());
            store.seed_upvote(p).unwrap();
            store.seed_saved(p).unwrap();
        }
        store.seed_upvote(store.prompts()[0].id).unwrap();
        store
    }

    #[tokio::test]
    async fn clears_children_before_parent() {
        let store = seeded();
        let report = DependencyOrderedResetter::new(&store).reset().await.unwrap();

        assert_eq!(store.delete_log(), RESET_ORDER.to_vec());
        assert_eq!(report.deleted_from(Table::PromptUpvotes), Some(3));
        assert_eq!(report.deleted_from(Table::SavedPrompts), Some(2));
        assert_eq!(report.deleted_from(Table::Prompts), Some(2));
        assert_eq!(report.total(), 7);
        for t in RESET_ORDER {
            assert_eq!(store.row_count(t), 0);
        }
    }

    #[tokio::test]
    async fn second_reset_deletes_nothing() {
        let store = seeded();
        let resetter = DependencyOrderedResetter::new(&store);
        resetter.reset().await.unwrap();
        let again = resetter.reset().await.unwrap();
        assert_eq!(again.total(), 0);
        assert_eq!(again.deleted.len(), 3);
    }

    #[tokio::test]
    async fn failure_stops_before_later_tables() {
        let store = seeded();
        store.fail_deletes_on(Table::SavedPrompts);
        let err = DependencyOrderedResetter::new(&store).reset().await.unwrap_err();

        assert_eq!(err.table, Table::SavedPrompts);
        assert_eq!(store.row_count(Table::PromptUpvotes), 0);
        assert_eq!(store.row_count(Table::SavedPrompts), 2);
        assert_eq!(store.row_count(Table::Prompts), 2);
        assert_eq!(
            store.delete_log(),
            vec![Table::PromptUpvotes, Table::SavedPrompts]
        );
    }
}
