// src/runner.rs
//! Reset → Extract → Rank → Transform → Load, with a report at the end.
//!
//! Only reset and extraction can abort a run. Transform and load problems are
//! recorded per record and the run still ends in `Reported`.

use std::fmt;

use tracing::{info, warn};

use crate::config::{MigrationSettings, StoreConfig};
use crate::error::MigrationError;
use crate::extract::{ColumnMap, Extractor, SheetSource, StopPolicy};
use crate::load::{LoadOutcome, Loader};
use crate::rank::{score_of, select_top};
use crate::reset::{DependencyOrderedResetter, ResetReport};
use crate::store::{PromptStore, SupabaseStore};
use crate::transform::{DestinationRecord, Transformer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    Reset,
    Extract,
    Rank,
    Transform,
    Load,
    Reported,
    Aborted,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One line of the "selected" listing.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedEntry {
    pub rank: usize,
    pub name: String,
    pub score: f64,
    pub unique_users: i64,
    pub total_messages: i64,
}

#[derive(Debug)]
pub struct MigrationReport {
    pub states: Vec<RunState>,
    pub reset: ResetReport,
    pub extracted: usize,
    pub selected: Vec<SelectedEntry>,
    /// Records dropped before load (no identifier), by rank.
    pub skipped: Vec<usize>,
    pub load: LoadOutcome,
}

impl MigrationReport {
    pub fn attempted(&self) -> usize {
        self.load.attempted()
    }

    pub fn inserted(&self) -> usize {
        self.load.inserted()
    }
}

/// Everything the pipeline needs besides the store and the sheet.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub limit: usize,
    pub columns: ColumnMap,
    pub stop_policy: StopPolicy,
    pub transformer: Transformer,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            limit: 50,
            columns: ColumnMap::default(),
            stop_policy: StopPolicy::default(),
            transformer: Transformer::default(),
        }
    }
}

impl From<&MigrationSettings> for RunSettings {
    fn from(s: &MigrationSettings) -> Self {
        Self {
            limit: s.limit,
            columns: s.columns,
            stop_policy: s.stop_policy,
            transformer: s.transformer(),
        }
    }
}

pub struct MigrationRunner<S, P> {
    store: S,
    source: P,
    settings: RunSettings,
}

impl<P: SheetSource> MigrationRunner<SupabaseStore, P> {
    /// Init step against the hosted store. Nothing is mutated if this fails.
    pub fn connect(
        store_cfg: &StoreConfig,
        source: P,
        settings: RunSettings,
    ) -> Result<Self, MigrationError> {
        let store = SupabaseStore::new(store_cfg)?;
        info!(target: "runner", url = %store_cfg.url, "store client ready");
        Ok(Self::new(store, source, settings))
    }
}

impl<S: PromptStore, P: SheetSource> MigrationRunner<S, P> {
    pub fn new(store: S, source: P, settings: RunSettings) -> Self {
        Self {
            store,
            source,
            settings,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn run(&self) -> Result<MigrationReport, MigrationError> {
        let mut states = vec![RunState::Init];

        enter(&mut states, RunState::Reset);
        let reset = DependencyOrderedResetter::new(&self.store)
            .reset()
            .await
            .map_err(|e| abort(&mut states, e.into()))?;

        enter(&mut states, RunState::Extract);
        info!(target: "runner", source = %self.source.describe(), "reading source");
        let range = self
            .source
            .load_sheet()
            .map_err(|e| abort(&mut states, e.into()))?;
        let records: Vec<_> =
            Extractor::new(&range, self.settings.columns, self.settings.stop_policy).collect();
        let extracted = records.len();
        info!(target: "runner", extracted, "records extracted");

        enter(&mut states, RunState::Rank);
        let selection = select_top(records, self.settings.limit);
        let selected: Vec<SelectedEntry> = selection
            .iter()
            .enumerate()
            .map(|(i, r)| SelectedEntry {
                rank: i + 1,
                name: r.name.clone(),
                score: score_of(&r.average_score),
                unique_users: r.unique_users,
                total_messages: r.total_messages,
            })
            .collect();
        info!(
            target: "runner",
            selected = selected.len(),
            limit = self.settings.limit,
            "top records selected"
        );

        enter(&mut states, RunState::Transform);
        let mut skipped = Vec::new();
        let mut destination: Vec<DestinationRecord> = Vec::with_capacity(selection.len());
        for (i, record) in selection.iter().enumerate() {
            match self.settings.transformer.transform(record) {
                Ok(d) => destination.push(d),
                Err(e) => {
                    warn!(target: "runner", rank = i + 1, error = %e, "record skipped");
                    skipped.push(i + 1);
                }
            }
        }

        enter(&mut states, RunState::Load);
        let load = Loader::new(&self.store).load(destination).await;

        enter(&mut states, RunState::Reported);
        info!(
            target: "runner",
            attempted = load.attempted(),
            inserted = load.inserted(),
            "migration complete"
        );
        Ok(MigrationReport {
            states,
            reset,
            extracted,
            selected,
            skipped,
            load,
        })
    }
}

fn enter(states: &mut Vec<RunState>, next: RunState) {
    tracing::debug!(target: "runner", state = %next, "enter");
    states.push(next);
}

fn abort(states: &mut Vec<RunState>, err: MigrationError) -> MigrationError {
    let from = states.last().copied().unwrap_or(RunState::Init);
    warn!(target: "runner", %from, error = %err, "migration aborted");
    states.push(RunState::Aborted);
    err
}
