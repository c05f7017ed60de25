// src/store/mod.rs
pub mod memory;
pub mod supabase;

use std::fmt;

use crate::error::StoreError;
use crate::transform::DestinationRecord;

pub use memory::MemoryStore;
pub use supabase::SupabaseStore;

/// Tables the migration touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    /// `prompt_upvotes.prompt_id` references `prompts.id`.
    PromptUpvotes,
    /// `saved_prompts.prompt_id` references `prompts.id`.
    SavedPrompts,
    Prompts,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::PromptUpvotes => "prompt_upvotes",
            Table::SavedPrompts => "saved_prompts",
            Table::Prompts => "prompts",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Storage port used by the reset, load and schema steps.
#[async_trait::async_trait]
pub trait PromptStore: Send + Sync {
    /// Remove every row of `table`; returns how many were deleted.
    async fn delete_all(&self, table: Table) -> Result<u64, StoreError>;

    async fn insert_prompt(&self, record: &DestinationRecord) -> Result<(), StoreError>;

    /// Run a schema-altering statement through the `exec` procedure.
    async fn execute_sql(&self, sql: &str) -> Result<(), StoreError>;

    fn name(&self) -> &'static str;
}
