// src/store/memory.rs
//! In-memory store with the same foreign-key rules as the hosted schema.
//! Used by tests and dry runs; failures can be injected per table or record.

use std::collections::HashSet;
use std::sync::Mutex;

use uuid::Uuid;

use super::{PromptStore, Table};
use crate::error::StoreError;
use crate::transform::DestinationRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPrompt {
    pub id: Uuid,
    pub record: DestinationRecord,
}

#[derive(Debug, Default)]
struct State {
    prompts: Vec<StoredPrompt>,
    /// (row id, prompt id)
    upvotes: Vec<(Uuid, Uuid)>,
    saved: Vec<(Uuid, Uuid)>,
    failing_names: HashSet<String>,
    failing_table: Option<Table>,
    sql_rejection: Option<String>,
    executed_sql: Vec<String>,
    deletes: Vec<Table>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // A panicking test thread must not hide the data from the others.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn seed_prompt(&self, record: DestinationRecord) -> Uuid {
        let id = Uuid::new_v4();
        self.lock().prompts.push(StoredPrompt { id, record });
        id
    }

    /// Adds a `prompt_upvotes` row; the prompt must exist.
    pub fn seed_upvote(&self, prompt_id: Uuid) -> Result<Uuid, StoreError> {
        let mut st = self.lock();
        check_parent(&st, prompt_id)?;
        let id = Uuid::new_v4();
        st.upvotes.push((id, prompt_id));
        Ok(id)
    }

    /// Adds a `saved_prompts` row; the prompt must exist.
    pub fn seed_saved(&self, prompt_id: Uuid) -> Result<Uuid, StoreError> {
        let mut st = self.lock();
        check_parent(&st, prompt_id)?;
        let id = Uuid::new_v4();
        st.saved.push((id, prompt_id));
        Ok(id)
    }

    /// Inserts of records with this `generated_name` will fail.
    pub fn fail_inserts_named(&self, name: impl Into<String>) {
        self.lock().failing_names.insert(name.into());
    }

    /// Deletes on `table` will fail.
    pub fn fail_deletes_on(&self, table: Table) {
        self.lock().failing_table = Some(table);
    }

    /// `execute_sql` will be refused with this message.
    pub fn reject_sql(&self, message: impl Into<String>) {
        self.lock().sql_rejection = Some(message.into());
    }

    pub fn prompts(&self) -> Vec<StoredPrompt> {
        self.lock().prompts.clone()
    }

    pub fn row_count(&self, table: Table) -> usize {
        let st = self.lock();
        match table {
            Table::PromptUpvotes => st.upvotes.len(),
            Table::SavedPrompts => st.saved.len(),
            Table::Prompts => st.prompts.len(),
        }
    }

    pub fn executed_sql(&self) -> Vec<String> {
        self.lock().executed_sql.clone()
    }

    /// Tables in the order `delete_all` was called on them.
    pub fn delete_log(&self) -> Vec<Table> {
        self.lock().deletes.clone()
    }
}

fn check_parent(st: &State, prompt_id: Uuid) -> Result<(), StoreError> {
    if st.prompts.iter().any(|p| p.id == prompt_id) {
        Ok(())
    } else {
        Err(StoreError::Constraint(format!("prompt {prompt_id} does not exist")))
    }
}

#[async_trait::async_trait]
impl PromptStore for MemoryStore {
    async fn delete_all(&self, table: Table) -> Result<u64, StoreError> {
        let mut st = self.lock();
        st.deletes.push(table);
        if st.failing_table == Some(table) {
            return Err(StoreError::Rejected(format!("delete on {table} refused")));
        }
        let deleted = match table {
            Table::PromptUpvotes => std::mem::take(&mut st.upvotes).len(),
            Table::SavedPrompts => std::mem::take(&mut st.saved).len(),
            Table::Prompts => {
                let referenced = st.upvotes.len() + st.saved.len();
                if referenced > 0 {
                    return Err(StoreError::Constraint(format!(
                        "{referenced} child rows still reference prompts"
                    )));
                }
                std::mem::take(&mut st.prompts).len()
            }
        };
        Ok(deleted as u64)
    }

    async fn insert_prompt(&self, record: &DestinationRecord) -> Result<(), StoreError> {
        let mut st = self.lock();
        if st.failing_names.contains(&record.generated_name) {
            return Err(StoreError::Rejected(format!(
                "insert of {:?} refused",
                record.generated_name
            )));
        }
        st.prompts.push(StoredPrompt {
            id: Uuid::new_v4(),
            record: record.clone(),
        });
        Ok(())
    }

    async fn execute_sql(&self, sql: &str) -> Result<(), StoreError> {
        let mut st = self.lock();
        if let Some(msg) = &st.sql_rejection {
            return Err(StoreError::Rejected(msg.clone()));
        }
        st.executed_sql.push(sql.to_string());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
