// src/transform/mod.rs
//! Mapping from catalogue rows to `prompts` rows. Pure; no I/O.

pub mod dates;
pub mod tags;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TransformError;
use crate::extract::SourceRecord;

pub use dates::{normalize, normalize_with};
pub use tags::{parse_tags, FALLBACK_TAG};

pub const DEFAULT_URL_TEMPLATE: &str = "https://chatgpt.com/g/{id}";
/// Attribution token shared by every row this tool inserts.
pub const DEFAULT_MIGRATION_TOKEN: Uuid = Uuid::from_u128(0xa1b2c3d4_e5f6_4a7b_8c9d_0e1f2a3b4c5d);

/// Row shape of the `prompts` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationRecord {
    pub url: String,
    /// Mirrors `description`; the catalogue carries no prompt text.
    pub prompt_text: String,
    pub generated_name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub user_token: Uuid,
    pub upvotes: i64,
    pub uses: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformer {
    url_template: String,
    user_token: Uuid,
}

impl Default for Transformer {
    fn default() -> Self {
        Self::new(DEFAULT_URL_TEMPLATE, DEFAULT_MIGRATION_TOKEN)
    }
}

impl Transformer {
    /// `url_template` must contain `{id}`.
    pub fn new(url_template: impl Into<String>, user_token: Uuid) -> Self {
        Self {
            url_template: url_template.into(),
            user_token,
        }
    }

    pub fn user_token(&self) -> Uuid {
        self.user_token
    }

    pub fn url_for(&self, gpt_id: &str) -> String {
        self.url_template.replace("{id}", gpt_id)
    }

    pub fn transform(&self, record: &SourceRecord) -> Result<DestinationRecord, TransformError> {
        self.transform_at(record, dates::normalize)
    }

    /// Like [`Transformer::transform`] with a fixed clock for the "now" fallback.
    pub fn transform_with_clock(
        &self,
        record: &SourceRecord,
        now: NaiveDateTime,
    ) -> Result<DestinationRecord, TransformError> {
        self.transform_at(record, |v| dates::normalize_with(v, || now))
    }

    fn transform_at(
        &self,
        record: &SourceRecord,
        created_at: impl FnOnce(Option<&crate::extract::CellValue>) -> String,
    ) -> Result<DestinationRecord, TransformError> {
        let gpt_id = record.gpt_id.trim();
        if gpt_id.is_empty() {
            return Err(TransformError::MissingIdentifier);
        }

        Ok(DestinationRecord {
            url: self.url_for(gpt_id),
            prompt_text: record.description.clone(),
            generated_name: record.name.clone(),
            description: record.description.clone(),
            tags: parse_tags(record.tags.as_deref()),
            user_token: self.user_token,
            upvotes: record.unique_users,
            uses: record.total_messages,
            created_at: created_at(record.first_active.as_ref()),
        })
    }
}
