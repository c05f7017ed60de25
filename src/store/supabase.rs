// src/store/supabase.rs
//! PostgREST client for a Supabase project.

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::json;
use tracing::debug;

use super::{PromptStore, Table};
use crate::config::StoreConfig;
use crate::error::{ConfigError, StoreError};
use crate::transform::DestinationRecord;

/// PostgREST refuses a DELETE without a filter, so "delete all" is expressed
/// as `id != <nil uuid>`, which no real row matches.
const NO_ROW_ID: &str = "00000000-0000-0000-0000-000000000000";

pub struct SupabaseStore {
    base_url: String,
    api_key: String,
    http: Client,
}

impl SupabaseStore {
    pub fn new(cfg: &StoreConfig) -> Result<Self, ConfigError> {
        let http = Client::builder()
            .user_agent(concat!("gpt-catalog-migrate/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(ConfigError::Client)?;
        Ok(Self {
            base_url: cfg.url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
            http,
        })
    }

    fn rest(&self, path: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, path)
    }

    fn authed(&self, rb: RequestBuilder) -> RequestBuilder {
        rb.header("apikey", &self.api_key).bearer_auth(&self.api_key)
    }

    async fn send(&self, rb: RequestBuilder) -> Result<Response, StoreError> {
        let resp = self.authed(rb).send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(StoreError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

/// Total from a `Content-Range` header such as `0-2/3` or `*/0`.
fn affected_rows(headers: &HeaderMap) -> u64 {
    headers
        .get(reqwest::header::CONTENT_RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.rsplit('/').next())
        .and_then(|total| total.trim().parse().ok())
        .unwrap_or(0)
}

#[async_trait::async_trait]
impl PromptStore for SupabaseStore {
    async fn delete_all(&self, table: Table) -> Result<u64, StoreError> {
        let rb = self
            .http
            .delete(self.rest(table.name()))
            .query(&[("id", format!("neq.{NO_ROW_ID}"))])
            .header("Prefer", "count=exact");
        let resp = self.send(rb).await?;
        let deleted = affected_rows(resp.headers());
        debug!(target: "store", %table, deleted, "delete_all");
        Ok(deleted)
    }

    async fn insert_prompt(&self, record: &DestinationRecord) -> Result<(), StoreError> {
        let rb = self
            .http
            .post(self.rest(Table::Prompts.name()))
            .header("Prefer", "return=minimal")
            .json(record);
        self.send(rb).await?;
        Ok(())
    }

    async fn execute_sql(&self, sql: &str) -> Result<(), StoreError> {
        let rb = self
            .http
            .post(self.rest("rpc/exec"))
            .json(&json!({ "query": sql }));
        self.send(rb).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "supabase"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderValue, CONTENT_RANGE};

    fn with_range(v: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(CONTENT_RANGE, HeaderValue::from_str(v).unwrap());
        h
    }

    #[test]
    fn content_range_totals() {
        assert_eq!(affected_rows(&with_range("0-2/3")), 3);
        assert_eq!(affected_rows(&with_range("*/0")), 0);
        assert_eq!(affected_rows(&with_range("*/*")), 0);
        assert_eq!(affected_rows(&HeaderMap::new()), 0);
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let store = SupabaseStore::new(&StoreConfig {
            url: "https://abc.supabase.co/".into(),
            api_key: "k".into(),
        })
        .unwrap();
        assert_eq!(store.rest("prompts"), "https://abc.supabase.co/rest/v1/prompts");
    }
}
