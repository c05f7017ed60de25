// src/config/mod.rs
//! Run configuration: store credentials from the environment, everything else
//! from an optional TOML file with built-in defaults.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use uuid::Uuid;

use crate::error::ConfigError;
use crate::extract::{ColumnMap, StopPolicy, WorkbookFile, DEFAULT_SHEET};
use crate::transform::{Transformer, DEFAULT_MIGRATION_TOKEN, DEFAULT_URL_TEMPLATE};

pub const ENV_CONFIG_PATH: &str = "MIGRATION_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/migration.toml";
pub const ENV_WORKBOOK_PATH: &str = "GPT_WORKBOOK_PATH";

const URL_VARS: [&str; 2] = ["VITE_SUPABASE_URL", "SUPABASE_URL"];
const KEY_VARS: [&str; 2] = ["VITE_SUPABASE_ANON_KEY", "SUPABASE_ANON_KEY"];

/// Endpoint and key of the hosted store.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub url: String,
    pub api_key: String,
}

impl fmt::Debug for StoreConfig {
    // Never print the key itself.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("url", &self.url)
            .field("key_len", &self.api_key.len())
            .finish()
    }
}

impl StoreConfig {
    /// Reads `VITE_SUPABASE_URL` / `VITE_SUPABASE_ANON_KEY` (or the unprefixed
    /// `SUPABASE_*` names). Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: first_env(&URL_VARS).ok_or(ConfigError::MissingSetting(URL_VARS[0]))?,
            api_key: first_env(&KEY_VARS).ok_or(ConfigError::MissingSetting(KEY_VARS[0]))?,
        })
    }

    /// Dashboard SQL editor for `https://<ref>.supabase.co` projects.
    pub fn sql_editor_url(&self) -> Option<String> {
        let host = self
            .url
            .trim()
            .strip_prefix("https://")
            .or_else(|| self.url.trim().strip_prefix("http://"))?;
        let host = host.split('/').next()?;
        let project_ref = host.strip_suffix(".supabase.co")?;
        if project_ref.is_empty() || project_ref.contains('.') {
            return None;
        }
        Some(format!(
            "https://supabase.com/dashboard/project/{project_ref}/sql/new"
        ))
    }
}

fn first_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|n| std::env::var(n).ok())
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

fn default_workbook_path() -> PathBuf {
    PathBuf::from("data/gpt-database.xlsx")
}
fn default_sheet() -> String {
    DEFAULT_SHEET.to_string()
}
fn default_limit() -> usize {
    50
}
fn default_user_token() -> Uuid {
    DEFAULT_MIGRATION_TOKEN
}
fn default_url_template() -> String {
    DEFAULT_URL_TEMPLATE.to_string()
}

/// Everything about a run except credentials.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MigrationSettings {
    #[serde(default = "default_workbook_path")]
    pub workbook_path: PathBuf,
    #[serde(default = "default_sheet")]
    pub sheet: String,
    /// How many top-ranked records to migrate.
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default = "default_user_token")]
    pub user_token: Uuid,
    #[serde(default = "default_url_template")]
    pub url_template: String,
    #[serde(default)]
    pub stop_policy: StopPolicy,
    #[serde(default)]
    pub columns: ColumnMap,
}

impl Default for MigrationSettings {
    fn default() -> Self {
        Self {
            workbook_path: default_workbook_path(),
            sheet: default_sheet(),
            limit: default_limit(),
            user_token: default_user_token(),
            url_template: default_url_template(),
            stop_policy: StopPolicy::default(),
            columns: ColumnMap::default(),
        }
    }
}

impl MigrationSettings {
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Resolution order:
    /// 1) $MIGRATION_CONFIG_PATH (must exist)
    /// 2) config/migration.toml
    /// 3) built-in defaults
    ///
    /// `$GPT_WORKBOOK_PATH` then overrides `workbook_path`.
    pub fn load_default() -> Result<Self, ConfigError> {
        let mut settings = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(ConfigError::MissingFile {
                    var: ENV_CONFIG_PATH,
                    path: pb,
                });
            }
            Self::load_from(&pb)?
        } else {
            let fallback = PathBuf::from(DEFAULT_CONFIG_PATH);
            if fallback.exists() {
                Self::load_from(&fallback)?
            } else {
                Self::default()
            }
        };

        if let Some(p) = first_env(&[ENV_WORKBOOK_PATH]) {
            settings.workbook_path = PathBuf::from(p);
        }
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.url_template.contains("{id}") {
            return Err(ConfigError::InvalidUrlTemplate(self.url_template.clone()));
        }
        Ok(())
    }

    pub fn transformer(&self) -> Transformer {
        Transformer::new(self.url_template.clone(), self.user_token)
    }

    pub fn workbook(&self) -> WorkbookFile {
        WorkbookFile::new(self.workbook_path.clone(), self.sheet.clone())
    }
}
