use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{ReaperError, ReaperResult};
use crate::models::coerce::{clamp_int, normalize_bool, value_string};
use crate::models::job::{Application, Job, RawJob, DEFAULT_TAG_LABEL};

pub const DEFAULT_CONFIG_DIR: &str = "/config";
pub const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const MIN_HTTP_TIMEOUT_SECS: u64 = 5;
pub const MAX_HTTP_TIMEOUT_SECS: u64 = 300;

pub const DEFAULT_HISTORY_LIMIT: usize = 20;
const MAX_HISTORY_LIMIT: usize = 1000;

/// Environment variables consulted when a key is absent from `config.json`.
const ENV_KEYS: &[&str] = &[
    "RADARR_URL",
    "RADARR_API_KEY",
    "SONARR_URL",
    "SONARR_API_KEY",
    "HTTP_TIMEOUT_SECONDS",
    "STATE_HISTORY_LIMIT",
    "TAG_LABEL",
    "DAYS_OLD",
    "DRY_RUN",
    "DELETE_FILES",
    "ADD_IMPORT_EXCLUSION",
];

/// Base URL and API key for one remote application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub url: String,
    pub api_key: String,
}

/// Contents of `config.json` as written by the settings UI.
///
/// Every scalar falls back to the environment variable of the same name and
/// then to a default, so a missing config file is not an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(rename = "RADARR_URL", default)]
    pub radarr_url: Option<Value>,
    #[serde(rename = "RADARR_API_KEY", default)]
    pub radarr_api_key: Option<Value>,
    #[serde(rename = "SONARR_URL", default)]
    pub sonarr_url: Option<Value>,
    #[serde(rename = "SONARR_API_KEY", default)]
    pub sonarr_api_key: Option<Value>,
    #[serde(rename = "HTTP_TIMEOUT_SECONDS", default)]
    pub http_timeout_seconds: Option<Value>,
    #[serde(rename = "STATE_HISTORY_LIMIT", default)]
    pub state_history_limit: Option<Value>,
    #[serde(rename = "JOBS", default)]
    pub jobs: Option<Value>,

    // Single-job layout from before multi-job support.
    #[serde(rename = "TAG_LABEL", default)]
    pub tag_label: Option<Value>,
    #[serde(rename = "DAYS_OLD", default)]
    pub days_old: Option<Value>,
    #[serde(rename = "DRY_RUN", default)]
    pub dry_run: Option<Value>,
    #[serde(rename = "DELETE_FILES", default)]
    pub delete_files: Option<Value>,
    #[serde(rename = "ADD_IMPORT_EXCLUSION", default)]
    pub add_import_exclusion: Option<Value>,

    #[serde(skip)]
    env: HashMap<String, String>,
}

impl AppConfig {
    /// Load `config.json` from `config_dir`, layering the process environment
    /// underneath it.
    ///
    /// A missing file yields defaults. A malformed file is logged and also
    /// yields defaults, so a broken UI save never stops scheduled cleanups
    /// from reporting a configuration error per job.
    pub fn load(config_dir: &Path) -> Self {
        let path = config_dir.join(CONFIG_FILE);
        let config = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
                Ok(parsed) => {
                    tracing::info!("Loaded config from: {}", path.display());
                    parsed
                }
                Err(e) => {
                    tracing::warn!(
                        "{} is not valid config JSON ({}), using defaults",
                        path.display(),
                        e
                    );
                    AppConfig::default()
                }
            },
            Err(_) => {
                tracing::info!("No config file at {}, using defaults", path.display());
                AppConfig::default()
            }
        };

        let env = ENV_KEYS
            .iter()
            .filter_map(|key| std::env::var(key).ok().map(|v| (key.to_string(), v)))
            .collect();
        config.with_env(env)
    }

    /// Replace the environment snapshot used for fallbacks.
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// Config value for `key`, or the environment fallback.
    fn setting(&self, key: &str, file_value: &Option<Value>) -> Option<Value> {
        match file_value {
            Some(v) if !v.is_null() => Some(v.clone()),
            _ => self.env.get(key).map(|v| Value::String(v.clone())),
        }
    }

    pub fn http_timeout_secs(&self) -> u64 {
        clamp_int(
            self.setting("HTTP_TIMEOUT_SECONDS", &self.http_timeout_seconds)
                .as_ref(),
            MIN_HTTP_TIMEOUT_SECS as i64,
            MAX_HTTP_TIMEOUT_SECS as i64,
            DEFAULT_HTTP_TIMEOUT_SECS as i64,
        ) as u64
    }

    pub fn history_limit(&self) -> usize {
        clamp_int(
            self.setting("STATE_HISTORY_LIMIT", &self.state_history_limit)
                .as_ref(),
            1,
            MAX_HISTORY_LIMIT as i64,
            DEFAULT_HISTORY_LIMIT as i64,
        ) as usize
    }

    /// Resolve URL and API key for `app`.
    ///
    /// Missing values are a configuration error for the job that needs them.
    pub fn endpoint(&self, app: Application) -> ReaperResult<Endpoint> {
        let (url_key, key_key, url_value, key_value, example) = match app {
            Application::Radarr => (
                "RADARR_URL",
                "RADARR_API_KEY",
                &self.radarr_url,
                &self.radarr_api_key,
                "http://radarr:7878",
            ),
            Application::Sonarr => (
                "SONARR_URL",
                "SONARR_API_KEY",
                &self.sonarr_url,
                &self.sonarr_api_key,
                "http://sonarr:8989",
            ),
        };

        let url = value_string(self.setting(url_key, url_value).as_ref())
            .map(|u| u.trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                ReaperError::Configuration(format!("{} is required, e.g. {}", url_key, example))
            })?;
        let api_key = value_string(self.setting(key_key, key_value).as_ref())
            .ok_or_else(|| ReaperError::Configuration(format!("{} is required", key_key)))?;

        Ok(Endpoint { url, api_key })
    }

    /// All configured jobs, normalized.
    ///
    /// Entries that are not objects or lack an id are dropped. When no job
    /// list exists, a single Radarr job with id `legacy` is synthesized from
    /// the top-level keys.
    pub fn jobs(&self) -> Vec<Job> {
        if let Some(Value::Array(entries)) = &self.jobs {
            if !entries.is_empty() {
                return entries
                    .iter()
                    .filter_map(|entry| match serde_json::from_value::<RawJob>(entry.clone()) {
                        Ok(raw) => raw.normalize(),
                        Err(e) => {
                            tracing::warn!("Skipping malformed job entry: {}", e);
                            None
                        }
                    })
                    .collect();
            }
        }

        let legacy = RawJob {
            id: Some(Value::String("legacy".to_string())),
            name: Some(Value::String("Legacy Job".to_string())),
            enabled: Some(Value::Bool(true)),
            app: Some(Value::String(Application::Radarr.as_str().to_string())),
            tag_label: Some(
                self.setting("TAG_LABEL", &self.tag_label)
                    .unwrap_or_else(|| Value::String(DEFAULT_TAG_LABEL.to_string())),
            ),
            days_old: self.setting("DAYS_OLD", &self.days_old),
            dry_run: Some(Value::Bool(normalize_bool(
                self.setting("DRY_RUN", &self.dry_run).as_ref(),
                true,
            ))),
            delete_files: self.setting("DELETE_FILES", &self.delete_files),
            add_import_exclusion: self.setting("ADD_IMPORT_EXCLUSION", &self.add_import_exclusion),
            sonarr_delete_mode: None,
        };
        legacy.normalize().into_iter().collect()
    }
}

/// Resolve the config directory: explicit override, then `CONFIG_DIR`, then
/// `/config`.
pub fn resolve_config_dir(override_dir: Option<&Path>) -> PathBuf {
    if let Some(dir) = override_dir {
        return dir.to_path_buf();
    }
    if let Ok(dir) = std::env::var("CONFIG_DIR") {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }
    PathBuf::from(DEFAULT_CONFIG_DIR)
}
