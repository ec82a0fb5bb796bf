use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::coerce::{clamp_int, normalize_bool, value_string};

pub const DEFAULT_JOB_NAME: &str = "Job";
pub const DEFAULT_TAG_LABEL: &str = "autodelete30";
pub const DEFAULT_DAYS_OLD: u32 = 30;
pub const MIN_DAYS_OLD: u32 = 1;
pub const MAX_DAYS_OLD: u32 = 36_500;

/// The remote library manager a job targets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Application {
    /// Movie library.
    Radarr,
    /// Series library.
    Sonarr,
}

impl Application {
    pub fn as_str(&self) -> &'static str {
        match self {
            Application::Radarr => "radarr",
            Application::Sonarr => "sonarr",
        }
    }

    /// Human-facing product name, used in error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Application::Radarr => "Radarr",
            Application::Sonarr => "Sonarr",
        }
    }

    /// Parse an application key case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "radarr" => Some(Application::Radarr),
            "sonarr" => Some(Application::Sonarr),
            _ => None,
        }
    }
}

impl fmt::Display for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a Sonarr job removes content.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeletionMode {
    /// Delete old episode files, never the series.
    #[default]
    EpisodesOnly,
    /// Delete old episode files, then any tagged series left without files.
    EpisodesThenSeries,
    /// Delete whole series based on the series' own added date.
    Series,
}

impl DeletionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeletionMode::EpisodesOnly => "episodes_only",
            DeletionMode::EpisodesThenSeries => "episodes_then_series",
            DeletionMode::Series => "series",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "episodes_only" => Some(DeletionMode::EpisodesOnly),
            "episodes_then_series" => Some(DeletionMode::EpisodesThenSeries),
            "series" => Some(DeletionMode::Series),
            _ => None,
        }
    }
}

impl fmt::Display for DeletionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully normalized cleanup job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    pub id: String,
    pub name: String,
    pub enabled: bool,
    pub application: Application,
    pub tag_label: String,
    pub days_old: u32,
    pub dry_run: bool,
    pub delete_files: bool,
    pub add_import_exclusion: bool,
    /// Only meaningful for Sonarr jobs.
    pub deletion_mode: DeletionMode,
}

impl Job {
    /// The Sonarr deletion mode, or `None` for movie jobs.
    pub fn sonarr_mode(&self) -> Option<DeletionMode> {
        match self.application {
            Application::Sonarr => Some(self.deletion_mode),
            Application::Radarr => None,
        }
    }
}

/// A job as stored by the settings UI: loosely typed, keyed the way the UI
/// writes it. Scheduling keys (`SCHED_DAY`, `SCHED_HOUR`) are ignored here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawJob {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub enabled: Option<Value>,
    #[serde(rename = "APP", default)]
    pub app: Option<Value>,
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
    #[serde(rename = "SONARR_DELETE_MODE", default)]
    pub sonarr_delete_mode: Option<Value>,
}

impl RawJob {
    /// Normalize into a `Job`, applying defaults and clamping ranges.
    ///
    /// Returns `None` when the job has no usable id.
    pub fn normalize(&self) -> Option<Job> {
        let id = value_string(self.id.as_ref())?;

        let application = value_string(self.app.as_ref())
            .and_then(|s| Application::parse(&s))
            .unwrap_or(Application::Radarr);

        let deletion_mode = value_string(self.sonarr_delete_mode.as_ref())
            .and_then(|s| DeletionMode::parse(&s))
            .unwrap_or_default();

        let days_old = clamp_int(
            self.days_old.as_ref(),
            i64::from(MIN_DAYS_OLD),
            i64::from(MAX_DAYS_OLD),
            i64::from(DEFAULT_DAYS_OLD),
        ) as u32;

        Some(Job {
            id,
            name: value_string(self.name.as_ref()).unwrap_or_else(|| DEFAULT_JOB_NAME.to_string()),
            enabled: normalize_bool(self.enabled.as_ref(), true),
            application,
            tag_label: value_string(self.tag_label.as_ref())
                .unwrap_or_else(|| DEFAULT_TAG_LABEL.to_string()),
            days_old,
            dry_run: normalize_bool(self.dry_run.as_ref(), true),
            delete_files: normalize_bool(self.delete_files.as_ref(), true),
            add_import_exclusion: normalize_bool(self.add_import_exclusion.as_ref(), false),
            deletion_mode,
        })
    }
}
