use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::job::{Application, DeletionMode, Job};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Ok,
    OkWithErrors,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Running => "running",
            RunStatus::Ok => "ok",
            RunStatus::OkWithErrors => "ok_with_errors",
            RunStatus::Failed => "failed",
        }
    }
}

/// What a run deleted, or would have deleted under dry-run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DeletedItem {
    Movie {
        id: i64,
        title: Option<String>,
        year: Option<i32>,
        added: Option<String>,
        age_days: i64,
        path: Option<String>,
    },
    #[serde(rename = "episodefile")]
    EpisodeFile {
        id: i64,
        series_id: i64,
        series_title: Option<String>,
        #[serde(rename = "relativePath")]
        relative_path: String,
        #[serde(rename = "dateAdded")]
        date_added: String,
        age_days: i64,
    },
    Series {
        id: i64,
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        added: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        age_days: Option<i64>,
        path: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeletedEntry {
    #[serde(flatten)]
    pub item: DeletedItem,
    /// Set once the remote deletion succeeded. Always `None` under dry-run.
    pub deleted_at: Option<DateTime<Utc>>,
    pub dry_run: bool,
}

impl DeletedEntry {
    pub fn new(item: DeletedItem, dry_run: bool) -> Self {
        Self {
            item,
            deleted_at: None,
            dry_run,
        }
    }
}

/// Durable record of one job execution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunState {
    /// Nil for runs recorded before run ids existed.
    #[serde(default)]
    pub run_id: Uuid,
    pub job_id: String,
    pub job_name: String,
    pub app: Application,
    pub sonarr_delete_mode: Option<DeletionMode>,

    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub duration_seconds: Option<i64>,
    pub status: RunStatus,

    pub dry_run: bool,
    pub tag_label: String,
    pub days_old: u32,
    pub delete_files: bool,
    pub add_import_exclusion: bool,

    pub candidates_found: usize,
    pub deleted_count: usize,
    pub deleted: Vec<DeletedEntry>,
    pub errors: Vec<String>,
}

impl RunState {
    /// A fresh `running` record echoing the job's parameters.
    pub fn start(job: &Job, started_at: DateTime<Utc>) -> Self {
        Self {
            run_id: Uuid::now_v7(),
            job_id: job.id.clone(),
            job_name: job.name.clone(),
            app: job.application,
            sonarr_delete_mode: job.sonarr_mode(),
            started_at,
            finished_at: None,
            duration_seconds: None,
            status: RunStatus::Running,
            dry_run: job.dry_run,
            tag_label: job.tag_label.clone(),
            days_old: job.days_old,
            delete_files: job.delete_files,
            add_import_exclusion: job.add_import_exclusion,
            candidates_found: 0,
            deleted_count: 0,
            deleted: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Recount `deleted_count` from the entries themselves.
    ///
    /// Dry-run entries all count as "would delete"; real runs only count
    /// entries whose deletion completed.
    pub fn refresh_deleted_count(&mut self) {
        self.deleted_count = if self.dry_run {
            self.deleted.len()
        } else {
            self.deleted.iter().filter(|d| d.deleted_at.is_some()).count()
        };
    }

    /// Terminal status for a run that reached the end without a fatal error.
    pub fn completed_status(&self) -> RunStatus {
        if self.errors.is_empty() {
            RunStatus::Ok
        } else {
            RunStatus::OkWithErrors
        }
    }

    /// Stamp completion time and duration. Status is left as set by the caller.
    pub fn finish(&mut self, finished_at: DateTime<Utc>) {
        self.finished_at = Some(finished_at);
        self.duration_seconds = Some((finished_at - self.started_at).num_seconds());
        self.refresh_deleted_count();
    }

    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }
}
