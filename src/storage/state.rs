use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::errors::{ReaperError, ReaperResult};
use crate::models::RunHistory;
use crate::storage::StateStore;

pub const STATE_FILE: &str = "state.json";

/// `state.json` in the config directory.
pub struct JsonStateStore {
    file_path: PathBuf,
}

impl JsonStateStore {
    pub fn new(config_dir: &Path) -> Self {
        Self {
            file_path: config_dir.join(STATE_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

fn persistence(what: &str, path: &Path, err: impl std::fmt::Display) -> ReaperError {
    ReaperError::Persistence(format!("{} {}: {}", what, path.display(), err))
}

#[async_trait]
impl StateStore for JsonStateStore {
    /// Read the document.
    ///
    /// If `state.json` is corrupted, a backup is written to `state.json.bak`,
    /// a warning is logged and an empty history is returned.
    async fn load(&self) -> ReaperResult<RunHistory> {
        if !self.file_path.exists() {
            return Ok(RunHistory::default());
        }
        let content = tokio::fs::read_to_string(&self.file_path)
            .await
            .map_err(|e| persistence("Failed to read", &self.file_path, e))?;

        match serde_json::from_str::<RunHistory>(&content) {
            Ok(history) => Ok(history),
            Err(e) => {
                tracing::warn!(
                    "{} is corrupted ({}), creating backup and starting empty",
                    self.file_path.display(),
                    e
                );
                let backup_path = self.file_path.with_extension("json.bak");
                if let Err(backup_err) = tokio::fs::copy(&self.file_path, &backup_path).await {
                    tracing::error!("Failed to back up corrupted state file: {}", backup_err);
                }
                Ok(RunHistory::default())
            }
        }
    }

    /// Atomically replace the file: write a .tmp sibling, then rename.
    async fn save(&self, history: &RunHistory) -> ReaperResult<()> {
        if let Some(parent) = self.file_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| persistence("Failed to create", parent, e))?;
        }

        let tmp_path = self.file_path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(history)?;

        tokio::fs::write(&tmp_path, json.as_bytes())
            .await
            .map_err(|e| persistence("Failed to write", &tmp_path, e))?;
        tokio::fs::rename(&tmp_path, &self.file_path)
            .await
            .map_err(|e| persistence("Failed to rename", &tmp_path, e))?;

        Ok(())
    }
}

/// In-memory store for tests; can be told to fail writes.
#[derive(Default)]
pub struct MemoryStateStore {
    saved: Mutex<Option<RunHistory>>,
    saves: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `save` fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// The last successfully saved document.
    pub fn snapshot(&self) -> Option<RunHistory> {
        self.saved
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self) -> ReaperResult<RunHistory> {
        Ok(self.snapshot().unwrap_or_default())
    }

    async fn save(&self, history: &RunHistory) -> ReaperResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ReaperError::Persistence("disk full".to_string()));
        }
        *self
            .saved
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(history.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Application, DeletionMode, Job, RunState};
    use chrono::Utc;
    use tempfile::TempDir;

    fn make_run(job_id: &str) -> RunState {
        let job = Job {
            id: job_id.to_string(),
            name: "Job".to_string(),
            enabled: true,
            application: Application::Radarr,
            tag_label: "keep-clean".to_string(),
            days_old: 30,
            dry_run: false,
            delete_files: true,
            add_import_exclusion: false,
            deletion_mode: DeletionMode::EpisodesOnly,
        };
        RunState::start(&job, Utc::now())
    }

    #[tokio::test]
    async fn test_load_missing_is_empty() {
        let tmp = TempDir::new().expect("create temp dir");
        let store = JsonStateStore::new(tmp.path());
        let history = store.load().await.expect("load");
        assert_eq!(history, RunHistory::default());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let tmp = TempDir::new().expect("create temp dir");
        let store = JsonStateStore::new(tmp.path());
        let mut history = RunHistory::default();
        history.record(&make_run("a"), 20);
        store.save(&history).await.expect("save");

        let reopened = JsonStateStore::new(tmp.path());
        let loaded = reopened.load().await.expect("load");
        assert_eq!(loaded, history);
    }

    #[tokio::test]
    async fn test_save_writes_dashboard_keys() {
        let tmp = TempDir::new().expect("create temp dir");
        let store = JsonStateStore::new(tmp.path());
        let mut history = RunHistory::default();
        history.record(&make_run("a"), 20);
        store.save(&history).await.expect("save");

        let content = std::fs::read_to_string(tmp.path().join(STATE_FILE)).expect("read");
        let value: serde_json::Value = serde_json::from_str(&content).expect("parse");
        assert_eq!(value["last_run"]["job_id"], "a");
        assert_eq!(value["last_run"]["status"], "running");
        assert!(value["last_runs"]["a"].is_object());
        assert_eq!(value["run_history"].as_array().map(Vec::len), Some(1));
        assert_eq!(value["run_history_by_job"]["a"].as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn test_no_tmp_file_left_after_write() {
        let tmp = TempDir::new().expect("create temp dir");
        let store = JsonStateStore::new(tmp.path());
        store.save(&RunHistory::default()).await.expect("save");
        assert!(!tmp.path().join("state.json.tmp").exists());
        assert!(tmp.path().join(STATE_FILE).exists());
    }

    #[tokio::test]
    async fn test_save_creates_missing_directory() {
        let tmp = TempDir::new().expect("create temp dir");
        let nested = tmp.path().join("nested").join("config");
        let store = JsonStateStore::new(&nested);
        store.save(&RunHistory::default()).await.expect("save");
        assert!(nested.join(STATE_FILE).exists());
    }

    #[tokio::test]
    async fn test_corrupted_state_recovers_with_backup() {
        let tmp = TempDir::new().expect("create temp dir");
        let corrupted = b"{\"last_run\": [oops";
        std::fs::write(tmp.path().join(STATE_FILE), corrupted).expect("write");

        let store = JsonStateStore::new(tmp.path());
        let history = store.load().await.expect("load");
        assert_eq!(history, RunHistory::default());

        let backup = std::fs::read(tmp.path().join("state.json.bak")).expect("backup exists");
        assert_eq!(backup, corrupted);
    }

    #[tokio::test]
    async fn test_loads_history_without_run_ids() {
        let tmp = TempDir::new().expect("create temp dir");
        let run = serde_json::json!({
            "job_id": "movies",
            "job_name": "Old movies",
            "app": "radarr",
            "sonarr_delete_mode": null,
            "started_at": "2024-05-01T03:00:00.123456+00:00",
            "finished_at": "2024-05-01T03:00:04.654321+00:00",
            "duration_seconds": 4,
            "status": "ok",
            "dry_run": false,
            "tag_label": "keep-clean",
            "days_old": 30,
            "delete_files": true,
            "add_import_exclusion": false,
            "candidates_found": 1,
            "deleted_count": 1,
            "deleted": [{
                "kind": "movie",
                "id": 10,
                "title": "Old",
                "year": null,
                "added": "2024-01-01T00:00:00Z",
                "age_days": 121,
                "path": "/movies/old",
                "deleted_at": "2024-05-01T03:00:03.000001+00:00",
                "dry_run": false
            }],
            "errors": []
        });
        let document = serde_json::json!({
            "last_run": run,
            "last_runs": {"movies": run},
            "run_history": [run, run],
            "run_history_by_job": {"movies": [run, run]}
        });
        std::fs::write(
            tmp.path().join(STATE_FILE),
            serde_json::to_string_pretty(&document).expect("serialize"),
        )
        .expect("write");

        let store = JsonStateStore::new(tmp.path());
        let mut history = store.load().await.expect("load");
        assert!(!tmp.path().join("state.json.bak").exists());
        assert_eq!(history.run_history.len(), 2);
        let last = history.last_run_for("movies").expect("last run");
        assert!(last.run_id.is_nil());
        assert_eq!(last.deleted[0].deleted_at.map(|d| d.timestamp()), Some(1714532403));

        history.record(&make_run("movies"), 20);
        assert_eq!(history.run_history.len(), 3);
        assert_eq!(history.history_for("movies").len(), 3);
    }

    #[tokio::test]
    async fn test_memory_store_failure_toggle() {
        let store = MemoryStateStore::new();
        store.save(&RunHistory::default()).await.expect("save");
        store.fail_writes(true);
        assert!(matches!(
            store.save(&RunHistory::default()).await,
            Err(ReaperError::Persistence(_))
        ));
        assert_eq!(store.save_count(), 1);
    }
}
