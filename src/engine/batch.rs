use thiserror::Error;

use crate::engine::runner::JobRunner;
use crate::models::{Job, RunState};
use crate::storage::TriggerFlags;

/// Which configured jobs a batch should run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobSelection {
    /// Exactly this job. It must exist and be enabled.
    One(String),
    /// Every enabled job.
    Enabled,
    /// Enabled jobs that have a run-now flag.
    RunNowOnly,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Job id '{0}' not found in config.json")]
    UnknownJob(String),

    #[error("Job id '{0}' is disabled")]
    DisabledJob(String),
}

impl SelectionError {
    pub fn exit_code(&self) -> i32 {
        match self {
            SelectionError::UnknownJob(_) => 2,
            SelectionError::DisabledJob(_) => 3,
        }
    }
}

/// Resolve `selection` against the configured jobs, keeping config order.
pub async fn select_jobs(
    jobs: &[Job],
    selection: &JobSelection,
    flags: &TriggerFlags,
) -> Result<Vec<Job>, SelectionError> {
    match selection {
        JobSelection::One(id) => {
            let job = jobs
                .iter()
                .find(|j| &j.id == id)
                .ok_or_else(|| SelectionError::UnknownJob(id.clone()))?;
            if !job.enabled {
                return Err(SelectionError::DisabledJob(id.clone()));
            }
            Ok(vec![job.clone()])
        }
        JobSelection::Enabled => Ok(jobs.iter().filter(|j| j.enabled).cloned().collect()),
        JobSelection::RunNowOnly => {
            let mut selected = Vec::new();
            for job in jobs.iter().filter(|j| j.enabled) {
                if flags.is_set(&job.id).await {
                    selected.push(job.clone());
                }
            }
            Ok(selected)
        }
    }
}

/// Outcome of one job within a batch.
#[derive(Debug)]
pub struct JobOutcome {
    pub job_id: String,
    /// The finished run, or the job-fatal error message.
    pub result: Result<RunState, String>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<JobOutcome>,
}

impl BatchReport {
    pub fn any_failed(&self) -> bool {
        self.outcomes.iter().any(|o| o.result.is_err())
    }

    pub fn exit_code(&self) -> i32 {
        if self.any_failed() {
            1
        } else {
            0
        }
    }
}

/// Run `jobs` one after another. A failing job never prevents later ones, and
/// each job's run-now flag is cleared once it has been attempted.
pub async fn run_batch(runner: &mut JobRunner, jobs: &[Job], flags: &TriggerFlags) -> BatchReport {
    let mut report = BatchReport::default();
    for job in jobs {
        // run_job has already logged a fatal error
        let result = runner.run_job(job).await.map_err(|e| e.to_string());
        flags.clear(&job.id).await;
        report.outcomes.push(JobOutcome {
            job_id: job.id.clone(),
            result,
        });
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{FakeRadarr, Movie};
    use crate::engine::recorder::Recorder;
    use crate::engine::strategy::StaticStrategies;
    use crate::models::{Application, DeletionMode, RunHistory, RunStatus};
    use crate::storage::MemoryStateStore;
    use chrono::{Duration, Utc};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn job(id: &str, enabled: bool, tag: &str) -> Job {
        Job {
            id: id.to_string(),
            name: id.to_string(),
            enabled,
            application: Application::Radarr,
            tag_label: tag.to_string(),
            days_old: 30,
            dry_run: false,
            delete_files: true,
            add_import_exclusion: false,
            deletion_mode: DeletionMode::EpisodesOnly,
        }
    }

    fn jobs() -> Vec<Job> {
        vec![
            job("a", true, "keep-clean"),
            job("b", false, "keep-clean"),
            job("c", true, "keep-clean"),
        ]
    }

    fn ids(jobs: &[Job]) -> Vec<&str> {
        jobs.iter().map(|j| j.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_select_enabled() {
        let tmp = TempDir::new().expect("create temp dir");
        let flags = TriggerFlags::new(tmp.path());
        let selected = select_jobs(&jobs(), &JobSelection::Enabled, &flags)
            .await
            .expect("select");
        assert_eq!(ids(&selected), vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_select_run_now_only() {
        let tmp = TempDir::new().expect("create temp dir");
        let flags = TriggerFlags::new(tmp.path());
        flags.set("b").await.expect("flag b");
        flags.set("c").await.expect("flag c");

        let selected = select_jobs(&jobs(), &JobSelection::RunNowOnly, &flags)
            .await
            .expect("select");
        assert_eq!(ids(&selected), vec!["c"]);
    }

    #[tokio::test]
    async fn test_select_one_unknown_and_disabled() {
        let tmp = TempDir::new().expect("create temp dir");
        let flags = TriggerFlags::new(tmp.path());

        let err = select_jobs(&jobs(), &JobSelection::One("zzz".to_string()), &flags)
            .await
            .unwrap_err();
        assert_eq!(err, SelectionError::UnknownJob("zzz".to_string()));
        assert_eq!(err.exit_code(), 2);

        let err = select_jobs(&jobs(), &JobSelection::One("b".to_string()), &flags)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Job id 'b' is disabled");
        assert_eq!(err.exit_code(), 3);

        let selected = select_jobs(&jobs(), &JobSelection::One("a".to_string()), &flags)
            .await
            .expect("select");
        assert_eq!(ids(&selected), vec!["a"]);
    }

    #[tokio::test]
    async fn test_failing_job_does_not_block_later_jobs() {
        let tmp = TempDir::new().expect("create temp dir");
        let flags = TriggerFlags::new(tmp.path());
        flags.set("broken").await.expect("flag");
        flags.set("fine").await.expect("flag");

        let radarr = Arc::new(
            FakeRadarr::new().with_tag(1, "keep-clean").with_movie(Movie {
                id: 7,
                added: Some((Utc::now() - Duration::days(45)).to_rfc3339()),
                tags: vec![1],
                ..Default::default()
            }),
        );
        let recorder = Recorder::new(
            RunHistory::default(),
            Arc::new(MemoryStateStore::new()),
            20,
        );
        let mut runner = JobRunner::new(
            Arc::new(StaticStrategies::new().with_radarr(radarr.clone())),
            recorder,
        );

        let selected = vec![job("broken", true, "no-such-tag"), job("fine", true, "keep-clean")];
        let report = run_batch(&mut runner, &selected, &flags).await;

        assert!(report.any_failed());
        assert_eq!(report.exit_code(), 1);
        assert!(report.outcomes[0].result.is_err());
        let fine = report.outcomes[1].result.as_ref().expect("fine ran");
        assert_eq!(fine.status, RunStatus::Ok);
        assert_eq!(radarr.movie_ids(), Vec::<i64>::new());

        assert!(!flags.is_set("broken").await);
        assert!(!flags.is_set("fine").await);
        assert_eq!(runner.history().run_history.len(), 2);
    }

    #[derive(Clone, Default)]
    struct CaptureWriter(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CaptureWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().expect("capture lock").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_failed_job_is_logged_once() {
        let capture = CaptureWriter::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let tmp = TempDir::new().expect("create temp dir");
        let flags = TriggerFlags::new(tmp.path());
        let radarr = Arc::new(FakeRadarr::new().with_tag(1, "keep-clean"));
        let recorder = Recorder::new(
            RunHistory::default(),
            Arc::new(MemoryStateStore::new()),
            20,
        );
        let mut runner = JobRunner::new(
            Arc::new(StaticStrategies::new().with_radarr(radarr)),
            recorder,
        );

        let report = run_batch(&mut runner, &[job("broken", true, "no-such-tag")], &flags).await;
        assert!(report.any_failed());

        let output = String::from_utf8(capture.0.lock().expect("capture lock").clone())
            .expect("utf8 log output");
        assert_eq!(output.matches("Job failed").count(), 1, "{}", output);
    }

    #[tokio::test]
    async fn test_empty_batch_succeeds() {
        let tmp = TempDir::new().expect("create temp dir");
        let flags = TriggerFlags::new(tmp.path());
        let recorder = Recorder::new(
            RunHistory::default(),
            Arc::new(MemoryStateStore::new()),
            20,
        );
        let mut runner = JobRunner::new(Arc::new(StaticStrategies::new()), recorder);
        let report = run_batch(&mut runner, &[], &flags).await;
        assert!(!report.any_failed());
        assert_eq!(report.exit_code(), 0);
    }
}
