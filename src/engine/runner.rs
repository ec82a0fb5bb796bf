use std::sync::Arc;

use chrono::Utc;

use crate::engine::recorder::Recorder;
use crate::engine::selector::cutoff_for;
use crate::engine::strategy::{RunSession, StrategyProvider};
use crate::errors::ReaperResult;
use crate::models::{Job, RunHistory, RunState, RunStatus};

/// Executes jobs one at a time, recording every step.
pub struct JobRunner {
    strategies: Arc<dyn StrategyProvider>,
    recorder: Recorder,
}

impl JobRunner {
    pub fn new(strategies: Arc<dyn StrategyProvider>, recorder: Recorder) -> Self {
        Self {
            strategies,
            recorder,
        }
    }

    pub fn history(&self) -> &RunHistory {
        self.recorder.history()
    }

    /// Run `job` to completion.
    ///
    /// The run is recorded as `running` before any remote call and finalized
    /// exactly once, whatever happens in between. A job-fatal error is
    /// appended to the run's `errors`, the run is marked `failed`, and the
    /// error is returned after the final record.
    pub async fn run_job(&mut self, job: &Job) -> ReaperResult<RunState> {
        let now = Utc::now();
        let mut run = RunState::start(job, now);

        tracing::info!(
            job_id = %job.id,
            app = %job.application,
            run_id = %run.run_id,
            "Starting job '{}'",
            job.name
        );
        tracing::info!(
            job_id = %job.id,
            tag = %job.tag_label,
            days_old = job.days_old,
            cutoff = %cutoff_for(now, job.days_old).to_rfc3339(),
            dry_run = job.dry_run,
            delete_files = job.delete_files,
            add_import_exclusion = job.add_import_exclusion,
            "Job parameters"
        );
        self.recorder.record(&mut run).await;

        let outcome = self.drive(job, &mut run, now).await;

        match &outcome {
            Ok(()) => run.status = run.completed_status(),
            Err(e) => {
                tracing::error!(job_id = %job.id, "Job failed: {}", e);
                run.errors.push(e.to_string());
                run.status = RunStatus::Failed;
            }
        }
        run.finish(Utc::now());
        self.recorder.record(&mut run).await;

        tracing::info!(
            job_id = %job.id,
            status = run.status.as_str(),
            candidates = run.candidates_found,
            deleted = run.deleted_count,
            errors = run.errors.len(),
            duration_seconds = run.duration_seconds.unwrap_or_default(),
            "Job finished"
        );

        outcome.map(|()| run)
    }

    async fn drive(
        &mut self,
        job: &Job,
        run: &mut RunState,
        now: chrono::DateTime<Utc>,
    ) -> ReaperResult<()> {
        let strategy = self.strategies.strategy_for(job)?;
        let selection = strategy.select(job, now).await?;
        tracing::info!(
            job_id = %job.id,
            app = %strategy.application(),
            candidates = selection.candidates.len(),
            "Candidates selected"
        );

        let mut session = RunSession::new(run, &mut self.recorder);
        session
            .set_candidates_found(selection.candidates.len())
            .await;
        strategy.execute(job, selection, &mut session).await
    }
}
