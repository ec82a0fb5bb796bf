use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::run::RunState;

/// The persisted run-state document read by dashboards.
///
/// All lists are most-recent-first.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RunHistory {
    #[serde(default)]
    pub last_run: Option<RunState>,
    #[serde(default)]
    pub last_runs: BTreeMap<String, RunState>,
    #[serde(default)]
    pub run_history: Vec<RunState>,
    #[serde(default)]
    pub run_history_by_job: BTreeMap<String, Vec<RunState>>,
}

impl RunHistory {
    /// Record `run` into all four views, capping lists at `limit`.
    ///
    /// A run already present (same `run_id`) is replaced and moved to the
    /// front rather than duplicated, so recording after every step of a job
    /// leaves one entry per run.
    pub fn record(&mut self, run: &RunState, limit: usize) {
        self.last_run = Some(run.clone());
        self.last_runs.insert(run.job_id.clone(), run.clone());

        push_front_capped(&mut self.run_history, run, limit);
        let per_job = self.run_history_by_job.entry(run.job_id.clone()).or_default();
        push_front_capped(per_job, run, limit);
    }

    /// Most recent run of `job_id`, if any.
    pub fn last_run_for(&self, job_id: &str) -> Option<&RunState> {
        self.last_runs.get(job_id)
    }

    pub fn history_for(&self, job_id: &str) -> &[RunState] {
        self.run_history_by_job
            .get(job_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

fn push_front_capped(list: &mut Vec<RunState>, run: &RunState, limit: usize) {
    list.retain(|r| r.run_id != run.run_id);
    list.insert(0, run.clone());
    list.truncate(limit);
}
