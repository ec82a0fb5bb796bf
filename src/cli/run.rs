use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::engine::{run_batch, select_jobs, HttpStrategies, JobRunner, JobSelection, Recorder};
use crate::models::AppConfig;
use crate::storage::{JsonStateStore, TriggerFlags};

/// mediareaparr run
pub async fn cmd_run(config_dir: &Path, job_id: Option<&str>, run_now_only: bool) -> anyhow::Result<i32> {
    let config = AppConfig::load(config_dir);
    let jobs = config.jobs();
    let flags = TriggerFlags::new(config_dir);

    let selection = match job_id {
        Some(id) => JobSelection::One(id.to_string()),
        None if run_now_only => JobSelection::RunNowOnly,
        None => JobSelection::Enabled,
    };

    let selected = match select_jobs(&jobs, &selection, &flags).await {
        Ok(selected) => selected,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(e.exit_code());
        }
    };

    if selected.is_empty() {
        println!("No jobs selected. Exiting.");
        return Ok(0);
    }

    let store = Arc::new(JsonStateStore::new(config_dir));
    let recorder = Recorder::open(store, config.history_limit()).await;
    let mut runner = JobRunner::new(Arc::new(HttpStrategies::new(config)), recorder);

    let report = run_batch(&mut runner, &selected, &flags).await;

    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(run) => println!(
                "Job '{}' finished: status={} candidates={} deleted={} errors={}",
                outcome.job_id,
                run.status.as_str(),
                run.candidates_found,
                run.deleted_count,
                run.errors.len()
            ),
            Err(message) => eprintln!("Job '{}' failed: {}", outcome.job_id, message),
        }
    }

    Ok(report.exit_code())
}

/// mediareaparr trigger
pub async fn cmd_trigger(config_dir: &Path, job_id: &str) -> anyhow::Result<i32> {
    let config = AppConfig::load(config_dir);
    if !config.jobs().iter().any(|j| j.id == job_id) {
        eprintln!("Error: Job id '{}' not found in config.json", job_id);
        return Ok(2);
    }

    let flags = TriggerFlags::new(config_dir);
    flags
        .set(job_id)
        .await
        .with_context(|| format!("Failed to write {}", flags.path(job_id).display()))?;
    println!("Job '{}' flagged to run now.", job_id);
    Ok(0)
}
