use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};

use crate::models::{AppConfig, Job, RunHistory, RunState};
use crate::storage::state::STATE_FILE;

/// Format a past timestamp as a relative time string (e.g., "5 minutes ago").
fn format_relative_time(dt: &DateTime<Utc>) -> String {
    let secs = Utc::now().signed_duration_since(*dt).num_seconds().max(0);
    if secs < 60 {
        format!("{} seconds ago", secs)
    } else if secs < 3600 {
        format!("{} minutes ago", secs / 60)
    } else if secs < 86400 {
        format!("{} hours ago", secs / 3600)
    } else {
        format!("{} days ago", secs / 86400)
    }
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() > width - 1 {
        let kept: String = value.chars().take(width - 4).collect();
        format!("{}...", kept)
    } else {
        value.to_string()
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn job_mode(job: &Job) -> String {
    job.sonarr_mode()
        .map(|m| m.to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// mediareaparr jobs
pub fn cmd_jobs(config_dir: &Path, json: bool) -> anyhow::Result<()> {
    let jobs = AppConfig::load(config_dir).jobs();

    if json {
        println!("{}", serde_json::to_string_pretty(&jobs)?);
        return Ok(());
    }

    if jobs.is_empty() {
        println!("No jobs found.");
        return Ok(());
    }

    println!(
        "{:<16}{:<20}{:<9}{:<8}{:<16}{:<6}{:<9}{:<22}",
        "ID", "NAME", "ENABLED", "APP", "TAG", "DAYS", "DRY RUN", "MODE"
    );
    for job in &jobs {
        println!(
            "{:<16}{:<20}{:<9}{:<8}{:<16}{:<6}{:<9}{:<22}",
            truncate(&job.id, 16),
            truncate(&job.name, 20),
            yes_no(job.enabled),
            job.application.as_str(),
            truncate(&job.tag_label, 16),
            job.days_old,
            yes_no(job.dry_run),
            job_mode(job)
        );
    }

    Ok(())
}

fn print_run_row(run: &RunState) {
    println!(
        "{:<16}{:<16}{:<18}{:<12}{:<9}{:<8}",
        truncate(&run.job_id, 16),
        run.status.as_str(),
        format_relative_time(&run.started_at),
        run.candidates_found,
        run.deleted_count,
        run.errors.len()
    );
}

fn print_header() {
    println!(
        "{:<16}{:<16}{:<18}{:<12}{:<9}{:<8}",
        "JOB", "STATUS", "STARTED", "CANDIDATES", "DELETED", "ERRORS"
    );
}

/// Read `state.json` without touching it. Unlike the run path, a corrupted
/// file is reported instead of being backed up and reset.
async fn read_history(config_dir: &Path) -> anyhow::Result<RunHistory> {
    let path = config_dir.join(STATE_FILE);
    let content = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(RunHistory::default()),
        Err(e) => return Err(e).with_context(|| format!("Failed to read {}", path.display())),
    };
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// mediareaparr status
pub async fn cmd_status(config_dir: &Path, job_id: Option<&str>, json: bool) -> anyhow::Result<()> {
    let history = read_history(config_dir).await?;

    match job_id {
        Some(id) => {
            let runs = history.history_for(id);
            if json {
                println!("{}", serde_json::to_string_pretty(runs)?);
                return Ok(());
            }
            let Some(last) = runs.first() else {
                println!("No runs recorded for job '{}'.", id);
                return Ok(());
            };

            println!("Job:        {} ({})", last.job_name, last.job_id);
            println!("App:        {}", last.app);
            println!("Status:     {}", last.status.as_str());
            println!("Started:    {}", last.started_at.to_rfc3339());
            if let Some(secs) = last.duration_seconds {
                println!("Duration:   {}s", secs);
            }
            println!("Dry run:    {}", yes_no(last.dry_run));
            println!("Candidates: {}", last.candidates_found);
            println!("Deleted:    {}", last.deleted_count);
            for error in &last.errors {
                println!("  {}", error);
            }

            if runs.len() > 1 {
                println!();
                print_header();
                for run in runs {
                    print_run_row(run);
                }
            }
        }
        None => {
            if json {
                println!("{}", serde_json::to_string_pretty(&history.last_runs)?);
                return Ok(());
            }
            if history.last_runs.is_empty() {
                println!("No runs recorded yet.");
                return Ok(());
            }
            print_header();
            for run in history.last_runs.values() {
                print_run_row(run);
            }
        }
    }

    Ok(())
}
