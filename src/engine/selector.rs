//! Candidate discovery: tag resolution, age cutoff, oldest-first ordering.

use chrono::{DateTime, Duration, Utc};

use crate::client::types::{parse_timestamp, Series, Tag};
use crate::client::{RadarrApi, SonarrApi};
use crate::errors::{ReaperError, ReaperResult};
use crate::models::candidate::sort_oldest_first;
use crate::models::{Application, Candidate, CandidateTarget, DeletionMode, Job};

/// Candidates for one run, plus the tagged series a Sonarr job may revisit
/// after episode deletions.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub candidates: Vec<Candidate>,
    pub tagged_series: Vec<Series>,
}

/// Items added strictly before this instant are eligible.
pub fn cutoff_for(now: DateTime<Utc>, days_old: u32) -> DateTime<Utc> {
    now - Duration::days(i64::from(days_old))
}

/// Exact-label lookup. Tags with an empty label or no id never match.
pub fn find_tag_id(tags: &[Tag], label: &str) -> Option<i64> {
    tags.iter()
        .filter(|t| t.label.as_deref().is_some_and(|l| !l.is_empty()))
        .find(|t| t.label.as_deref() == Some(label))
        .and_then(|t| t.id)
}

/// Parse `added` and return it if it falls before `cutoff`.
/// Missing or unparsable timestamps are never eligible.
fn eligible_added(added: Option<&str>, cutoff: DateTime<Utc>) -> Option<DateTime<Utc>> {
    parse_timestamp(added?).filter(|dt| *dt < cutoff)
}

fn tag_not_found(app: Application, label: &str) -> ReaperError {
    ReaperError::TagNotFound {
        app: app.display_name().to_string(),
        label: label.to_string(),
    }
}

/// Tagged movies older than the job's threshold, oldest first.
pub async fn select_movies(
    api: &dyn RadarrApi,
    job: &Job,
    now: DateTime<Utc>,
) -> ReaperResult<Selection> {
    let cutoff = cutoff_for(now, job.days_old);
    let tags = api.list_tags().await?;
    let tag_id = find_tag_id(&tags, &job.tag_label)
        .ok_or_else(|| tag_not_found(Application::Radarr, &job.tag_label))?;

    let mut candidates: Vec<Candidate> = api
        .list_movies()
        .await?
        .into_iter()
        .filter(|m| m.tags.contains(&tag_id))
        .filter_map(|m| {
            let added = eligible_added(m.added.as_deref(), cutoff)?;
            Some(Candidate::new(CandidateTarget::Movie(m), added, now))
        })
        .collect();

    sort_oldest_first(&mut candidates);
    Ok(Selection {
        candidates,
        tagged_series: Vec::new(),
    })
}

/// Sonarr candidates for the job's deletion mode, oldest first.
///
/// `series` mode yields whole series by their own added date; the episode
/// modes yield episode files flattened across all tagged series.
pub async fn select_series(
    api: &dyn SonarrApi,
    job: &Job,
    now: DateTime<Utc>,
) -> ReaperResult<Selection> {
    let cutoff = cutoff_for(now, job.days_old);
    let tags = api.list_tags().await?;
    let tag_id = find_tag_id(&tags, &job.tag_label)
        .ok_or_else(|| tag_not_found(Application::Sonarr, &job.tag_label))?;

    let tagged_series: Vec<Series> = api
        .list_series()
        .await?
        .into_iter()
        .filter(|s| s.tags.contains(&tag_id))
        .collect();

    let mut candidates = Vec::new();
    match job.deletion_mode {
        DeletionMode::Series => {
            for series in &tagged_series {
                if let Some(added) = eligible_added(series.added.as_deref(), cutoff) {
                    candidates.push(Candidate::new(
                        CandidateTarget::Series(series.clone()),
                        added,
                        now,
                    ));
                }
            }
        }
        DeletionMode::EpisodesOnly | DeletionMode::EpisodesThenSeries => {
            for series in &tagged_series {
                for file in api.list_episode_files(series.id).await? {
                    let Some(file_id) = file.id else {
                        continue;
                    };
                    let Some(added) = eligible_added(file.added_raw(), cutoff) else {
                        continue;
                    };
                    candidates.push(Candidate::new(
                        CandidateTarget::EpisodeFile {
                            file_id,
                            file,
                            series_id: series.id,
                            series_title: series.title.clone(),
                        },
                        added,
                        now,
                    ));
                }
            }
        }
    }

    sort_oldest_first(&mut candidates);
    Ok(Selection {
        candidates,
        tagged_series,
    })
}
