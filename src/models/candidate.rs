use chrono::{DateTime, Utc};

use crate::client::types::{EpisodeFile, Movie, Series};
use crate::models::run::{DeletedEntry, DeletedItem};

/// The remote entity a candidate would delete.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateTarget {
    Movie(Movie),
    Series(Series),
    EpisodeFile {
        file_id: i64,
        file: EpisodeFile,
        series_id: i64,
        series_title: Option<String>,
    },
}

/// An entity eligible for deletion in this run.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub target: CandidateTarget,
    pub added: DateTime<Utc>,
    /// Whole days between `added` and the run's reference time.
    pub age_days: i64,
}

impl Candidate {
    pub fn new(target: CandidateTarget, added: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        Self {
            target,
            added,
            age_days: age_in_days(added, now),
        }
    }

    /// Remote id of the entity to delete.
    pub fn remote_id(&self) -> i64 {
        match &self.target {
            CandidateTarget::Movie(m) => m.id,
            CandidateTarget::Series(s) => s.id,
            CandidateTarget::EpisodeFile { file_id, .. } => *file_id,
        }
    }

    /// A run-record entry describing this candidate, not yet deleted.
    pub fn to_entry(&self, dry_run: bool) -> DeletedEntry {
        let item = match &self.target {
            CandidateTarget::Movie(m) => DeletedItem::Movie {
                id: m.id,
                title: m.title.clone(),
                year: m.year,
                added: m.added.clone(),
                age_days: self.age_days,
                path: m.path.clone(),
            },
            CandidateTarget::Series(s) => DeletedItem::Series {
                id: s.id,
                title: s.title.clone(),
                added: s.added.clone(),
                age_days: Some(self.age_days),
                path: s.path.clone(),
                reason: None,
            },
            CandidateTarget::EpisodeFile {
                file_id,
                file,
                series_id,
                series_title,
            } => DeletedItem::EpisodeFile {
                id: *file_id,
                series_id: *series_id,
                series_title: series_title.clone(),
                relative_path: file.display_path(),
                date_added: file.added_raw().unwrap_or_default().to_string(),
                age_days: self.age_days,
            },
        };
        DeletedEntry::new(item, dry_run)
    }
}

/// Floor of elapsed whole days from `added` to `now`.
pub fn age_in_days(added: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - added).num_seconds().div_euclid(86_400)
}

/// Sort candidates oldest first. The sort is stable, so equal ages keep
/// their discovery order.
pub fn sort_oldest_first(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| b.age_days.cmp(&a.age_days));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn movie_candidate(id: i64, age: Duration) -> Candidate {
        let movie = Movie {
            id,
            title: Some(format!("Movie {}", id)),
            ..Default::default()
        };
        Candidate::new(CandidateTarget::Movie(movie), now() - age, now())
    }

    #[test]
    fn test_age_in_days_floors() {
        assert_eq!(age_in_days(now() - Duration::hours(23), now()), 0);
        assert_eq!(age_in_days(now() - Duration::hours(24), now()), 1);
        assert_eq!(age_in_days(now() - Duration::hours(47), now()), 1);
        assert_eq!(age_in_days(now() - Duration::days(40), now()), 40);
        assert_eq!(
            age_in_days(now() - Duration::days(40) - Duration::seconds(86_399), now()),
            40
        );
    }

    #[test]
    fn test_sort_oldest_first_is_stable() {
        let mut list = vec![
            movie_candidate(1, Duration::days(31)),
            movie_candidate(2, Duration::days(90)),
            movie_candidate(3, Duration::days(31) + Duration::hours(2)),
            movie_candidate(4, Duration::days(45)),
        ];
        sort_oldest_first(&mut list);
        let ids: Vec<i64> = list.iter().map(Candidate::remote_id).collect();
        assert_eq!(ids, vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_episode_entry_uses_file_details() {
        let file = EpisodeFile {
            id: Some(77),
            relative_path: Some("Season 2/S02E03.mkv".to_string()),
            date_added: Some("2024-01-01T00:00:00Z".to_string()),
            ..Default::default()
        };
        let added = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let candidate = Candidate::new(
            CandidateTarget::EpisodeFile {
                file_id: 77,
                file,
                series_id: 5,
                series_title: Some("Show".to_string()),
            },
            added,
            now(),
        );
        assert_eq!(candidate.remote_id(), 77);

        let entry = candidate.to_entry(false);
        assert!(!entry.dry_run);
        assert!(entry.deleted_at.is_none());
        match entry.item {
            DeletedItem::EpisodeFile {
                id,
                series_id,
                relative_path,
                date_added,
                age_days,
                ..
            } => {
                assert_eq!(id, 77);
                assert_eq!(series_id, 5);
                assert_eq!(relative_path, "Season 2/S02E03.mkv");
                assert_eq!(date_added, "2024-01-01T00:00:00Z");
                assert_eq!(age_days, 152);
            }
            other => panic!("Expected EpisodeFile, got: {:?}", other),
        }
    }
}
