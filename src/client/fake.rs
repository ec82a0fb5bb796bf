// In-memory Radarr/Sonarr stand-ins for tests.
// They keep their own library state, so deletions are visible to later
// listings, and record every call for assertions.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::client::types::{EpisodeFile, Movie, Series, SystemStatus, Tag};
use crate::client::{RadarrApi, SonarrApi};
use crate::errors::{ReaperError, ReaperResult};

/// A call observed by a fake client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeCall {
    ListTags,
    ListMovies,
    ListSeries,
    ListEpisodeFiles(i64),
    DeleteMovie {
        id: i64,
        delete_files: bool,
        add_import_exclusion: bool,
    },
    DeleteEpisodeFile(i64),
    DeleteSeries {
        id: i64,
        delete_files: bool,
        add_import_list_exclusion: bool,
    },
    SystemStatus,
}

impl FakeCall {
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            FakeCall::DeleteMovie { .. } | FakeCall::DeleteEpisodeFile(_) | FakeCall::DeleteSeries { .. }
        )
    }
}

fn injected(method: &str, path: String) -> ReaperError {
    ReaperError::Api {
        method: method.to_string(),
        path,
        status: 500,
        body: "injected failure".to_string(),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn tag(id: i64, label: &str) -> Tag {
    Tag {
        id: Some(id),
        label: Some(label.to_string()),
    }
}

// --- Radarr ---

#[derive(Default)]
struct RadarrState {
    tags: Vec<Tag>,
    movies: Vec<Movie>,
    failing_deletes: HashSet<i64>,
    fail_tag_listing: bool,
    fail_movie_listing: bool,
    calls: Vec<FakeCall>,
}

/// Fake Radarr backed by an in-memory movie list.
#[derive(Default)]
pub struct FakeRadarr {
    state: Mutex<RadarrState>,
}

impl FakeRadarr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag(self, id: i64, label: &str) -> Self {
        lock(&self.state).tags.push(tag(id, label));
        self
    }

    pub fn with_movie(self, movie: Movie) -> Self {
        lock(&self.state).movies.push(movie);
        self
    }

    /// Make `delete_movie(id)` fail with HTTP 500.
    pub fn failing_delete(self, id: i64) -> Self {
        lock(&self.state).failing_deletes.insert(id);
        self
    }

    pub fn failing_tag_listing(self) -> Self {
        lock(&self.state).fail_tag_listing = true;
        self
    }

    pub fn failing_movie_listing(self) -> Self {
        lock(&self.state).fail_movie_listing = true;
        self
    }

    pub fn calls(&self) -> Vec<FakeCall> {
        lock(&self.state).calls.clone()
    }

    pub fn mutation_count(&self) -> usize {
        lock(&self.state)
            .calls
            .iter()
            .filter(|c| c.is_mutation())
            .count()
    }

    pub fn movie_ids(&self) -> Vec<i64> {
        lock(&self.state).movies.iter().map(|m| m.id).collect()
    }
}

#[async_trait]
impl RadarrApi for FakeRadarr {
    async fn list_tags(&self) -> ReaperResult<Vec<Tag>> {
        let mut state = lock(&self.state);
        state.calls.push(FakeCall::ListTags);
        if state.fail_tag_listing {
            return Err(ReaperError::Http("connection refused".to_string()));
        }
        Ok(state.tags.clone())
    }

    async fn list_movies(&self) -> ReaperResult<Vec<Movie>> {
        let mut state = lock(&self.state);
        state.calls.push(FakeCall::ListMovies);
        if state.fail_movie_listing {
            return Err(injected("GET", "/api/v3/movie".to_string()));
        }
        Ok(state.movies.clone())
    }

    async fn delete_movie(
        &self,
        id: i64,
        delete_files: bool,
        add_import_exclusion: bool,
    ) -> ReaperResult<()> {
        let mut state = lock(&self.state);
        state.calls.push(FakeCall::DeleteMovie {
            id,
            delete_files,
            add_import_exclusion,
        });
        if state.failing_deletes.contains(&id) {
            return Err(injected("DELETE", format!("/api/v3/movie/{}", id)));
        }
        state.movies.retain(|m| m.id != id);
        Ok(())
    }

    async fn system_status(&self) -> ReaperResult<SystemStatus> {
        lock(&self.state).calls.push(FakeCall::SystemStatus);
        Ok(SystemStatus {
            version: Some("5.0.0".to_string()),
            instance_name: Some("Fake Radarr".to_string()),
        })
    }
}

// --- Sonarr ---

#[derive(Default)]
struct SonarrState {
    tags: Vec<Tag>,
    series: Vec<Series>,
    files: HashMap<i64, Vec<EpisodeFile>>,
    failing_file_deletes: HashSet<i64>,
    failing_series_deletes: HashSet<i64>,
    failing_requery: HashSet<i64>,
    file_listings: HashMap<i64, usize>,
    calls: Vec<FakeCall>,
}

/// Fake Sonarr backed by in-memory series and episode files.
#[derive(Default)]
pub struct FakeSonarr {
    state: Mutex<SonarrState>,
}

impl FakeSonarr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag(self, id: i64, label: &str) -> Self {
        lock(&self.state).tags.push(tag(id, label));
        self
    }

    pub fn with_series(self, series: Series) -> Self {
        lock(&self.state).series.push(series);
        self
    }

    /// Attach an episode file to `series_id`.
    pub fn with_episode_file(self, series_id: i64, file: EpisodeFile) -> Self {
        lock(&self.state)
            .files
            .entry(series_id)
            .or_default()
            .push(file);
        self
    }

    pub fn failing_file_delete(self, file_id: i64) -> Self {
        lock(&self.state).failing_file_deletes.insert(file_id);
        self
    }

    pub fn failing_series_delete(self, series_id: i64) -> Self {
        lock(&self.state).failing_series_deletes.insert(series_id);
        self
    }

    /// Let the first episode-file listing of `series_id` succeed and fail
    /// every later one.
    pub fn failing_requery(self, series_id: i64) -> Self {
        lock(&self.state).failing_requery.insert(series_id);
        self
    }

    pub fn calls(&self) -> Vec<FakeCall> {
        lock(&self.state).calls.clone()
    }

    pub fn mutation_count(&self) -> usize {
        lock(&self.state)
            .calls
            .iter()
            .filter(|c| c.is_mutation())
            .count()
    }

    pub fn series_ids(&self) -> Vec<i64> {
        lock(&self.state).series.iter().map(|s| s.id).collect()
    }

    pub fn file_ids(&self, series_id: i64) -> Vec<i64> {
        lock(&self.state)
            .files
            .get(&series_id)
            .map(|files| files.iter().filter_map(|f| f.id).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SonarrApi for FakeSonarr {
    async fn list_tags(&self) -> ReaperResult<Vec<Tag>> {
        let mut state = lock(&self.state);
        state.calls.push(FakeCall::ListTags);
        Ok(state.tags.clone())
    }

    async fn list_series(&self) -> ReaperResult<Vec<Series>> {
        let mut state = lock(&self.state);
        state.calls.push(FakeCall::ListSeries);
        Ok(state.series.clone())
    }

    async fn list_episode_files(&self, series_id: i64) -> ReaperResult<Vec<EpisodeFile>> {
        let mut state = lock(&self.state);
        state.calls.push(FakeCall::ListEpisodeFiles(series_id));
        let listings = {
            let count = state.file_listings.entry(series_id).or_insert(0);
            *count += 1;
            *count
        };
        if listings > 1 && state.failing_requery.contains(&series_id) {
            return Err(injected("GET", "/api/v3/episodefile".to_string()));
        }
        Ok(state.files.get(&series_id).cloned().unwrap_or_default())
    }

    async fn delete_episode_file(&self, id: i64) -> ReaperResult<()> {
        let mut state = lock(&self.state);
        state.calls.push(FakeCall::DeleteEpisodeFile(id));
        if state.failing_file_deletes.contains(&id) {
            return Err(injected("DELETE", format!("/api/v3/episodefile/{}", id)));
        }
        for files in state.files.values_mut() {
            files.retain(|f| f.id != Some(id));
        }
        Ok(())
    }

    async fn delete_series(
        &self,
        id: i64,
        delete_files: bool,
        add_import_list_exclusion: bool,
    ) -> ReaperResult<()> {
        let mut state = lock(&self.state);
        state.calls.push(FakeCall::DeleteSeries {
            id,
            delete_files,
            add_import_list_exclusion,
        });
        if state.failing_series_deletes.contains(&id) {
            return Err(injected("DELETE", format!("/api/v3/series/{}", id)));
        }
        state.series.retain(|s| s.id != id);
        state.files.remove(&id);
        Ok(())
    }

    async fn system_status(&self) -> ReaperResult<SystemStatus> {
        lock(&self.state).calls.push(FakeCall::SystemStatus);
        Ok(SystemStatus {
            version: Some("4.0.0".to_string()),
            instance_name: Some("Fake Sonarr".to_string()),
        })
    }
}
