use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::client::{RadarrApi, RadarrClient, Series, SonarrApi, SonarrClient};
use crate::engine::recorder::Recorder;
use crate::engine::selector::{self, Selection};
use crate::errors::{ReaperError, ReaperResult};
use crate::models::{
    AppConfig, Application, Candidate, CandidateTarget, DeletedEntry, DeletedItem, DeletionMode,
    Job, RunState,
};

pub const NO_FILES_REMAIN_REASON: &str = "episodes_then_series_no_files_remain";

/// Mutable view of a run in progress. Every change goes through here so it is
/// recorded immediately.
pub struct RunSession<'a> {
    run: &'a mut RunState,
    recorder: &'a mut Recorder,
}

impl<'a> RunSession<'a> {
    pub fn new(run: &'a mut RunState, recorder: &'a mut Recorder) -> Self {
        Self { run, recorder }
    }

    pub fn dry_run(&self) -> bool {
        self.run.dry_run
    }

    pub async fn set_candidates_found(&mut self, count: usize) {
        self.run.candidates_found = count;
        self.recorder.record(self.run).await;
    }

    /// Dry-run outcome: record what would have been deleted.
    pub async fn would_delete(&mut self, entry: DeletedEntry) {
        self.run.deleted.push(entry);
        self.recorder.record(self.run).await;
    }

    /// Real outcome: stamp and keep `entry` on success, or record the error.
    pub async fn settle(&mut self, mut entry: DeletedEntry, result: Result<(), String>) {
        match result {
            Ok(()) => {
                entry.deleted_at = Some(Utc::now());
                self.run.deleted.push(entry);
            }
            Err(error) => {
                tracing::warn!(job_id = %self.run.job_id, "{}", error);
                self.run.errors.push(error);
            }
        }
        self.recorder.record(self.run).await;
    }

    pub async fn push_error(&mut self, error: String) {
        tracing::warn!(job_id = %self.run.job_id, "{}", error);
        self.run.errors.push(error);
        self.recorder.record(self.run).await;
    }
}

/// Per-application deletion behaviour, chosen once per job.
#[async_trait]
pub trait DeletionStrategy: Send + Sync {
    fn application(&self) -> Application;

    /// Discover candidates. Errors here are fatal for the job.
    async fn select(&self, job: &Job, now: DateTime<Utc>) -> ReaperResult<Selection>;

    /// Delete (or simulate deleting) the selected candidates. Individual
    /// failures are recorded in the session and do not stop the pass.
    async fn execute(
        &self,
        job: &Job,
        selection: Selection,
        session: &mut RunSession<'_>,
    ) -> ReaperResult<()>;
}

fn title_of(title: &Option<String>) -> &str {
    title.as_deref().unwrap_or_default()
}

// --- Radarr ---

pub struct RadarrStrategy {
    api: Arc<dyn RadarrApi>,
}

impl RadarrStrategy {
    pub fn new(api: Arc<dyn RadarrApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl DeletionStrategy for RadarrStrategy {
    fn application(&self) -> Application {
        Application::Radarr
    }

    async fn select(&self, job: &Job, now: DateTime<Utc>) -> ReaperResult<Selection> {
        selector::select_movies(self.api.as_ref(), job, now).await
    }

    async fn execute(
        &self,
        job: &Job,
        selection: Selection,
        session: &mut RunSession<'_>,
    ) -> ReaperResult<()> {
        for candidate in selection.candidates {
            let CandidateTarget::Movie(movie) = &candidate.target else {
                continue;
            };
            tracing::info!(
                movie_id = movie.id,
                age_days = candidate.age_days,
                "Radarr candidate: '{}' added={}",
                title_of(&movie.title),
                movie.added.as_deref().unwrap_or_default()
            );

            let entry = candidate.to_entry(session.dry_run());
            if session.dry_run() {
                session.would_delete(entry).await;
                continue;
            }

            let result = self
                .api
                .delete_movie(movie.id, job.delete_files, job.add_import_exclusion)
                .await
                .map_err(|e| {
                    format!(
                        "ERROR Radarr deleting id={} title='{}': {}",
                        movie.id,
                        title_of(&movie.title),
                        e
                    )
                });
            if result.is_ok() {
                tracing::info!(movie_id = movie.id, "Radarr deleted: '{}'", title_of(&movie.title));
            }
            session.settle(entry, result).await;
        }
        Ok(())
    }
}

// --- Sonarr ---

pub struct SonarrStrategy {
    api: Arc<dyn SonarrApi>,
}

impl SonarrStrategy {
    pub fn new(api: Arc<dyn SonarrApi>) -> Self {
        Self { api }
    }

    async fn delete_series_candidates(
        &self,
        job: &Job,
        candidates: Vec<Candidate>,
        session: &mut RunSession<'_>,
    ) {
        for candidate in candidates {
            let CandidateTarget::Series(series) = &candidate.target else {
                continue;
            };
            tracing::info!(
                series_id = series.id,
                age_days = candidate.age_days,
                "Sonarr series candidate: '{}' added={}",
                title_of(&series.title),
                series.added.as_deref().unwrap_or_default()
            );

            let entry = candidate.to_entry(session.dry_run());
            if session.dry_run() {
                session.would_delete(entry).await;
                continue;
            }

            let result = self
                .api
                .delete_series(series.id, job.delete_files, job.add_import_exclusion)
                .await
                .map_err(|e| {
                    format!(
                        "ERROR Sonarr deleting series id={} title='{}': {}",
                        series.id,
                        title_of(&series.title),
                        e
                    )
                });
            if result.is_ok() {
                tracing::info!(series_id = series.id, "Sonarr series deleted: '{}'", title_of(&series.title));
            }
            session.settle(entry, result).await;
        }
    }

    async fn delete_episode_candidates(&self, candidates: Vec<Candidate>, session: &mut RunSession<'_>) {
        for candidate in candidates {
            let CandidateTarget::EpisodeFile {
                file_id,
                file,
                series_id,
                series_title,
            } = &candidate.target
            else {
                continue;
            };
            tracing::info!(
                series_id = *series_id,
                episode_file_id = *file_id,
                age_days = candidate.age_days,
                "Sonarr episode file candidate: series='{}' dateAdded={}",
                title_of(series_title),
                file.added_raw().unwrap_or_default()
            );

            let entry = candidate.to_entry(session.dry_run());
            if session.dry_run() {
                session.would_delete(entry).await;
                continue;
            }

            let result = self.api.delete_episode_file(*file_id).await.map_err(|e| {
                format!(
                    "ERROR Sonarr deleting episodefile ef_id={} series_id={} series='{}': {}",
                    file_id,
                    series_id,
                    title_of(series_title),
                    e
                )
            });
            if result.is_ok() {
                tracing::info!(
                    episode_file_id = *file_id,
                    "Sonarr episode file deleted: series='{}'",
                    title_of(series_title)
                );
            }
            session.settle(entry, result).await;
        }
    }

    /// Second pass of `episodes_then_series`: ask Sonarr for each tagged
    /// series' remaining files and remove series that have none left.
    ///
    /// The listing is a fresh remote query even under dry-run; only the
    /// series deletion itself is simulated.
    async fn remove_emptied_series(
        &self,
        job: &Job,
        tagged_series: Vec<Series>,
        session: &mut RunSession<'_>,
    ) {
        for series in tagged_series {
            let title = title_of(&series.title).to_string();
            let remaining = match self.api.list_episode_files(series.id).await {
                Ok(files) => files,
                Err(e) => {
                    session
                        .push_error(format!(
                            "ERROR Sonarr checking remaining files for series id={} title='{}': {}",
                            series.id, title, e
                        ))
                        .await;
                    continue;
                }
            };
            if !remaining.is_empty() {
                tracing::debug!(
                    series_id = series.id,
                    remaining = remaining.len(),
                    "Sonarr series keeps files, not removing"
                );
                continue;
            }

            tracing::info!(
                series_id = series.id,
                "Sonarr series has no episode files, removing: '{}'",
                title
            );
            let entry = DeletedEntry::new(
                DeletedItem::Series {
                    id: series.id,
                    title: series.title.clone(),
                    added: None,
                    age_days: None,
                    path: series.path.clone(),
                    reason: Some(NO_FILES_REMAIN_REASON.to_string()),
                },
                session.dry_run(),
            );
            if session.dry_run() {
                session.would_delete(entry).await;
                continue;
            }

            let result = self
                .api
                .delete_series(series.id, job.delete_files, job.add_import_exclusion)
                .await
                .map_err(|e| {
                    format!(
                        "ERROR Sonarr removing series id={} title='{}': {}",
                        series.id, title, e
                    )
                });
            if result.is_ok() {
                tracing::info!(series_id = series.id, "Sonarr series removed: '{}'", title);
            }
            session.settle(entry, result).await;
        }
    }
}

#[async_trait]
impl DeletionStrategy for SonarrStrategy {
    fn application(&self) -> Application {
        Application::Sonarr
    }

    async fn select(&self, job: &Job, now: DateTime<Utc>) -> ReaperResult<Selection> {
        selector::select_series(self.api.as_ref(), job, now).await
    }

    async fn execute(
        &self,
        job: &Job,
        selection: Selection,
        session: &mut RunSession<'_>,
    ) -> ReaperResult<()> {
        tracing::info!(job_id = %job.id, mode = %job.deletion_mode, "Sonarr deletion mode");
        match job.deletion_mode {
            DeletionMode::Series => {
                self.delete_series_candidates(job, selection.candidates, session)
                    .await;
            }
            DeletionMode::EpisodesOnly => {
                self.delete_episode_candidates(selection.candidates, session)
                    .await;
            }
            DeletionMode::EpisodesThenSeries => {
                self.delete_episode_candidates(selection.candidates, session)
                    .await;
                self.remove_emptied_series(job, selection.tagged_series, session)
                    .await;
            }
        }
        Ok(())
    }
}

/// Builds the strategy for a job, resolving whatever it needs to talk to the
/// remote application.
pub trait StrategyProvider: Send + Sync {
    fn strategy_for(&self, job: &Job) -> ReaperResult<Box<dyn DeletionStrategy>>;
}

/// Strategies over already-constructed clients. A job whose application has
/// no client configured fails with a configuration error.
#[derive(Default, Clone)]
pub struct StaticStrategies {
    radarr: Option<Arc<dyn RadarrApi>>,
    sonarr: Option<Arc<dyn SonarrApi>>,
}

impl StaticStrategies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_radarr(mut self, api: Arc<dyn RadarrApi>) -> Self {
        self.radarr = Some(api);
        self
    }

    pub fn with_sonarr(mut self, api: Arc<dyn SonarrApi>) -> Self {
        self.sonarr = Some(api);
        self
    }
}

impl StrategyProvider for StaticStrategies {
    fn strategy_for(&self, job: &Job) -> ReaperResult<Box<dyn DeletionStrategy>> {
        let missing = || {
            ReaperError::Configuration(format!(
                "No {} client configured",
                job.application.display_name()
            ))
        };
        match job.application {
            Application::Radarr => {
                let api = self.radarr.clone().ok_or_else(missing)?;
                Ok(Box::new(RadarrStrategy::new(api)))
            }
            Application::Sonarr => {
                let api = self.sonarr.clone().ok_or_else(missing)?;
                Ok(Box::new(SonarrStrategy::new(api)))
            }
        }
    }
}

/// Strategies backed by real HTTP clients, built per job from the config so a
/// missing URL or key only fails the jobs that need it.
#[derive(Clone)]
pub struct HttpStrategies {
    config: AppConfig,
}

impl HttpStrategies {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }
}

impl StrategyProvider for HttpStrategies {
    fn strategy_for(&self, job: &Job) -> ReaperResult<Box<dyn DeletionStrategy>> {
        let endpoint = self.config.endpoint(job.application)?;
        let timeout = self.config.http_timeout_secs();
        tracing::debug!(app = %job.application, url = %endpoint.url, "Building client");
        match job.application {
            Application::Radarr => Ok(Box::new(RadarrStrategy::new(Arc::new(
                RadarrClient::new(&endpoint, timeout)?,
            )))),
            Application::Sonarr => Ok(Box::new(SonarrStrategy::new(Arc::new(
                SonarrClient::new(&endpoint, timeout)?,
            )))),
        }
    }
}
