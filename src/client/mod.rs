pub mod fake;
pub mod http;
pub mod radarr;
pub mod sonarr;
pub mod types;

use async_trait::async_trait;

use crate::errors::ReaperResult;

pub use fake::{FakeCall, FakeRadarr, FakeSonarr};
pub use radarr::RadarrClient;
pub use sonarr::SonarrClient;
pub use types::{EpisodeFile, Movie, Series, SystemStatus, Tag};

/// The subset of the Radarr v3 API used for cleanups.
#[async_trait]
pub trait RadarrApi: Send + Sync {
    async fn list_tags(&self) -> ReaperResult<Vec<Tag>>;
    async fn list_movies(&self) -> ReaperResult<Vec<Movie>>;
    async fn delete_movie(
        &self,
        id: i64,
        delete_files: bool,
        add_import_exclusion: bool,
    ) -> ReaperResult<()>;
    async fn system_status(&self) -> ReaperResult<SystemStatus>;
}

/// The subset of the Sonarr v3 API used for cleanups.
#[async_trait]
pub trait SonarrApi: Send + Sync {
    async fn list_tags(&self) -> ReaperResult<Vec<Tag>>;
    async fn list_series(&self) -> ReaperResult<Vec<Series>>;
    async fn list_episode_files(&self, series_id: i64) -> ReaperResult<Vec<EpisodeFile>>;
    async fn delete_episode_file(&self, id: i64) -> ReaperResult<()>;
    /// Sonarr names the exclusion flag `addImportListExclusion`.
    async fn delete_series(
        &self,
        id: i64,
        delete_files: bool,
        add_import_list_exclusion: bool,
    ) -> ReaperResult<()>;
    async fn system_status(&self) -> ReaperResult<SystemStatus>;
}
