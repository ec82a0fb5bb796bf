use async_trait::async_trait;

use crate::client::http::{flag, ArrHttp};
use crate::client::types::{EpisodeFile, Series, SystemStatus, Tag};
use crate::client::SonarrApi;
use crate::errors::ReaperResult;
use crate::models::{Application, Endpoint};

/// Sonarr v3 REST client.
#[derive(Debug, Clone)]
pub struct SonarrClient {
    http: ArrHttp,
}

impl SonarrClient {
    pub fn new(endpoint: &Endpoint, timeout_secs: u64) -> ReaperResult<Self> {
        Ok(Self {
            http: ArrHttp::new(Application::Sonarr, endpoint, timeout_secs)?,
        })
    }
}

#[async_trait]
impl SonarrApi for SonarrClient {
    async fn list_tags(&self) -> ReaperResult<Vec<Tag>> {
        self.http.get_list("/api/v3/tag", &[]).await
    }

    async fn list_series(&self) -> ReaperResult<Vec<Series>> {
        self.http.get_list("/api/v3/series", &[]).await
    }

    async fn list_episode_files(&self, series_id: i64) -> ReaperResult<Vec<EpisodeFile>> {
        self.http
            .get_list("/api/v3/episodefile", &[("seriesId", series_id.to_string())])
            .await
    }

    async fn delete_episode_file(&self, id: i64) -> ReaperResult<()> {
        self.http
            .delete(&format!("/api/v3/episodefile/{}", id), &[])
            .await
    }

    async fn delete_series(
        &self,
        id: i64,
        delete_files: bool,
        add_import_list_exclusion: bool,
    ) -> ReaperResult<()> {
        self.http
            .delete(
                &format!("/api/v3/series/{}", id),
                &[
                    ("deleteFiles", flag(delete_files)),
                    ("addImportListExclusion", flag(add_import_list_exclusion)),
                ],
            )
            .await
    }

    async fn system_status(&self) -> ReaperResult<SystemStatus> {
        self.http.get_json("/api/v3/system/status", &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup() -> (MockServer, SonarrClient) {
        let server = MockServer::start().await;
        let client = SonarrClient::new(
            &Endpoint {
                url: format!("{}/", server.uri()),
                api_key: "sonarr-key".to_string(),
            },
            30,
        )
        .expect("build client");
        (server, client)
    }

    #[tokio::test]
    async fn test_list_series() {
        let (server, client) = setup().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/series"))
            .and(header("X-Api-Key", "sonarr-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 3, "title": "The Wire", "added": "2019-01-01T00:00:00Z", "tags": [2], "path": "/tv/The Wire"}
            ])))
            .mount(&server)
            .await;

        let series = client.list_series().await.expect("list series");
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].title.as_deref(), Some("The Wire"));
        assert_eq!(series[0].tags, vec![2]);
    }

    #[tokio::test]
    async fn test_list_series_tolerates_null_tags() {
        let (server, client) = setup().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/series"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 3, "title": "The Wire", "tags": [2]},
                {"id": 4, "title": "Untagged", "tags": null}
            ])))
            .mount(&server)
            .await;

        let series = client.list_series().await.expect("list series");
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].tags, vec![2]);
        assert!(series[1].tags.is_empty());
    }

    #[tokio::test]
    async fn test_list_episode_files_filters_by_series() {
        let (server, client) = setup().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/episodefile"))
            .and(query_param("seriesId", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 100, "seriesId": 3, "relativePath": "Season 1/S01E01.mkv", "dateAdded": "2023-02-01T00:00:00Z"},
                {"id": 101, "seriesId": 3, "relativePath": "Season 1/S01E02.mkv", "dateAdded": "2023-02-02T00:00:00Z"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let files = client.list_episode_files(3).await.expect("list files");
        assert_eq!(files.len(), 2);
        assert_eq!(files[1].id, Some(101));
        assert_eq!(files[0].added_raw(), Some("2023-02-01T00:00:00Z"));
    }

    #[tokio::test]
    async fn test_delete_episode_file() {
        let (server, client) = setup().await;
        Mock::given(method("DELETE"))
            .and(path("/api/v3/episodefile/100"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        client.delete_episode_file(100).await.expect("delete file");
    }

    #[tokio::test]
    async fn test_delete_series_uses_import_list_exclusion_flag() {
        let (server, client) = setup().await;
        Mock::given(method("DELETE"))
            .and(path("/api/v3/series/3"))
            .and(query_param("deleteFiles", "false"))
            .and(query_param("addImportListExclusion", "true"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        client.delete_series(3, false, true).await.expect("delete series");
    }

    #[tokio::test]
    async fn test_unauthorized_is_api_error() {
        let (server, client) = setup().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/tag"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client.list_tags().await.unwrap_err();
        assert_eq!(err.status(), Some(401));
    }
}
