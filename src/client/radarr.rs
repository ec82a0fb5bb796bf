use async_trait::async_trait;

use crate::client::http::{flag, ArrHttp};
use crate::client::types::{Movie, SystemStatus, Tag};
use crate::client::RadarrApi;
use crate::errors::ReaperResult;
use crate::models::{Application, Endpoint};

/// Radarr v3 REST client.
#[derive(Debug, Clone)]
pub struct RadarrClient {
    http: ArrHttp,
}

impl RadarrClient {
    pub fn new(endpoint: &Endpoint, timeout_secs: u64) -> ReaperResult<Self> {
        Ok(Self {
            http: ArrHttp::new(Application::Radarr, endpoint, timeout_secs)?,
        })
    }
}

#[async_trait]
impl RadarrApi for RadarrClient {
    async fn list_tags(&self) -> ReaperResult<Vec<Tag>> {
        self.http.get_list("/api/v3/tag", &[]).await
    }

    async fn list_movies(&self) -> ReaperResult<Vec<Movie>> {
        self.http.get_list("/api/v3/movie", &[]).await
    }

    async fn delete_movie(
        &self,
        id: i64,
        delete_files: bool,
        add_import_exclusion: bool,
    ) -> ReaperResult<()> {
        self.http
            .delete(
                &format!("/api/v3/movie/{}", id),
                &[
                    ("deleteFiles", flag(delete_files)),
                    ("addImportExclusion", flag(add_import_exclusion)),
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
    use crate::errors::ReaperError;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup() -> (MockServer, RadarrClient) {
        let server = MockServer::start().await;
        let client = RadarrClient::new(
            &Endpoint {
                url: server.uri(),
                api_key: "radarr-key".to_string(),
            },
            30,
        )
        .expect("build client");
        (server, client)
    }

    #[tokio::test]
    async fn test_list_tags() {
        let (server, client) = setup().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/tag"))
            .and(header("X-Api-Key", "radarr-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "label": "keep-clean"},
                {"id": 2, "label": "4k"}
            ])))
            .mount(&server)
            .await;

        let tags = client.list_tags().await.expect("list tags");
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].label.as_deref(), Some("keep-clean"));
    }

    #[tokio::test]
    async fn test_list_movies() {
        let (server, client) = setup().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/movie"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 10, "title": "Alien", "year": 1979, "added": "2020-05-01T10:00:00Z", "tags": [1]},
                {"id": 11, "title": "Aliens", "tags": []}
            ])))
            .mount(&server)
            .await;

        let movies = client.list_movies().await.expect("list movies");
        assert_eq!(movies.len(), 2);
        assert_eq!(movies[0].tags, vec![1]);
        assert!(movies[1].added.is_none());
    }

    #[tokio::test]
    async fn test_delete_movie_sends_flags() {
        let (server, client) = setup().await;
        Mock::given(method("DELETE"))
            .and(path("/api/v3/movie/10"))
            .and(query_param("deleteFiles", "true"))
            .and(query_param("addImportExclusion", "false"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        client.delete_movie(10, true, false).await.expect("delete");
    }

    #[tokio::test]
    async fn test_delete_movie_failure_carries_status() {
        let (server, client) = setup().await;
        Mock::given(method("DELETE"))
            .and(path("/api/v3/movie/10"))
            .respond_with(ResponseTemplate::new(500).set_body_string("database is locked"))
            .mount(&server)
            .await;

        let err = client.delete_movie(10, true, true).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert!(matches!(err, ReaperError::Api { .. }));
        assert!(err.to_string().contains("database is locked"));
    }

    #[tokio::test]
    async fn test_system_status() {
        let (server, client) = setup().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/system/status"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"version": "5.2.6", "instanceName": "Radarr"})),
            )
            .mount(&server)
            .await;

        let status = client.system_status().await.expect("status");
        assert_eq!(status.version.as_deref(), Some("5.2.6"));
        assert_eq!(status.instance_name.as_deref(), Some("Radarr"));
    }
}
