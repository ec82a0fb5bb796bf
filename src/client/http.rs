use std::fmt;
use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::{ReaperError, ReaperResult};
use crate::models::config::{Endpoint, MAX_HTTP_TIMEOUT_SECS, MIN_HTTP_TIMEOUT_SECS};
use crate::models::Application;

const API_KEY_HEADER: &str = "X-Api-Key";

/// Longest response body excerpt carried in an `ApiError`.
const MAX_ERROR_BODY_CHARS: usize = 300;

/// Shared HTTP plumbing for the *arr v3 APIs: base URL, API key header,
/// bounded timeout and status checking.
#[derive(Clone)]
pub struct ArrHttp {
    app: Application,
    client: Client,
    base_url: String,
    api_key: String,
}

impl fmt::Debug for ArrHttp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrHttp")
            .field("app", &self.app)
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl ArrHttp {
    /// Build a client for `endpoint`. The timeout is clamped to 5..=300s.
    pub fn new(app: Application, endpoint: &Endpoint, timeout_secs: u64) -> ReaperResult<Self> {
        let timeout = timeout_secs.clamp(MIN_HTTP_TIMEOUT_SECS, MAX_HTTP_TIMEOUT_SECS);
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout))
            .user_agent(concat!("mediareaparr/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            app,
            client,
            base_url: endpoint.url.trim_end_matches('/').to_string(),
            api_key: endpoint.api_key.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET `path` and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ReaperResult<T> {
        tracing::debug!(app = %self.app, "GET {}", path);
        let response = self
            .client
            .get(self.url(path))
            .header(API_KEY_HEADER, &self.api_key)
            .query(query)
            .send()
            .await?;
        let response = check_status(response, "GET", path).await?;
        Ok(response.json::<T>().await?)
    }

    /// GET a list endpoint. A body that is not a JSON array is treated as an
    /// empty list.
    pub async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ReaperResult<Vec<T>> {
        let body: Value = self.get_json(path, query).await?;
        match body {
            Value::Array(_) => serde_json::from_value(body).map_err(|e| {
                ReaperError::Decode(format!("{} {}: {}", self.app.display_name(), path, e))
            }),
            _ => {
                tracing::warn!(app = %self.app, "GET {} did not return a list", path);
                Ok(Vec::new())
            }
        }
    }

    /// DELETE `path`; any 2xx response is success.
    pub async fn delete(&self, path: &str, query: &[(&str, String)]) -> ReaperResult<()> {
        tracing::debug!(app = %self.app, "DELETE {}", path);
        let response = self
            .client
            .delete(self.url(path))
            .header(API_KEY_HEADER, &self.api_key)
            .query(query)
            .send()
            .await?;
        check_status(response, "DELETE", path).await?;
        Ok(())
    }
}

/// Turn non-2xx responses into `ReaperError::Api`.
async fn check_status(response: Response, method: &str, path: &str) -> ReaperResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ReaperError::Api {
        method: method.to_string(),
        path: path.to_string(),
        status: status.as_u16(),
        body: excerpt(&body),
    })
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= MAX_ERROR_BODY_CHARS {
        return trimmed.to_string();
    }
    let mut out: String = trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect();
    out.push('…');
    out
}

/// Render a flag the way the *arr query strings expect it.
pub fn flag(value: bool) -> String {
    value.to_string()
}
