use std::path::Path;

use crate::client::{RadarrApi, RadarrClient, SonarrApi, SonarrClient, SystemStatus};
use crate::errors::{ReaperError, ReaperResult};
use crate::models::{AppConfig, Application};

/// Turn a status probe into a one-line verdict.
pub fn describe_connection(app: Application, result: &ReaperResult<SystemStatus>) -> (bool, String) {
    match result {
        Ok(status) => {
            let mut message = "Connected".to_string();
            if let Some(version) = status.version.as_deref().filter(|v| !v.is_empty()) {
                message.push_str(&format!(" (v{})", version));
            }
            if let Some(instance) = status.instance_name.as_deref().filter(|i| !i.is_empty()) {
                message.push_str(&format!(" - {}", instance));
            }
            (true, message)
        }
        Err(ReaperError::Api { status: 401 | 403, .. }) => {
            (false, "Unauthorized. Check API key.".to_string())
        }
        Err(ReaperError::Api { status, .. }) => (
            false,
            format!("{} returned HTTP {}.", app.display_name(), status),
        ),
        Err(ReaperError::Configuration(message)) => (false, message.clone()),
        Err(e) => (false, format!("Connection failed: {}", e)),
    }
}

async fn probe(config: &AppConfig, app: Application) -> ReaperResult<SystemStatus> {
    let endpoint = config.endpoint(app)?;
    let timeout = config.http_timeout_secs();
    match app {
        Application::Radarr => RadarrClient::new(&endpoint, timeout)?.system_status().await,
        Application::Sonarr => SonarrClient::new(&endpoint, timeout)?.system_status().await,
    }
}

/// mediareaparr test-connection
pub async fn cmd_test_connection(config_dir: &Path, app: Application) -> anyhow::Result<i32> {
    let config = AppConfig::load(config_dir);
    let result = probe(&config, app).await;
    let (ok, message) = describe_connection(app, &result);
    if ok {
        println!("{}: {}", app.display_name(), message);
        Ok(0)
    } else {
        eprintln!("{}: {}", app.display_name(), message);
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(status: u16) -> ReaperError {
        ReaperError::Api {
            method: "GET".to_string(),
            path: "/api/v3/system/status".to_string(),
            status,
            body: String::new(),
        }
    }

    #[test]
    fn test_connected_with_details() {
        let result = Ok(SystemStatus {
            version: Some("5.2.6".to_string()),
            instance_name: Some("Radarr 4K".to_string()),
        });
        assert_eq!(
            describe_connection(Application::Radarr, &result),
            (true, "Connected (v5.2.6) - Radarr 4K".to_string())
        );
        assert_eq!(
            describe_connection(Application::Radarr, &Ok(SystemStatus::default())),
            (true, "Connected".to_string())
        );
    }

    #[test]
    fn test_unauthorized() {
        for status in [401, 403] {
            let (ok, message) = describe_connection(Application::Sonarr, &Err(api_error(status)));
            assert!(!ok);
            assert_eq!(message, "Unauthorized. Check API key.");
        }
    }

    #[test]
    fn test_other_http_status() {
        let (ok, message) = describe_connection(Application::Sonarr, &Err(api_error(502)));
        assert!(!ok);
        assert_eq!(message, "Sonarr returned HTTP 502.");
    }

    #[test]
    fn test_transport_failure() {
        let (ok, message) = describe_connection(
            Application::Radarr,
            &Err(ReaperError::Http("connection refused".to_string())),
        );
        assert!(!ok);
        assert!(message.starts_with("Connection failed:"));
    }
}
