use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReaperError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Tag '{label}' not found in {app}. Create it and tag items first.")]
    TagNotFound { app: String, label: String },

    #[error("API error: {method} {path} returned HTTP {status}: {body}")]
    Api {
        method: String,
        path: String,
        status: u16,
        body: String,
    },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl ReaperError {
    /// HTTP status of a failed remote call, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ReaperError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ReaperError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ReaperError::Decode(err.to_string())
        } else {
            ReaperError::Http(err.to_string())
        }
    }
}

impl From<std::io::Error> for ReaperError {
    fn from(err: std::io::Error) -> Self {
        ReaperError::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for ReaperError {
    fn from(err: serde_json::Error) -> Self {
        ReaperError::Persistence(err.to_string())
    }
}

pub type ReaperResult<T> = Result<T, ReaperError>;
