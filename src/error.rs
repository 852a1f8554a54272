//! Error type shared by the request builder, the HTTP layer, and configuration loading.
//!
//! Upstream failures that belong to a single submission (non-2xx statuses,
//! `"status": "error"` bodies) are not errors at this level; the renderer turns
//! them into a [`crate::render::SearchOutcome`]. `NewsError` covers everything
//! that stops a submission before or during transport.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NewsError {
    #[error("no API key configured; pass --api-key or set NEWSAPI_API_KEY")]
    MissingApiKey,

    #[error("invalid search request: {0}")]
    InvalidRequest(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("config file is not valid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NewsError {
    /// Errors the user has to fix locally before anything is sent upstream.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            NewsError::MissingApiKey | NewsError::InvalidRequest(_) | NewsError::Config(_)
        )
    }
}

pub type NewsResult<T> = Result<T, NewsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_errors_are_classified() {
        assert!(NewsError::MissingApiKey.is_configuration());
        assert!(NewsError::InvalidRequest("bad".into()).is_configuration());
        assert!(!NewsError::Transport("refused".into()).is_configuration());
    }

    #[test]
    fn test_missing_api_key_message() {
        let msg = NewsError::MissingApiKey.to_string();
        assert!(msg.contains("API key"));
    }
}
