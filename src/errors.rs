use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid playlist URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid playlist id: {0}")]
    InvalidId(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Could not create {path:?}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Download error: {0}")]
    Acquisition(String),

    #[error("A download session is already running")]
    SessionActive,
}

impl AppError {
    /// Text shown in the log pane when this error ends a session.
    pub fn user_message(&self) -> String {
        match self {
            AppError::MissingField(_) => "Fill in all fields before starting.".to_string(),
            AppError::InvalidUrl(_) | AppError::InvalidId(_) => "Invalid playlist URL.".to_string(),
            AppError::Auth(message) => format!("Error connecting to Spotify: {}", message),
            AppError::Provider(message) => format!("Error fetching the playlist: {}", message),
            AppError::Http(e) => format!("Error fetching the playlist: {}", e),
            AppError::Filesystem { path, source } => {
                format!("Could not create folder {}: {}", path.display(), source)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_id_reads_as_invalid_url() {
        let invalid_id = AppError::InvalidId("Invalid base62 id".to_string());
        let invalid_url = AppError::InvalidUrl("http://spotify.com/x".to_string());
        assert_eq!(invalid_id.user_message(), "Invalid playlist URL.");
        assert_eq!(invalid_id.user_message(), invalid_url.user_message());
    }

    #[test]
    fn test_provider_error_keeps_raw_message() {
        let error = AppError::Provider("404: Resource not found".to_string());
        assert_eq!(
            error.user_message(),
            "Error fetching the playlist: 404: Resource not found"
        );
    }
}
