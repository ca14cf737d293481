use crate::api::DownloadForm;
use crate::errors::{AppError, Result};
use url::Url;

pub const PLAYLIST_URL_PREFIX: &str = "https://open.spotify.com/playlist/";

pub struct InputValidator;

impl InputValidator {
    pub fn new() -> Self {
        Self
    }

    /// Checks a trimmed form: required fields first, then the playlist URL.
    pub fn validate_form(&self, form: &DownloadForm) -> Result<()> {
        if form.client_id.is_empty() {
            return Err(AppError::MissingField("client id"));
        }
        if form.client_secret.is_empty() {
            return Err(AppError::MissingField("client secret"));
        }
        if form.playlist_url.is_empty() {
            return Err(AppError::MissingField("playlist URL"));
        }

        self.playlist_id(&form.playlist_url).map(|_| ())
    }

    /// Last path segment of a playlist URL, query string removed.
    pub fn playlist_id(&self, url: &str) -> Result<String> {
        if !url.starts_with(PLAYLIST_URL_PREFIX) {
            return Err(AppError::InvalidUrl(url.to_string()));
        }

        let parsed = Url::parse(url).map_err(|e| AppError::InvalidUrl(format!("{}: {}", url, e)))?;

        parsed
            .path_segments()
            .and_then(|segments| segments.last())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or_else(|| AppError::InvalidUrl(url.to_string()))
    }
}

impl Default for InputValidator {
    fn default() -> Self {
        Self::new()
    }
}
