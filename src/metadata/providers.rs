use crate::api::{Credentials, TracksPage};
use crate::errors::{AppError, Result};
use crate::metadata::http_pool::HttpPool;
use crate::metadata::{CatalogConnector, PlaylistProvider};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use std::sync::Arc;

const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const API_BASE: &str = "https://api.spotify.com/v1";
const TRACK_FIELDS: &str = "items(track(name,artists(name))),total";

/// Client-credentials login against the Spotify accounts service.
pub struct SpotifyConnector {
    client: Client,
}

impl SpotifyConnector {
    pub fn new(http_pool: HttpPool) -> Self {
        Self {
            client: http_pool.get_client().clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct TokenError {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

#[async_trait]
impl CatalogConnector for SpotifyConnector {
    async fn connect(&self, credentials: &Credentials) -> Result<Arc<dyn PlaylistProvider>> {
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
        ];

        let response = self
            .client
            .post(TOKEN_URL)
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::Auth(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| AppError::Auth(e.to_string()))?;

        if !status.is_success() {
            let message = match serde_json::from_str::<TokenError>(&body) {
                Ok(err) => err.error_description.unwrap_or(err.error),
                Err(_) => body,
            };
            return Err(AppError::Auth(format!("{}: {}", status.as_u16(), message)));
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| AppError::Auth(format!("unexpected token response: {}", e)))?;

        log::info!("Obtained Spotify access token");
        Ok(Arc::new(SpotifyClient {
            client: self.client.clone(),
            access_token: token.access_token,
        }))
    }
}

/// Authenticated Spotify Web API client.
pub struct SpotifyClient {
    client: Client,
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct PlaylistMeta {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

impl SpotifyClient {
    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::Provider(e.to_string()))?;

        let response = Self::check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| AppError::Provider(e.to_string()))
    }

    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(classify_api_error(status.as_u16(), &body))
    }
}

/// Maps a failed Web API response to an error kind.
pub fn classify_api_error(status: u16, body: &str) -> AppError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .map(|parsed| parsed.error.message)
        .unwrap_or_else(|_| body.trim().to_string());

    if status == 400 && message.contains("Invalid base62 id") {
        return AppError::InvalidId(message);
    }
    if status == 401 {
        return AppError::Auth(message);
    }
    AppError::Provider(format!("{}: {}", status, message))
}

#[async_trait]
impl PlaylistProvider for SpotifyClient {
    async fn playlist_name(&self, playlist_id: &str) -> Result<String> {
        let url = format!("{}/playlists/{}", API_BASE, playlist_id);
        let meta: PlaylistMeta = self.get_json(&url, &[("fields", "name".to_string())]).await?;
        Ok(meta.name)
    }

    async fn tracks_page(&self, playlist_id: &str, offset: u32, limit: u32) -> Result<TracksPage> {
        let url = format!("{}/playlists/{}/tracks", API_BASE, playlist_id);
        log::debug!("Fetching tracks of {} (offset {}, limit {})", playlist_id, offset, limit);
        self.get_json(
            &url,
            &[
                ("offset", offset.to_string()),
                ("limit", limit.to_string()),
                ("fields", TRACK_FIELDS.to_string()),
            ],
        )
        .await
    }
}
