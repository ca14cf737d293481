pub mod http_pool;
pub mod providers;
pub mod resolver;

use crate::api::{Credentials, TracksPage};
use crate::errors::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Establishes an authenticated catalog client.
#[async_trait]
pub trait CatalogConnector: Send + Sync {
    /// Fails with `AppError::Auth` when the credentials are rejected.
    async fn connect(&self, credentials: &Credentials) -> Result<Arc<dyn PlaylistProvider>>;
}

/// Read-only access to a catalog's playlists.
#[async_trait]
pub trait PlaylistProvider: Send + Sync {
    async fn playlist_name(&self, playlist_id: &str) -> Result<String>;
    async fn tracks_page(&self, playlist_id: &str, offset: u32, limit: u32) -> Result<TracksPage>;
}

pub use providers::SpotifyConnector;
pub use resolver::PlaylistResolver;
