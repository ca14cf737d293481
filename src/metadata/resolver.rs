use crate::api::{Playlist, Track};
use crate::errors::Result;
use crate::metadata::PlaylistProvider;
use crate::security::InputValidator;

/// Largest page the catalog serves per request.
pub const PAGE_SIZE: u32 = 100;

/// Turns a playlist URL into the full, ordered track list.
pub struct PlaylistResolver<'a> {
    provider: &'a dyn PlaylistProvider,
}

impl<'a> PlaylistResolver<'a> {
    pub fn new(provider: &'a dyn PlaylistProvider) -> Self {
        Self { provider }
    }

    pub async fn resolve(&self, url: &str) -> Result<Playlist> {
        let playlist_id = InputValidator::new().playlist_id(url)?;
        self.resolve_id(&playlist_id).await
    }

    pub async fn resolve_id(&self, playlist_id: &str) -> Result<Playlist> {
        let name = self.provider.playlist_name(playlist_id).await?;

        let mut tracks = Vec::new();
        let mut offset = 0;

        // An empty page ends the listing; the reported total is not trusted.
        loop {
            let page = self.provider.tracks_page(playlist_id, offset, PAGE_SIZE).await?;
            if page.items.is_empty() {
                break;
            }

            let before = tracks.len();
            tracks.extend(page.items.into_iter().filter_map(|item| item.track).map(Track::from));
            log::debug!(
                "Page at offset {}: {} tracks kept (reported total {:?})",
                offset,
                tracks.len() - before,
                page.total
            );

            offset += PAGE_SIZE;
        }

        log::info!("Resolved playlist {} ({}): {} tracks", name, playlist_id, tracks.len());
        Ok(Playlist { name, tracks })
    }
}
