use serde::{Deserialize, Serialize};

/// A playlist entry that resolved to a real catalog track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub title: String,
    pub artist_names: Vec<String>,
    pub search_query: String,
}

impl Track {
    pub fn new(title: impl Into<String>, artist_names: Vec<String>) -> Self {
        let title = title.into();
        let search_query = format!("{} {}", title, artist_names.join(", "));
        Self {
            title,
            artist_names,
            search_query,
        }
    }

    pub fn file_base_name(&self) -> String {
        crate::utils::track_file_base_name(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub name: String,
    pub tracks: Vec<Track>,
}

/// Credentials for the catalog API, persisted as `{"client_id", "client_secret"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
}

/// Snapshot of the form fields taken when a run starts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadForm {
    pub client_id: String,
    pub client_secret: String,
    pub playlist_url: String,
    pub download_dir: String,
}

impl DownloadForm {
    pub fn trimmed(&self) -> Self {
        Self {
            client_id: self.client_id.trim().to_string(),
            client_secret: self.client_secret.trim().to_string(),
            playlist_url: self.playlist_url.trim().to_string(),
            download_dir: self.download_dir.trim().to_string(),
        }
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            client_id: self.client_id.trim().to_string(),
            client_secret: self.client_secret.trim().to_string(),
        }
    }
}

// Wire shapes of the catalog's playlist track listing.

#[derive(Debug, Clone, Deserialize)]
pub struct TracksPage {
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
    /// Reported by the provider, never trusted for termination.
    #[serde(default)]
    pub total: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistItem {
    #[serde(default)]
    pub track: Option<CatalogTrack>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogTrack {
    pub name: String,
    #[serde(default)]
    pub artists: Vec<CatalogArtist>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogArtist {
    pub name: String,
}

impl From<CatalogTrack> for Track {
    fn from(track: CatalogTrack) -> Self {
        let artists = track.artists.into_iter().map(|artist| artist.name).collect();
        Track::new(track.name, artists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_query_is_title_then_joined_artists() {
        let track = Track::new("Song B", vec!["Artist Y".to_string(), "Artist Z".to_string()]);
        assert_eq!(track.search_query, "Song B Artist Y, Artist Z");
    }

    #[test]
    fn test_page_with_removed_track_parses() {
        let body = r#"{
            "items": [
                {"track": {"name": "One", "artists": [{"name": "A"}]}},
                {"track": null},
                {"track": {"name": "Three", "artists": [{"name": "B"}, {"name": "C"}]}}
            ],
            "total": 3
        }"#;

        let page: TracksPage = serde_json::from_str(body).unwrap();

        assert_eq!(page.items.len(), 3);
        assert!(page.items[1].track.is_none());
        let third: Track = page.items[2].track.clone().unwrap().into();
        assert_eq!(third.artist_names, vec!["B", "C"]);
    }

    #[test]
    fn test_form_credentials_are_trimmed() {
        let form = DownloadForm {
            client_id: "  id ".to_string(),
            client_secret: "secret\n".to_string(),
            ..DownloadForm::default()
        };
        assert_eq!(
            form.credentials(),
            Credentials {
                client_id: "id".to_string(),
                client_secret: "secret".to_string(),
            }
        );
    }
}
