use std::path::Path;
use crate::api::Track;
use crate::errors::{AppError, Result};
use log::info;

/// Folder used when a playlist name sanitizes to nothing usable.
pub const UNTITLED_PLAYLIST: &str = "Untitled playlist";

/// Sanitizes a filename by deleting filesystem-reserved characters
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*'))
        .collect()
}

/// Destination folder name for a playlist; never empty, `.` or `..`
pub fn playlist_folder_name(name: &str) -> String {
    let sanitized = sanitize_filename(name);
    if sanitized.trim().chars().all(|c| c == '.') {
        return UNTITLED_PLAYLIST.to_string();
    }
    sanitized
}

/// File base name in "Artists - Title" format, without extension
pub fn track_file_base_name(track: &Track) -> String {
    sanitize_filename(&format!("{} - {}", track.artist_names.join(", "), track.title))
}

/// Creates a directory and its parents if they don't exist
pub async fn ensure_dir_exists(path: &Path) -> Result<()> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|source| AppError::Filesystem {
            path: path.to_path_buf(),
            source,
        })?;
    info!("Ensured directory: {:?}", path);
    Ok(())
}

/// Generates a unique ID for a download session
pub fn generate_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Quotes a value for yt-dlp's shell-style argument splitting
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
