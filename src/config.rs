use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use crate::errors::Result;

const ENV_PREFIX: &str = "PLAYLIST_DL";

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub download_path: PathBuf,
    /// Overrides the `credentials.json` kept beside the executable.
    pub credentials_path: Option<PathBuf>,
    pub audio_quality: AudioQuality,
    pub ytdlp_path: String,
    pub ffmpeg_path: Option<String>,
    pub proxy: Option<String>,
    pub request_timeout_secs: u64,
    pub pause_after_download_ms: u64,
    pub log_level: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AudioQuality {
    Low,    // 128 kbps
    Medium, // 192 kbps
    High,   // 256 kbps
    Best,   // 320 kbps
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            download_path: PathBuf::from("downloaded_music"),
            credentials_path: None,
            audio_quality: AudioQuality::Medium,
            ytdlp_path: "yt-dlp".to_string(),
            ffmpeg_path: None,
            proxy: None,
            request_timeout_secs: 30,
            pause_after_download_ms: 1000,
            log_level: "warn".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads defaults, then the user config file (if any), then `PLAYLIST_DL_*` variables.
    pub fn load() -> Result<Self> {
        Self::load_from(Self::get_config_path().as_deref())
    }

    pub fn load_from(config_file: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = config_file {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("playlist-downloader").join("config.toml"))
    }

    pub fn get_quality_bitrate(&self) -> u32 {
        match self.audio_quality {
            AudioQuality::Low => 128,
            AudioQuality::Medium => 192,
            AudioQuality::High => 256,
            AudioQuality::Best => 320,
        }
    }

    pub fn pause_after_download(&self) -> Duration {
        Duration::from_millis(self.pause_after_download_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn log_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Warn)
    }
}
