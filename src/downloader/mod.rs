pub mod manager;
pub mod session;
pub mod strategies;


use crate::errors::Result;
use std::path::PathBuf;

pub const OUTPUT_EXTENSION: &str = "mp3";

/// One search-download-transcode job handed to the acquisition tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquisitionRequest {
    pub search_query: String,
    pub destination_dir: PathBuf,
    pub file_base_name: String,
    pub bitrate_kbps: u32,
}

impl AcquisitionRequest {
    /// Path the finished file ends up at.
    pub fn output_path(&self) -> PathBuf {
        self.destination_dir
            .join(format!("{}.{}", self.file_base_name, OUTPUT_EXTENSION))
    }

    /// yt-dlp output template; the tool fills in the extension.
    pub fn output_template(&self) -> PathBuf {
        self.destination_dir
            .join(format!("{}.%(ext)s", self.file_base_name))
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Downloader: Send + Sync {
    /// Single best-effort attempt; no retries.
    async fn fetch_and_transcode(&self, request: &AcquisitionRequest) -> Result<()>;
}
