use crate::config::AppConfig;
use crate::downloader::{AcquisitionRequest, Downloader, OUTPUT_EXTENSION};
use crate::errors::{AppError, Result};
use crate::utils::shell_quote;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

/// Finds the top YouTube match for a query and transcodes it with yt-dlp + ffmpeg.
pub struct YtDlpDownloader {
    ytdlp_path: String,
    ffmpeg_path: Option<String>,
    proxy: Option<String>,
}

impl YtDlpDownloader {
    pub fn new(ytdlp_path: impl Into<String>) -> Self {
        Self {
            ytdlp_path: ytdlp_path.into(),
            ffmpeg_path: None,
            proxy: None,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let mut downloader = Self::new(config.ytdlp_path.clone());
        downloader.ffmpeg_path = config.ffmpeg_path.clone();
        downloader.proxy = config.proxy.clone();
        downloader
    }

    /// Returns the tool's version, or an error when it cannot be run.
    pub async fn probe(&self) -> Result<String> {
        let output = Command::new(&self.ytdlp_path)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| AppError::Acquisition(format!("cannot run {}: {}", self.ytdlp_path, e)))?;

        if !output.status.success() {
            return Err(AppError::Acquisition(format!(
                "{} --version exited with {}",
                self.ytdlp_path, output.status
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    pub fn build_args(&self, request: &AcquisitionRequest) -> Vec<String> {
        let mut args = vec![
            "--format".to_string(),
            "bestaudio/best".to_string(),
            "--no-playlist".to_string(),
            "--quiet".to_string(),
            "--no-warnings".to_string(),
            "--extract-audio".to_string(),
            "--audio-format".to_string(),
            OUTPUT_EXTENSION.to_string(),
            "--audio-quality".to_string(),
            format!("{}K", request.bitrate_kbps),
            "--postprocessor-args".to_string(),
            format!("ffmpeg:-metadata title={}", shell_quote(&request.file_base_name)),
            "--output".to_string(),
            request.output_template().to_string_lossy().into_owned(),
        ];

        if let Some(ffmpeg) = &self.ffmpeg_path {
            args.push("--ffmpeg-location".to_string());
            args.push(ffmpeg.clone());
        }
        if let Some(proxy) = &self.proxy {
            args.push("--proxy".to_string());
            args.push(proxy.clone());
        }

        args.push(format!("ytsearch1:{}", request.search_query));
        args
    }
}

#[async_trait]
impl Downloader for YtDlpDownloader {
    async fn fetch_and_transcode(&self, request: &AcquisitionRequest) -> Result<()> {
        let start_time = std::time::Instant::now();
        log::info!("Searching and downloading: {}", request.search_query);
        log::debug!("Output template: {:?}", request.output_template());

        let mut command = Command::new(&self.ytdlp_path);
        command
            .args(self.build_args(request))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        // Own process group: Ctrl+C cancels the session, not the track in flight.
        #[cfg(unix)]
        command.process_group(0);

        let output = command
            .output()
            .await
            .map_err(|e| AppError::Acquisition(format!("failed to start {}: {}", self.ytdlp_path, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::Acquisition(format!(
                "{} exited with {}: {}",
                self.ytdlp_path,
                output.status,
                stderr.trim()
            )));
        }

        log::info!(
            "Downloaded {} (took {:.2} seconds)",
            request.file_base_name,
            start_time.elapsed().as_secs_f64()
        );
        Ok(())
    }
}
