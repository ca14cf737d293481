use crate::api::{DownloadForm, Track};
use crate::config::AppConfig;
use crate::downloader::session::{DownloadSession, SessionGate};
use crate::downloader::{AcquisitionRequest, Downloader, OUTPUT_EXTENSION};
use crate::errors::{AppError, Result};
use crate::metadata::{CatalogConnector, PlaylistResolver};
use crate::security::InputValidator;
use crate::surface::{ControlSurface, EventReceiver, EventSender};
use crate::utils::{ensure_dir_exists, playlist_folder_name};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy)]
pub struct DownloadSettings {
    pub bitrate_kbps: u32,
    /// Sleep after each successful download.
    pub pause_after_download: Duration,
}

impl DownloadSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            bitrate_kbps: config.get_quality_bitrate(),
            pause_after_download: config.pause_after_download(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug)]
pub enum SessionOutcome {
    Completed(SessionSummary),
    Cancelled,
    Failed(AppError),
}

/// Foreground-side cancel action.
#[derive(Clone)]
pub struct CancelHandle {
    gate: SessionGate,
    events: EventSender,
}

impl CancelHandle {
    /// Stops the running session at its next check point. Returns false when idle.
    pub fn cancel(&self) -> bool {
        if !self.gate.cancel() {
            return false;
        }
        self.events.log("Download cancelled by user.");
        self.events.clear_progress();
        self.events.set_controls(true, false);
        true
    }
}

/// Runs at most one playlist download session at a time on a background task.
pub struct DownloadManager {
    connector: Arc<dyn CatalogConnector>,
    downloader: Arc<dyn Downloader>,
    events: EventSender,
    gate: SessionGate,
    settings: DownloadSettings,
}

impl DownloadManager {
    pub fn new(
        connector: Arc<dyn CatalogConnector>,
        downloader: Arc<dyn Downloader>,
        events: EventSender,
        settings: DownloadSettings,
    ) -> Self {
        Self {
            connector,
            downloader,
            events,
            gate: SessionGate::new(),
            settings,
        }
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.gate.is_active()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            gate: self.gate.clone(),
            events: self.events.clone(),
        }
    }

    #[cfg(test)]
    pub fn cancel(&self) -> bool {
        self.cancel_handle().cancel()
    }

    /// Starts a session for the given form snapshot on a new worker task.
    pub fn start(&self, form: DownloadForm) -> Result<JoinHandle<SessionOutcome>> {
        let id = self.gate.try_open().ok_or(AppError::SessionActive)?;
        self.events.set_controls(false, true);

        let worker = SessionWorker {
            id,
            gate: self.gate.clone(),
            connector: self.connector.clone(),
            downloader: self.downloader.clone(),
            events: self.events.clone(),
            settings: self.settings,
        };
        Ok(tokio::spawn(worker.run(form)))
    }
}

struct SessionWorker {
    id: u64,
    gate: SessionGate,
    connector: Arc<dyn CatalogConnector>,
    downloader: Arc<dyn Downloader>,
    events: EventSender,
    settings: DownloadSettings,
}

impl SessionWorker {
    async fn run(self, form: DownloadForm) -> SessionOutcome {
        let outcome = match self.execute(form.trimmed()).await {
            Ok(Some(summary)) => SessionOutcome::Completed(summary),
            Ok(None) => SessionOutcome::Cancelled,
            Err(e) => SessionOutcome::Failed(e),
        };
        self.finish(&outcome);
        outcome
    }

    fn cancelled(&self) -> bool {
        !self.gate.is_current(self.id)
    }

    /// `Ok(None)` means the session was cancelled.
    async fn execute(&self, form: DownloadForm) -> Result<Option<SessionSummary>> {
        if self.cancelled() {
            return Ok(None);
        }

        InputValidator::new().validate_form(&form)?;

        self.events.log("Connecting to Spotify...");
        let provider = self.connector.connect(&form.credentials()).await?;
        if self.cancelled() {
            return Ok(None);
        }
        self.events.log("Connected to Spotify!");

        let playlist = PlaylistResolver::new(provider.as_ref())
            .resolve(&form.playlist_url)
            .await?;
        if self.cancelled() {
            return Ok(None);
        }
        self.events.log(format!(
            "Playlist: {} ({} tracks)",
            playlist.name,
            playlist.tracks.len()
        ));

        let root = if form.download_dir.is_empty() {
            PathBuf::from(".")
        } else {
            PathBuf::from(&form.download_dir)
        };
        let destination = root.join(playlist_folder_name(&playlist.name));
        ensure_dir_exists(&destination).await?;

        let mut session = DownloadSession::new(destination, playlist.tracks.len());
        log::info!(
            "Session {} started: {} tracks into {:?}",
            session.label,
            session.total,
            session.destination_dir
        );
        self.download_tracks(&mut session, &playlist.tracks).await
    }

    async fn download_tracks(
        &self,
        session: &mut DownloadSession,
        tracks: &[Track],
    ) -> Result<Option<SessionSummary>> {
        let mut summary = SessionSummary::default();

        for track in tracks {
            if self.cancelled() {
                return Ok(None);
            }

            let index = session.advance();
            let file_base_name = track.file_base_name();
            self.events.progress(index, session.total, &track.title);
            self.events.log(format!(
                "[{}/{}] Downloading: {}...",
                index, session.total, file_base_name
            ));

            let request = AcquisitionRequest {
                search_query: track.search_query.clone(),
                destination_dir: session.destination_dir.clone(),
                file_base_name,
                bitrate_kbps: self.settings.bitrate_kbps,
            };

            if tokio::fs::try_exists(request.output_path()).await.unwrap_or(false) {
                self.events.log(format!(
                    "Already exists: {}.{}",
                    request.file_base_name, OUTPUT_EXTENSION
                ));
                summary.skipped += 1;
                continue;
            }

            let fetched = self.downloader.fetch_and_transcode(&request).await;
            // A cancelled worker may outlive its session; it reports nothing further.
            if self.cancelled() {
                return Ok(None);
            }

            match fetched {
                Ok(()) => {
                    summary.downloaded += 1;
                    self.events.log("Download complete!");
                    tokio::time::sleep(self.settings.pause_after_download).await;
                }
                Err(e) => {
                    summary.failed += 1;
                    log::warn!(
                        "Session {}: no audio for '{}': {}",
                        session.label,
                        request.search_query,
                        e
                    );
                }
            }

            if self.cancelled() {
                return Ok(None);
            }
        }

        log::info!(
            "Session {} done in {}s: {:?}",
            session.label,
            session.elapsed_secs(),
            summary
        );
        Ok(Some(summary))
    }

    fn finish(&self, outcome: &SessionOutcome) {
        let message = match outcome {
            // The cancel action already reported and released the gate.
            SessionOutcome::Cancelled => return,
            SessionOutcome::Completed(summary) => format!(
                "Downloads finished! ({} downloaded, {} skipped, {} failed)",
                summary.downloaded, summary.skipped, summary.failed
            ),
            SessionOutcome::Failed(e) => {
                log::error!("Session aborted: {}", e);
                e.user_message()
            }
        };

        if !self.gate.close(self.id) {
            return;
        }
        self.events.log(message);
        self.events.clear_progress();
        self.events.set_controls(true, false);
    }
}

/// Applies worker events to the surface until the session ends or `interrupt`
/// cancels it. A cancelled worker is left to wind down on its own; `None` then
/// means control is back with the foreground.
pub async fn follow_session<F, Fut>(
    mut session: JoinHandle<SessionOutcome>,
    receiver: &mut EventReceiver,
    surface: &mut dyn ControlSurface,
    cancel: &CancelHandle,
    mut interrupt: F,
) -> Option<SessionOutcome>
where
    F: FnMut() -> Fut,
    Fut: Future,
{
    let outcome = loop {
        tokio::select! {
            Some(event) = receiver.recv() => crate::surface::apply(surface, &event),
            _ = interrupt() => {
                if cancel.cancel() {
                    break None;
                }
            }
            joined = &mut session => {
                break match joined {
                    Ok(outcome) => Some(outcome),
                    Err(e) => {
                        log::error!("Session worker stopped unexpectedly: {}", e);
                        None
                    }
                };
            }
        }
    };

    receiver.drain_into(surface);
    outcome
}
