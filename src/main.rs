mod api;
mod config;
mod downloader;
mod errors;
mod metadata;
mod security;
mod surface;
mod utils;

use api::DownloadForm;
use downloader::manager::{follow_session, DownloadManager, DownloadSettings, SessionOutcome};
use downloader::strategies::YtDlpDownloader;
use log::info;
use metadata::http_pool::HttpPool;
use metadata::SpotifyConnector;
use security::CredentialStore;
use std::sync::Arc;
use surface::terminal::{self, TerminalSurface};
use surface::ControlSurface;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration before the logger so its level can come from it
    let (config, config_error) = match config::AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (config::AppConfig::default(), Some(e)),
    };

    env_logger::Builder::new()
        .filter_level(config.log_filter())
        .parse_default_env()
        .init();

    info!("Starting playlist downloader");
    if let Some(e) = config_error {
        log::error!("Failed to load configuration: {}", e);
    }

    let store = match &config.credentials_path {
        Some(path) => CredentialStore::new(path.clone()),
        None => CredentialStore::beside_executable()?,
    };
    let mut saved = store.load();
    info!("Credentials file: {:?}", store.path());

    let mut surface = TerminalSurface::new();

    let downloader = YtDlpDownloader::from_config(&config);
    match downloader.probe().await {
        Ok(version) => info!("yt-dlp version {}", version),
        Err(e) => surface.on_log(&format!(
            "Warning: yt-dlp is not available, downloads will fail ({})",
            e.user_message()
        )),
    }

    let connector = SpotifyConnector::new(HttpPool::from_config(&config)?);
    let (events, mut receiver) = surface::event_channel();
    let manager = DownloadManager::new(
        Arc::new(connector),
        Arc::new(downloader),
        events,
        DownloadSettings::from_config(&config),
    );
    let cancel = manager.cancel_handle();

    let mut form = DownloadForm {
        client_id: saved.client_id.clone(),
        client_secret: saved.client_secret.clone(),
        playlist_url: String::new(),
        download_dir: config.download_path.to_string_lossy().into_owned(),
    };

    loop {
        let defaults = form.clone();
        let prompt = tokio::task::spawn_blocking(move || terminal::prompt_form(&defaults));

        // The signal handler replaces the default Ctrl+C exit, so the prompt honours it here.
        let answer = tokio::select! {
            answer = prompt => answer??,
            _ = tokio::signal::ctrl_c() => {
                println!();
                std::process::exit(130);
            }
        };
        let Some(next) = answer else {
            break;
        };
        form = next;

        store.save_if_changed(&mut saved, form.credentials());

        let session = manager.start(form.clone())?;
        let outcome = follow_session(session, &mut receiver, &mut surface, &cancel, tokio::signal::ctrl_c).await;
        match outcome {
            Some(SessionOutcome::Completed(summary)) => info!("Session completed: {:?}", summary),
            Some(SessionOutcome::Failed(e)) => info!("Session failed: {}", e),
            Some(SessionOutcome::Cancelled) | None => info!("Session cancelled"),
        }
    }

    info!("Exiting");
    Ok(())
}
