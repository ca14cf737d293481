//! Bridge between the background worker and whatever renders the form.
//!
//! The worker never touches visible state. It posts [`SurfaceEvent`]s through an
//! [`EventSender`]; the foreground owns the [`EventReceiver`] and applies each
//! event to its [`ControlSurface`] on its own task.

pub mod terminal;

use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub current: usize,
    pub total: usize,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    Log(String),
    /// `None` clears the progress display.
    Progress(Option<ProgressUpdate>),
    Controls {
        download_enabled: bool,
        cancel_enabled: bool,
    },
}

/// Passive presentation layer. Called only from the foreground.
pub trait ControlSurface {
    /// Appends a line and keeps the view pinned to the newest one.
    fn on_log(&mut self, message: &str);
    fn on_progress(&mut self, progress: Option<&ProgressUpdate>);
    fn on_controls_changed(&mut self, download_enabled: bool, cancel_enabled: bool);
}

pub fn event_channel() -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { tx }, EventReceiver { rx })
}

/// Worker-side handle; safe to use from any task or thread.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<SurfaceEvent>,
}

impl EventSender {
    fn send(&self, event: SurfaceEvent) {
        // A closed receiver means the foreground is gone; nothing left to show.
        if self.tx.send(event).is_err() {
            log::debug!("Surface closed, dropping event");
        }
    }

    pub fn log(&self, message: impl Into<String>) {
        self.send(SurfaceEvent::Log(message.into()));
    }

    pub fn progress(&self, current: usize, total: usize, label: impl Into<String>) {
        self.send(SurfaceEvent::Progress(Some(ProgressUpdate {
            current,
            total,
            label: label.into(),
        })));
    }

    pub fn clear_progress(&self) {
        self.send(SurfaceEvent::Progress(None));
    }

    pub fn set_controls(&self, download_enabled: bool, cancel_enabled: bool) {
        self.send(SurfaceEvent::Controls {
            download_enabled,
            cancel_enabled,
        });
    }
}

pub struct EventReceiver {
    rx: mpsc::UnboundedReceiver<SurfaceEvent>,
}

impl EventReceiver {
    pub async fn recv(&mut self) -> Option<SurfaceEvent> {
        self.rx.recv().await
    }

    /// Applies everything already queued without waiting.
    pub fn drain_into(&mut self, surface: &mut dyn ControlSurface) {
        while let Ok(event) = self.rx.try_recv() {
            apply(surface, &event);
        }
    }

    #[cfg(test)]
    pub fn try_collect(&mut self) -> Vec<SurfaceEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}

pub fn apply(surface: &mut dyn ControlSurface, event: &SurfaceEvent) {
    match event {
        SurfaceEvent::Log(message) => surface.on_log(message),
        SurfaceEvent::Progress(progress) => surface.on_progress(progress.as_ref()),
        SurfaceEvent::Controls {
            download_enabled,
            cancel_enabled,
        } => surface.on_controls_changed(*download_enabled, *cancel_enabled),
    }
}
