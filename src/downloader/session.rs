use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

const IDLE: u64 = 0;

/// The single shared word between foreground and worker: the id of the active
/// session, or zero when idle. Cancelling clears it, so a worker notices by
/// comparing against its own id and a stale worker never sees a newer session
/// as its own.
#[derive(Clone, Default)]
pub struct SessionGate {
    active: Arc<AtomicU64>,
    next_id: Arc<AtomicU64>,
}

impl SessionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the gate for a new session, or `None` while one is active.
    pub fn try_open(&self) -> Option<u64> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.active
            .compare_exchange(IDLE, id, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| id)
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire) != IDLE
    }

    pub fn is_current(&self, id: u64) -> bool {
        self.active.load(Ordering::Acquire) == id
    }

    /// Worker-side release. False if the session was already cancelled.
    pub fn close(&self, id: u64) -> bool {
        self.active
            .compare_exchange(id, IDLE, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Foreground-side cancel. False if nothing was running.
    pub fn cancel(&self) -> bool {
        self.active.swap(IDLE, Ordering::AcqRel) != IDLE
    }
}

/// Worker-owned state of one run.
#[derive(Debug, Clone)]
pub struct DownloadSession {
    pub label: String,
    pub current_index: usize,
    pub total: usize,
    pub destination_dir: PathBuf,
    pub started_at: DateTime<Utc>,
}

impl DownloadSession {
    pub fn new(destination_dir: PathBuf, total: usize) -> Self {
        Self {
            label: crate::utils::generate_session_id(),
            current_index: 0,
            total,
            destination_dir,
            started_at: Utc::now(),
        }
    }

    /// Moves to the next track and returns its 1-based index.
    pub fn advance(&mut self) -> usize {
        self.current_index = (self.current_index + 1).min(self.total);
        self.current_index
    }

    pub fn elapsed_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}
