//! Walk handle shared by the builder and convenience entry points.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, Mutex};

use crate::core::event_bus::WalkEvent;
use crate::core::status::WalkStatus;

/// Handle to a running or settled walk.
///
/// Allows polling [`status()`](Self::status), blocking on settlement via
/// [`wait()`](Self::wait), and retrieving collected walk events.
pub struct WalkHandle {
    status_rx: watch::Receiver<WalkStatus>,
    events: Option<Arc<Mutex<Vec<WalkEvent>>>>,
    events_active: Arc<AtomicBool>,
}

impl WalkHandle {
    pub(crate) fn new(
        status_rx: watch::Receiver<WalkStatus>,
        events: Option<Arc<Mutex<Vec<WalkEvent>>>>,
        events_active: Arc<AtomicBool>,
    ) -> Self {
        Self {
            status_rx,
            events,
            events_active,
        }
    }

    /// Return the current walk status (non-blocking).
    pub async fn status(&self) -> WalkStatus {
        self.status_rx.borrow().clone()
    }

    /// Return a snapshot of all collected walk events so far.
    pub async fn events(&self) -> Vec<WalkEvent> {
        match &self.events {
            Some(events) => events.lock().await.clone(),
            None => Vec::new(),
        }
    }

    /// Block until the walk settles.
    ///
    /// Observers arriving after settlement get the terminal status
    /// immediately; no progress notifications are replayed. A walk stopped
    /// early by its callback never settles — pair this with
    /// [`tokio::time::timeout`] when that outcome is possible.
    pub async fn wait(&self) -> WalkStatus {
        let mut rx = self.status_rx.clone();
        loop {
            let status = rx.borrow().clone();
            match status {
                WalkStatus::Running => {
                    if rx.changed().await.is_err() {
                        return rx.borrow().clone();
                    }
                }
                _ => return status,
            }
        }
    }

    /// Whether event collection is still active.
    pub fn events_active(&self) -> bool {
        self.events_active.load(Ordering::Relaxed)
    }
}
