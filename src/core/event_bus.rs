//! Walk events and the channel plumbing that delivers them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::core::status::WalkTag;

/// Events emitted while a walk is live.
#[derive(Clone, Debug, Serialize)]
pub enum WalkEvent {
    /// Emitted after each processed item, and once more at fraction 1.0 just
    /// before the walk settles.
    ProgressUpdate {
        fraction: f64,
        processed: usize,
        total: usize,
        timestamp: DateTime<Utc>,
    },

    /// The walk visited every item and settled.
    WalkCompleted {
        walk_id: String,
        tag: WalkTag,
        timestamp: DateTime<Utc>,
    },

    /// Pre-flight validation rejected the walk before any step ran.
    WalkRejected {
        walk_id: String,
        reason: String,
        timestamp: DateTime<Utc>,
    },
}

/// Event sender half.
pub type EventSender = mpsc::UnboundedSender<WalkEvent>;

/// Event receiver half.
pub type EventReceiver = mpsc::UnboundedReceiver<WalkEvent>;

/// Create an event channel pair.
pub fn create_event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Sender wrapper for walk events, with an atomic active flag so that event
/// emission can be cheaply skipped when no listener is attached.
///
/// Holds up to two outlets: the internal collector feeding
/// [`WalkHandle::events`](crate::api::WalkHandle::events) and an optional
/// caller-supplied forwarding channel.
#[derive(Clone)]
pub struct EventEmitter {
    collector: Option<EventSender>,
    forward: Option<EventSender>,
    active: Arc<AtomicBool>,
}

impl EventEmitter {
    /// Create a new event emitter.
    pub fn new(
        collector: Option<EventSender>,
        forward: Option<EventSender>,
        active: Arc<AtomicBool>,
    ) -> Self {
        Self {
            collector,
            forward,
            active,
        }
    }

    #[inline(always)]
    pub(crate) fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    /// Emit an event to every attached outlet.
    pub fn emit(&self, event: WalkEvent) {
        if !self.is_active() {
            return;
        }
        if let Some(tx) = &self.forward {
            let _ = tx.send(event.clone());
        }
        if let Some(tx) = &self.collector {
            let _ = tx.send(event);
        }
    }
}
