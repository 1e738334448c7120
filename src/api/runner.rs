//! High-level walk runner and builder.
//!
//! [`WalkRunner`] (constructed via [`WalkRunnerBuilder`]) is the main entry
//! point for walking a collection. It classifies the input, validates it,
//! allocates the completion tokens, and wires the driver and settlement
//! tasks to the handle's status and event channels. [`walk`] is argument
//! sugar over the builder with default configuration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tokio::sync::watch;

use crate::api::handle::WalkHandle;
use crate::core::classify::{classify, WalkKey};
use crate::core::driver::{self, WalkCallback, WalkControl, WalkState};
use crate::core::event_bus::{create_event_channel, EventEmitter, EventSender, WalkEvent};
use crate::core::scheduler::{StepScheduler, TimerStepScheduler};
use crate::core::status::WalkStatus;
use crate::core::tracker::CompletionTracker;
use crate::error::WalkError;

/// Walk a collection, invoking `callback` once per item with an explicit
/// yield back to the runtime between items.
///
/// Argument sugar over [`WalkRunner::builder`] with default configuration.
pub fn walk<F>(collection: Value, callback: F) -> WalkHandle
where
    F: FnMut(&WalkKey, &Value) -> WalkControl + Send + 'static,
{
    WalkRunner::builder(collection).callback(callback).run()
}

/// Walk runner with builder-based configuration.
///
/// Use [`WalkRunner::builder(collection)`](Self::builder) to obtain a
/// [`WalkRunnerBuilder`].
pub struct WalkRunner;

impl WalkRunner {
    /// Create a new builder for walking `collection`.
    pub fn builder(collection: Value) -> WalkRunnerBuilder {
        WalkRunnerBuilder {
            collection,
            callback: None,
            collect_events: true,
            event_tx: None,
            scheduler: Arc::new(TimerStepScheduler::new()),
        }
    }
}

/// Builder for configuring and launching a walk.
pub struct WalkRunnerBuilder {
    collection: Value,
    callback: Option<WalkCallback>,
    collect_events: bool,
    event_tx: Option<EventSender>,
    scheduler: Arc<dyn StepScheduler>,
}

impl WalkRunnerBuilder {
    /// Set the per-item callback.
    pub fn callback<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&WalkKey, &Value) -> WalkControl + Send + 'static,
    {
        self.callback = Some(Box::new(callback));
        self
    }

    /// Enable or disable in-memory event collection (default on).
    pub fn collect_events(mut self, collect: bool) -> Self {
        self.collect_events = collect;
        self
    }

    /// Forward walk events to an external channel in addition to (or instead
    /// of) in-memory collection.
    pub fn event_channel(mut self, tx: EventSender) -> Self {
        self.event_tx = Some(tx);
        self
    }

    /// Inject the scheduler that separates consecutive steps.
    pub fn scheduler(mut self, scheduler: Arc<dyn StepScheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Launch the walk, returning a [`WalkHandle`].
    ///
    /// Validation failures are not returned here: they reject the handle
    /// immediately, before any token is created or step runs. Must be called
    /// within a tokio runtime.
    pub fn run(self) -> WalkHandle {
        let walk_id = uuid::Uuid::new_v4().to_string();
        let collection = Arc::new(self.collection);
        let plan = classify(&collection);
        let total = plan.total();

        let (status_tx, status_rx) = watch::channel(WalkStatus::Running);
        let events_active = Arc::new(AtomicBool::new(
            self.collect_events || self.event_tx.is_some(),
        ));

        let (collector_tx, events) = if self.collect_events {
            let (tx, mut rx) = create_event_channel();
            let store = Arc::new(tokio::sync::Mutex::new(Vec::new()));
            let task_store = store.clone();
            let task_active = events_active.clone();
            tokio::spawn(async move {
                while let Some(event) = rx.recv().await {
                    task_store.lock().await.push(event);
                }
                task_active.store(false, Ordering::Relaxed);
            });
            (Some(tx), Some(store))
        } else {
            (None, None)
        };

        let emitter = EventEmitter::new(collector_tx, self.event_tx, events_active.clone());
        let handle = WalkHandle::new(status_rx, events, events_active);

        let callback = match self.callback {
            Some(callback) => callback,
            None => {
                reject(&walk_id, collection, WalkError::InvalidCallback, &emitter, &status_tx);
                return handle;
            }
        };
        if total == 0 {
            reject(&walk_id, collection, WalkError::EmptyCollection, &emitter, &status_tx);
            return handle;
        }

        tracing::debug!(%walk_id, mode = plan.mode(), total, "walk started");
        let tracker = Arc::new(CompletionTracker::new(total));
        let state = WalkState::new(plan, collection.clone());

        tokio::spawn(driver::drive(
            state,
            callback,
            tracker.clone(),
            emitter.clone(),
            self.scheduler,
        ));
        tokio::spawn(driver::settle_when_tracked(
            walk_id, collection, total, tracker, emitter, status_tx,
        ));

        handle
    }
}

fn reject(
    walk_id: &str,
    collection: Arc<Value>,
    reason: WalkError,
    emitter: &EventEmitter,
    status_tx: &watch::Sender<WalkStatus>,
) {
    tracing::warn!(walk_id, %reason, "walk rejected before start");
    emitter.emit(WalkEvent::WalkRejected {
        walk_id: walk_id.to_string(),
        reason: reason.to_string(),
        timestamp: Utc::now(),
    });
    let _ = status_tx.send(WalkStatus::Rejected { collection, reason });
}
