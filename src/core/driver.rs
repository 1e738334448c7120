//! The yielding driver — advances the walk one item per executor turn.
//!
//! The driver owns an explicit [`WalkState`] (`plan` + `collection` +
//! `cursor`) and a plain [`step`](WalkState::step) operation with no
//! scheduling inside it, so stepping is testable without a runtime. The
//! async [`drive`] loop decides what runs next: after every step it settles
//! the completion token for the item just processed, emits a progress
//! notification, and either hands control back to the scheduler or halts.
//!
//! Settlement of the walk itself lives in [`settle_when_tracked`]: it is
//! gated on the tracker reporting every token settled, not on the drive
//! loop exiting. A walk stopped early by its callback leaves tokens pending,
//! so that continuation never runs and the walk never settles.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tokio::sync::watch;

use crate::core::classify::{WalkKey, WalkPlan};
use crate::core::event_bus::{EventEmitter, WalkEvent};
use crate::core::scheduler::StepScheduler;
use crate::core::status::{WalkStatus, WalkTag};
use crate::core::tracker::CompletionTracker;

/// Control value returned by the per-item callback.
///
/// [`Stop`](WalkControl::Stop) is the only stop signal; it halts the walk
/// after the current item and leaves the walk's handle pending forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WalkControl {
    #[default]
    Continue,
    Stop,
}

/// Per-item callback: invoked once per item with the item's key (or index)
/// and a borrowed item value.
pub type WalkCallback = Box<dyn FnMut(&WalkKey, &Value) -> WalkControl + Send>;

/// Outcome of a single driver step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StepOutcome {
    /// More items remain and the callback did not signal stop.
    Continue,
    /// The callback stopped the walk, or the last item was just processed.
    Halt,
}

/// Mutable cursor state for one walk.
///
/// Owned exclusively by the driver task; the cursor only ever moves forward
/// and is never shared across walks.
pub(crate) struct WalkState {
    plan: WalkPlan,
    collection: Arc<Value>,
    cursor: usize,
}

impl WalkState {
    pub(crate) fn new(plan: WalkPlan, collection: Arc<Value>) -> Self {
        Self {
            plan,
            collection,
            cursor: 0,
        }
    }

    pub(crate) fn total(&self) -> usize {
        self.plan.total()
    }

    /// Items processed so far.
    pub(crate) fn processed(&self) -> usize {
        self.cursor
    }

    /// Invoke the callback on the cursor item and advance.
    ///
    /// Callers must not step past [`Halt`](StepOutcome::Halt). A panicking
    /// callback propagates out of this call untouched.
    pub(crate) fn step(&mut self, callback: &mut WalkCallback) -> StepOutcome {
        let key = self.plan.key_at(self.cursor);
        let value = self.plan.value_at(&self.collection, self.cursor);
        let control = callback(&key, value);
        self.cursor += 1;
        if control == WalkControl::Stop || self.cursor >= self.total() {
            StepOutcome::Halt
        } else {
            StepOutcome::Continue
        }
    }
}

/// Drive the walk to exhaustion or early stop.
///
/// Every step settles the token for the item it just processed and emits a
/// progress notification with `fraction = processed / total`, then either
/// yields to the runtime for the next turn or halts.
pub(crate) async fn drive(
    mut state: WalkState,
    mut callback: WalkCallback,
    tracker: Arc<CompletionTracker>,
    emitter: EventEmitter,
    scheduler: Arc<dyn StepScheduler>,
) {
    let total = state.total();
    loop {
        let outcome = state.step(&mut callback);
        let processed = state.processed();
        tracing::trace!(processed, total, "walk step");
        tracker.settle(processed - 1);
        emitter.emit(WalkEvent::ProgressUpdate {
            fraction: processed as f64 / total as f64,
            processed,
            total,
            timestamp: Utc::now(),
        });
        match outcome {
            StepOutcome::Halt => break,
            StepOutcome::Continue => scheduler.yield_turn().await,
        }
    }
}

/// Completion continuation: settle the walk once every token has settled.
///
/// Emits one final progress notification at fraction 1.0, a completion
/// event, and the terminal status carrying the original collection.
pub(crate) async fn settle_when_tracked(
    walk_id: String,
    collection: Arc<Value>,
    total: usize,
    tracker: Arc<CompletionTracker>,
    emitter: EventEmitter,
    status_tx: watch::Sender<WalkStatus>,
) {
    tracker.all_settled().await;
    emitter.emit(WalkEvent::ProgressUpdate {
        fraction: 1.0,
        processed: total,
        total,
        timestamp: Utc::now(),
    });
    emitter.emit(WalkEvent::WalkCompleted {
        walk_id: walk_id.clone(),
        tag: WalkTag::Done,
        timestamp: Utc::now(),
    });
    tracing::debug!(%walk_id, total, "walk completed");
    let _ = status_tx.send(WalkStatus::Completed {
        collection,
        tag: WalkTag::Done,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classify::classify;
    use crate::core::event_bus::create_event_channel;
    use crate::core::scheduler::FakeStepScheduler;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;
    use tokio::time::timeout;

    fn recording_callback(
        seen: Arc<Mutex<Vec<(WalkKey, Value)>>>,
        stop_after: Option<usize>,
    ) -> WalkCallback {
        Box::new(move |key, value| {
            let mut seen = seen.lock();
            seen.push((key.clone(), value.clone()));
            match stop_after {
                Some(n) if seen.len() >= n => WalkControl::Stop,
                _ => WalkControl::Continue,
            }
        })
    }

    fn live_emitter() -> (EventEmitter, crate::core::event_bus::EventReceiver) {
        let (tx, rx) = create_event_channel();
        (
            EventEmitter::new(Some(tx), None, Arc::new(AtomicBool::new(true))),
            rx,
        )
    }

    #[test]
    fn test_step_advances_in_index_order() {
        let collection = Arc::new(json!([10, 20, 30]));
        let mut state = WalkState::new(classify(&collection), collection);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut callback = recording_callback(seen.clone(), None);

        assert_eq!(state.step(&mut callback), StepOutcome::Continue);
        assert_eq!(state.step(&mut callback), StepOutcome::Continue);
        assert_eq!(state.step(&mut callback), StepOutcome::Halt);
        assert_eq!(state.processed(), 3);

        let seen = seen.lock();
        let keys: Vec<_> = seen.iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(
            keys,
            vec![WalkKey::Index(0), WalkKey::Index(1), WalkKey::Index(2)]
        );
        assert_eq!(seen[1].1, json!(20));
    }

    #[test]
    fn test_step_halts_on_stop_signal() {
        let collection = Arc::new(json!([1, 2, 3, 4, 5]));
        let mut state = WalkState::new(classify(&collection), collection);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut callback = recording_callback(seen.clone(), Some(1));

        assert_eq!(state.step(&mut callback), StepOutcome::Halt);
        assert_eq!(state.processed(), 1);
        assert_eq!(seen.lock().len(), 1);
    }

    #[test]
    fn test_step_keyed_mode() {
        let collection = Arc::new(json!({"a": 1, "b": 2}));
        let mut state = WalkState::new(classify(&collection), collection);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut callback = recording_callback(seen.clone(), None);

        assert_eq!(state.step(&mut callback), StepOutcome::Continue);
        assert_eq!(state.step(&mut callback), StepOutcome::Halt);

        let seen = seen.lock();
        assert_eq!(seen[0].0, WalkKey::Key("a".to_string()));
        assert_eq!(seen[1].0, WalkKey::Key("b".to_string()));
        assert_eq!(seen[1].1, json!(2));
    }

    #[tokio::test]
    async fn test_drive_settles_every_token_and_emits_progress() {
        let collection = Arc::new(json!(["x", "y", "z"]));
        let state = WalkState::new(classify(&collection), collection);
        let tracker = Arc::new(CompletionTracker::new(3));
        let (emitter, mut rx) = live_emitter();
        let scheduler = Arc::new(FakeStepScheduler::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        drive(
            state,
            recording_callback(seen.clone(), None),
            tracker.clone(),
            emitter,
            scheduler.clone(),
        )
        .await;

        assert_eq!(tracker.pending(), 0);
        assert_eq!(seen.lock().len(), 3);
        // yields only happen between items, never after the last one
        assert_eq!(scheduler.yield_count(), 2);

        for expected in 1..=3usize {
            match rx.recv().await.unwrap() {
                WalkEvent::ProgressUpdate {
                    processed, total, ..
                } => {
                    assert_eq!(processed, expected);
                    assert_eq!(total, 3);
                }
                other => panic!("Unexpected event {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_drive_early_stop_leaves_tokens_pending() {
        let collection = Arc::new(json!([1, 2, 3, 4, 5]));
        let state = WalkState::new(classify(&collection), collection);
        let tracker = Arc::new(CompletionTracker::new(5));
        let (emitter, _rx) = live_emitter();
        let seen = Arc::new(Mutex::new(Vec::new()));

        drive(
            state,
            recording_callback(seen.clone(), Some(3)),
            tracker.clone(),
            emitter,
            Arc::new(FakeStepScheduler::new()),
        )
        .await;

        assert_eq!(seen.lock().len(), 3);
        assert_eq!(tracker.pending(), 2);
    }

    #[tokio::test]
    async fn test_settle_when_tracked_resolves_status() {
        let collection = Arc::new(json!([1]));
        let tracker = Arc::new(CompletionTracker::new(1));
        let (emitter, mut rx) = live_emitter();
        let (status_tx, status_rx) = watch::channel(WalkStatus::Running);

        tracker.settle(0);
        settle_when_tracked(
            "walk-test".to_string(),
            collection,
            1,
            tracker,
            emitter,
            status_tx,
        )
        .await;

        assert!(matches!(
            &*status_rx.borrow(),
            WalkStatus::Completed {
                tag: WalkTag::Done,
                ..
            }
        ));
        match rx.recv().await.unwrap() {
            WalkEvent::ProgressUpdate {
                fraction,
                processed,
                ..
            } => {
                assert!((fraction - 1.0).abs() < f64::EPSILON);
                assert_eq!(processed, 1);
            }
            other => panic!("Unexpected event {other:?}"),
        }
        assert!(matches!(
            rx.recv().await.unwrap(),
            WalkEvent::WalkCompleted {
                tag: WalkTag::Done,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_settle_when_tracked_pends_while_token_pends() {
        let collection = Arc::new(json!([1, 2]));
        let tracker = Arc::new(CompletionTracker::new(2));
        let (emitter, _rx) = live_emitter();
        let (status_tx, status_rx) = watch::channel(WalkStatus::Running);

        tracker.settle(0);
        let settled = timeout(
            Duration::from_millis(50),
            settle_when_tracked(
                "walk-test".to_string(),
                collection,
                2,
                tracker,
                emitter,
                status_tx,
            ),
        )
        .await;
        assert!(settled.is_err());
        assert!(matches!(&*status_rx.borrow(), WalkStatus::Running));
    }

    #[test]
    fn test_walk_control_default_continues() {
        assert_eq!(WalkControl::default(), WalkControl::Continue);
    }
}
