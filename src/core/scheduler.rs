//! The injected yield capability separating consecutive walk steps.
//!
//! Suspension is cooperative, not true coroutine suspension: each driver
//! step completes and the next one runs on a later executor turn. The
//! scheduler is injected so tests can drive walks deterministically.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

/// Capability that parks the driver between items so other runtime work can
/// interleave. The next step always runs on a later executor turn, never
/// synchronously nested inside the previous one.
#[async_trait]
pub trait StepScheduler: Send + Sync {
    /// Return control to the runtime until the next available turn.
    async fn yield_turn(&self);
}

/// Real scheduler: defers the next step with a minimum-delay timer.
#[derive(Default)]
pub struct TimerStepScheduler;

impl TimerStepScheduler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StepScheduler for TimerStepScheduler {
    async fn yield_turn(&self) {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
}

/// Deterministic test scheduler: yields to the executor without a timer and
/// counts how many turns it handed back.
#[derive(Default)]
pub struct FakeStepScheduler {
    yields: AtomicUsize,
}

impl FakeStepScheduler {
    pub fn new() -> Self {
        Self {
            yields: AtomicUsize::new(0),
        }
    }

    /// Number of yields taken so far.
    pub fn yield_count(&self) -> usize {
        self.yields.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StepScheduler for FakeStepScheduler {
    async fn yield_turn(&self) {
        self.yields.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
    }
}
