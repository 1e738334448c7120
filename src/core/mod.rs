//! Core walk engine: classification, completion tracking, the yielding
//! driver, and event plumbing.

pub mod classify;
pub mod driver;
pub mod event_bus;
pub mod scheduler;
pub mod status;
pub mod tracker;

pub use classify::{classify, WalkKey, WalkPlan};
pub use driver::{WalkCallback, WalkControl};
pub use event_bus::{create_event_channel, EventEmitter, EventReceiver, EventSender, WalkEvent};
pub use scheduler::{FakeStepScheduler, StepScheduler, TimerStepScheduler};
pub use status::{WalkStatus, WalkTag};
pub use tracker::CompletionTracker;
