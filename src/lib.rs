//! # Cowalk — a cooperatively-yielding collection walker
//!
//! `cowalk` walks a heterogeneous collection (a `serde_json::Value` sequence
//! or mapping) and invokes a per-item callback, yielding control back to the
//! async runtime between items so one large walk never monopolizes the
//! executor. Other queued work (timers, channels, unrelated tasks) gets a
//! turn between every pair of items.
//!
//! The whole walk is observable through a [`WalkHandle`]:
//!
//! - **Progress**: a [`WalkEvent::ProgressUpdate`] after each processed item,
//!   plus one final notification at fraction 1.0 before settlement.
//! - **Early termination**: a callback returning [`WalkControl::Stop`] halts
//!   the walk after the current item. A stopped walk never settles — its
//!   handle stays `Running` forever.
//! - **Settlement**: [`WalkHandle::wait`] resolves with the original
//!   collection and [`WalkTag::Done`] after a full walk, or rejects with
//!   [`WalkError::EmptyCollection`] / [`WalkError::InvalidCallback`] when
//!   pre-flight validation fails.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use cowalk::{walk, WalkControl};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     let handle = walk(json!([10, 20, 30]), |key, value| {
//!         println!("{key} = {value}");
//!         WalkControl::Continue
//!     });
//!     let status = handle.wait().await;
//!     println!("{status:?}");
//! }
//! ```
//!
//! # Enumeration modes
//!
//! The input collection is classified once, before any step runs:
//!
//! | Input | Mode |
//! |-------|------|
//! | Array (any length, including zero) | Indexed |
//! | Object with a numeric `length` and addressable last element | Indexed |
//! | Any other object | Keyed, over the key list captured at start |
//! | Scalar | Keyed with zero keys (rejects as empty) |
//!
//! Enumeration order is ascending by index or by the captured key order, and
//! is stable for the duration of one walk.

pub mod api;
pub mod core;
pub mod error;

pub use crate::api::{walk, WalkHandle, WalkRunner, WalkRunnerBuilder};
pub use crate::core::classify::{classify, WalkKey, WalkPlan};
pub use crate::core::driver::{WalkCallback, WalkControl};
pub use crate::core::event_bus::{
    create_event_channel, EventEmitter, EventReceiver, EventSender, WalkEvent,
};
pub use crate::core::scheduler::{FakeStepScheduler, StepScheduler, TimerStepScheduler};
pub use crate::core::status::{WalkStatus, WalkTag};
pub use crate::core::tracker::CompletionTracker;
pub use crate::error::{WalkError, WalkResult};
