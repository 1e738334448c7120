//! Error types for the walk engine.
//!
//! - [`WalkError`] — Pre-flight validation failures that reject a walk.

use thiserror::Error;

/// Errors that reject a walk before any step runs.
///
/// Both variants are pre-flight validation failures, surfaced exclusively
/// through [`WalkStatus::Rejected`](crate::core::status::WalkStatus) on the
/// returned handle — never as a `Result` from the entry point. No token is
/// created and no callback is invoked for a rejected walk.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalkError {
    /// The collection has no items to visit (zero length or zero keys).
    #[error("empty collection")]
    EmptyCollection,
    /// No per-item callback was supplied.
    #[error("invalid callback")]
    InvalidCallback,
}

/// Convenience alias for walk-level results.
pub type WalkResult<T> = Result<T, WalkError>;
