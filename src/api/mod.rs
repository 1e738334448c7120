//! Public entry surface: the walk runner, builder, and handle.

pub mod handle;
pub mod runner;

pub use handle::WalkHandle;
pub use runner::{walk, WalkRunner, WalkRunnerBuilder};
