//! Walk status — the canonical definition of walk terminal states.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::error::WalkError;

/// Terminal tag carried by a successfully settled walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WalkTag {
    /// Every planned item was visited.
    Done,
}

/// Observable status of one walk.
///
/// Terminal states are final: a walk settles at most once and emits no
/// further notifications afterwards.
#[derive(Debug, Clone)]
pub enum WalkStatus {
    /// The walk has not settled. A walk stopped early by its callback stays
    /// in this state forever.
    Running,
    /// Every item was visited and every completion token settled. Hands back
    /// a reference to the caller's original collection.
    Completed {
        collection: Arc<Value>,
        tag: WalkTag,
    },
    /// Pre-flight validation failed; no token was created and no step ran.
    Rejected {
        collection: Arc<Value>,
        reason: WalkError,
    },
}

impl WalkStatus {
    /// Whether the walk has settled.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, WalkStatus::Running)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_terminal_states() {
        assert!(!WalkStatus::Running.is_terminal());
        assert!(WalkStatus::Completed {
            collection: Arc::new(json!([1])),
            tag: WalkTag::Done,
        }
        .is_terminal());
        assert!(WalkStatus::Rejected {
            collection: Arc::new(json!([])),
            reason: WalkError::EmptyCollection,
        }
        .is_terminal());
    }

    #[test]
    fn test_tag_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&WalkTag::Done).unwrap(), "\"done\"");
    }
}
