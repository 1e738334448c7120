//! Collection classification — decides how a walk enumerates its input.
//!
//! Classification runs once, before any step, and produces a read-only
//! [`WalkPlan`]. The plan fixes the enumeration length (indexed mode) or the
//! key list (keyed mode) for the duration of one walk, even if the source
//! mapping is mutated by the caller between walks. Only the key list is
//! copied; collection contents are never duplicated.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// The per-item key handed to the callback: a position for indexed walks, a
/// map key for keyed walks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum WalkKey {
    Index(usize),
    Key(String),
}

impl fmt::Display for WalkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalkKey::Index(index) => write!(f, "{index}"),
            WalkKey::Key(key) => f.write_str(key),
        }
    }
}

/// The resolved enumeration order for one walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkPlan {
    /// A finite sequence addressed by ascending index.
    Indexed { len: usize },
    /// A mapping addressed by the key list captured at plan time.
    Keyed { keys: Vec<String> },
}

impl WalkPlan {
    /// Number of items the walk will visit.
    pub fn total(&self) -> usize {
        match self {
            WalkPlan::Indexed { len } => *len,
            WalkPlan::Keyed { keys } => keys.len(),
        }
    }

    /// Whether the plan has nothing to visit.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Enumeration mode name, for logs.
    pub fn mode(&self) -> &'static str {
        match self {
            WalkPlan::Indexed { .. } => "indexed",
            WalkPlan::Keyed { .. } => "keyed",
        }
    }

    /// Key handed to the callback for position `index`.
    pub(crate) fn key_at(&self, index: usize) -> WalkKey {
        match self {
            WalkPlan::Indexed { .. } => WalkKey::Index(index),
            WalkPlan::Keyed { keys } => {
                WalkKey::Key(keys.get(index).cloned().unwrap_or_default())
            }
        }
    }

    /// Borrow the item value for position `index` out of `collection`.
    ///
    /// Indexed mode reads arrays by position and array-like objects by
    /// stringified index; a hole in either resolves to `Null`.
    pub(crate) fn value_at<'a>(&self, collection: &'a Value, index: usize) -> &'a Value {
        match self {
            WalkPlan::Indexed { .. } => match collection {
                Value::Array(items) => items.get(index).unwrap_or(&Value::Null),
                other => other.get(index.to_string()).unwrap_or(&Value::Null),
            },
            WalkPlan::Keyed { keys } => keys
                .get(index)
                .and_then(|key| collection.get(key))
                .unwrap_or(&Value::Null),
        }
    }
}

/// Classify a collection into indexed or keyed enumeration.
///
/// Rules, in order:
///
/// 1. Arrays are always indexed, including empty ones.
/// 2. An object carrying a numeric `length` member L is array-like — and
///    therefore indexed — when L is zero or an element is addressable at key
///    `L - 1`. An object whose `length` dangles (missing last element,
///    non-numeric value) enumerates its own keys instead.
/// 3. Any other object is keyed, over the key list captured here.
/// 4. Scalars are keyed with zero keys, which trips the empty-collection
///    rejection downstream.
///
/// Never fails and never mutates the collection.
pub fn classify(collection: &Value) -> WalkPlan {
    match collection {
        Value::Array(items) => WalkPlan::Indexed { len: items.len() },
        Value::Object(map) => {
            if let Some(len) = map.get("length").and_then(Value::as_u64) {
                let len = len as usize;
                if len == 0 || map.contains_key(&(len - 1).to_string()) {
                    return WalkPlan::Indexed { len };
                }
            }
            WalkPlan::Keyed {
                keys: map.keys().cloned().collect(),
            }
        }
        _ => WalkPlan::Keyed { keys: Vec::new() },
    }
}
