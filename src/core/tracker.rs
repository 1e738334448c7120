//! Per-item completion bookkeeping.

use parking_lot::Mutex;
use tokio::sync::Notify;

struct TokenState {
    settled: Vec<bool>,
    pending: usize,
}

/// One pending/settled token per planned item, used only to detect that
/// every item has been dispatched and accounted for — tokens carry no
/// per-item result.
///
/// Tokens may settle in any order. [`all_settled`](Self::all_settled) is
/// satisfied only once every token has settled; a walk that stops early
/// leaves its remaining tokens pending and the wait unsatisfied forever,
/// which is what keeps a stopped walk's handle from ever settling.
pub struct CompletionTracker {
    state: Mutex<TokenState>,
    notify: Notify,
}

impl CompletionTracker {
    /// Allocate `total` fresh pending tokens.
    pub fn new(total: usize) -> Self {
        Self {
            state: Mutex::new(TokenState {
                settled: vec![false; total],
                pending: total,
            }),
            notify: Notify::new(),
        }
    }

    /// Settle the token at `index`.
    ///
    /// The first settle wins; repeats and out-of-range indexes are ignored.
    pub fn settle(&self, index: usize) {
        let mut state = self.state.lock();
        let TokenState { settled, pending } = &mut *state;
        if let Some(slot) = settled.get_mut(index) {
            if !*slot {
                *slot = true;
                *pending -= 1;
                if *pending == 0 {
                    self.notify.notify_waiters();
                }
            }
        }
    }

    /// Number of tokens still pending.
    pub fn pending(&self) -> usize {
        self.state.lock().pending
    }

    /// Wait until every token has settled, in whatever order they settle.
    pub async fn all_settled(&self) {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // register before checking so a settle between the check and the
            // await cannot be missed
            notified.as_mut().enable();
            if self.state.lock().pending == 0 {
                return;
            }
            notified.await;
        }
    }
}
