//! Re-entrancy guard for replication runs.
//!
//! Creating a record on a target member can look like a fresh upload to the
//! host that dispatched the upload event. The engine runs each top-level call
//! inside [`ReentrancyGuard::scope`] so that events raised from within that
//! call are recognised and dropped instead of fanning out again.
//!
//! # Scope
//!
//! The active set lives in a `tokio::task_local!`, installed only while the
//! scoped future is being polled. Unrelated uploads running at the same time,
//! even on the same task through `join!`, are outside the scope and replicate
//! normally.
//!
//! # Invariants
//!
//! - A guard is active only inside the future passed to its own `scope`
//! - Leaving the scope releases the guard on every exit path, including
//!   error returns, cancellation by drop, and unwinding panics

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_GUARD_ID: AtomicU64 = AtomicU64::new(1);

tokio::task_local! {
    static ACTIVE_GUARDS: Vec<u64>;
}

/// Identity of one engine's runs; clones share the identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReentrancyGuard {
    id: u64,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self {
            id: NEXT_GUARD_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// True while called from inside a future running under this guard's scope.
    pub fn is_active(&self) -> bool {
        ACTIVE_GUARDS
            .try_with(|ids| ids.contains(&self.id))
            .unwrap_or(false)
    }

    /// Polls `fut` with this guard active, on top of any guards already
    /// active for the caller.
    pub async fn scope<F: Future>(&self, fut: F) -> F::Output {
        let mut ids = ACTIVE_GUARDS
            .try_with(|ids| ids.clone())
            .unwrap_or_default();
        ids.push(self.id);
        ACTIVE_GUARDS.scope(ids, fut).await
    }
}

impl Default for ReentrancyGuard {
    fn default() -> Self {
        Self::new()
    }
}
