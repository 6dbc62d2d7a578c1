//! Cancellation tokens for scheduled timers
//!
//! Every timer handed out by the scheduler carries a token. Cancelling the
//! token (from any clone, on any thread) guarantees the timer never fires.

use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, MutexGuard, PoisonError,
};

use crate::TimerId;

/// Shared cancellation flag for one timer
///
/// Clones observe the same state, so a host can keep a clone and cancel a
/// pending timer without touching the scheduler.
///
/// # Example
///
/// ```
/// use snapmeasure_scheduler::CancellationToken;
///
/// let token = CancellationToken::new();
/// let held_by_host = token.clone();
///
/// held_by_host.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token in the non-cancelled state
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel this token and every clone of it. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether `cancel()` has been called on this token or any clone
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Registry mapping live timer ids to their tokens
#[derive(Debug, Default)]
pub struct CancellationRegistry {
    tokens: Mutex<HashMap<TimerId, CancellationToken>>,
}

impl CancellationRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    fn tokens(&self) -> MutexGuard<'_, HashMap<TimerId, CancellationToken>> {
        self.tokens.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a timer and return its token
    pub fn register(&self, timer_id: TimerId) -> CancellationToken {
        let token = CancellationToken::new();
        self.tokens().insert(timer_id, token.clone());
        token
    }

    /// Cancel one timer. Returns `true` if it was registered.
    pub fn cancel(&self, timer_id: TimerId) -> bool {
        match self.tokens().get(&timer_id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancel every registered timer, returning how many were live
    pub fn cancel_all(&self) -> usize {
        let tokens = self.tokens();
        for token in tokens.values() {
            token.cancel();
        }
        tokens.len()
    }

    /// Forget a timer once it has fired or been dropped from the queue
    pub fn unregister(&self, timer_id: TimerId) -> Option<CancellationToken> {
        self.tokens().remove(&timer_id)
    }

    /// Whether the timer's token has been cancelled
    ///
    /// Unknown ids count as cancelled: nothing may fire without a live token.
    pub fn is_cancelled(&self, timer_id: TimerId) -> bool {
        self.tokens()
            .get(&timer_id)
            .map_or(true, CancellationToken::is_cancelled)
    }

    /// Number of registered timers
    pub fn len(&self) -> usize {
        self.tokens().len()
    }

    /// Whether no timers are registered
    pub fn is_empty(&self) -> bool {
        self.tokens().is_empty()
    }

    /// Drop every token without cancelling it
    pub fn clear(&self) {
        self.tokens().clear();
    }
}
