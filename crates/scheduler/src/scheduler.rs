//! Timer scheduler on a host-driven virtual clock
//!
//! The scheduler never spawns threads or sleeps. The owner schedules payloads
//! at absolute virtual-clock deadlines and drains due timers with
//! [`TimerScheduler::pop_due`] whenever its clock advances. Shutting the
//! scheduler down cancels everything still pending and refuses new timers, so
//! nothing can fire after teardown.

use crate::cancel::{CancellationRegistry, CancellationToken};
use crate::timer::{Timer, TimerId, TimerQueue};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Scheduler statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Timers accepted by `schedule_at`
    pub timers_scheduled: u64,

    /// Timers handed back by `pop_due`
    pub timers_fired: u64,

    /// Timers cancelled before firing
    pub timers_cancelled: u64,

    /// Timers currently waiting
    pub pending: usize,
}

/// Thread-safe, cancellable timer scheduler
///
/// # Example
///
/// ```
/// use snapmeasure_scheduler::TimerScheduler;
/// use std::time::Duration;
///
/// let scheduler = TimerScheduler::new();
/// let (_, token) = scheduler
///     .schedule_at(Duration::from_millis(800), "analyze")
///     .expect("scheduler is running");
///
/// assert!(scheduler.pop_due(Duration::from_millis(500)).is_none());
/// let timer = scheduler.pop_due(Duration::from_millis(800)).unwrap();
/// assert_eq!(timer.payload, "analyze");
/// assert!(!token.is_cancelled());
/// ```
#[derive(Debug)]
pub struct TimerScheduler<T> {
    state: Mutex<SchedulerState<T>>,
    cancellation: CancellationRegistry,
}

#[derive(Debug)]
struct SchedulerState<T> {
    queue: TimerQueue<T>,
    stats: SchedulerStats,
    shut_down: bool,
}

impl<T> TimerScheduler<T> {
    /// Create a running scheduler with no timers
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SchedulerState {
                queue: TimerQueue::new(),
                stats: SchedulerStats::default(),
                shut_down: false,
            }),
            cancellation: CancellationRegistry::new(),
        }
    }

    // Lock order: state, then the cancellation registry.
    fn state(&self) -> MutexGuard<'_, SchedulerState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Schedule `payload` to become due at `deadline`
    ///
    /// Returns `None` once the scheduler has been shut down.
    pub fn schedule_at(&self, deadline: Duration, payload: T) -> Option<(TimerId, CancellationToken)> {
        let mut state = self.state();
        if state.shut_down {
            return None;
        }

        let id = state.queue.push(deadline, payload);
        state.stats.timers_scheduled += 1;
        let token = self.cancellation.register(id);
        Some((id, token))
    }

    /// Pop the next due, non-cancelled timer
    ///
    /// Timers whose token was cancelled are discarded on the way.
    pub fn pop_due(&self, now: Duration) -> Option<Timer<T>> {
        let mut state = self.state();
        while let Some(timer) = state.queue.pop_due(now) {
            let live = self
                .cancellation
                .unregister(timer.id)
                .is_some_and(|token| !token.is_cancelled());

            if live && !state.shut_down {
                state.stats.timers_fired += 1;
                return Some(timer);
            }
            state.stats.timers_cancelled += 1;
        }
        None
    }

    /// Cancel one pending timer. Returns `true` if it was still pending.
    pub fn cancel(&self, timer_id: TimerId) -> bool {
        let mut state = self.state();
        self.cancellation.cancel(timer_id);
        let removed = state.queue.remove(timer_id);
        if removed {
            state.stats.timers_cancelled += 1;
            self.cancellation.unregister(timer_id);
        }
        removed
    }

    /// Cancel every pending timer whose payload matches
    pub fn cancel_where<F>(&self, predicate: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        let mut state = self.state();
        let removed = state.queue.remove_if(predicate);
        for id in &removed {
            if let Some(token) = self.cancellation.unregister(*id) {
                token.cancel();
            }
        }
        state.stats.timers_cancelled += removed.len() as u64;
        removed.len()
    }

    /// Cancel everything and refuse further timers. Idempotent.
    ///
    /// Returns the number of timers that were still pending.
    pub fn shutdown(&self) -> usize {
        let mut state = self.state();
        state.shut_down = true;
        self.cancellation.cancel_all();
        self.cancellation.clear();

        let pending = state.queue.clear();
        state.stats.timers_cancelled += pending as u64;
        pending
    }

    /// Whether `shutdown` has been called
    pub fn is_shut_down(&self) -> bool {
        self.state().shut_down
    }

    /// Deadline of the earliest pending timer
    pub fn next_deadline(&self) -> Option<Duration> {
        self.state().queue.next_deadline()
    }

    /// Number of pending timers
    pub fn pending(&self) -> usize {
        self.state().queue.len()
    }

    /// Snapshot of the scheduler statistics
    pub fn stats(&self) -> SchedulerStats {
        let state = self.state();
        let mut stats = state.stats.clone();
        stats.pending = state.queue.len();
        stats
    }
}

impl<T> Default for TimerScheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_fires_in_order() {
        let scheduler = TimerScheduler::new();
        scheduler.schedule_at(ms(1600), 2).unwrap();
        scheduler.schedule_at(ms(800), 1).unwrap();
        scheduler.schedule_at(ms(2500), 3).unwrap();

        assert_eq!(scheduler.next_deadline(), Some(ms(800)));
        let fired: Vec<i32> = std::iter::from_fn(|| scheduler.pop_due(ms(2000)))
            .map(|timer| timer.payload)
            .collect();
        assert_eq!(fired, vec![1, 2]);
        assert_eq!(scheduler.pending(), 1);

        let stats = scheduler.stats();
        assert_eq!(stats.timers_scheduled, 3);
        assert_eq!(stats.timers_fired, 2);
        assert_eq!(stats.pending, 1);
    }

    #[test]
    fn test_token_cancel_skips_timer() {
        let scheduler = TimerScheduler::new();
        let (_, token) = scheduler.schedule_at(ms(100), "first").unwrap();
        scheduler.schedule_at(ms(200), "second").unwrap();

        token.cancel();
        let timer = scheduler.pop_due(ms(300)).unwrap();
        assert_eq!(timer.payload, "second");
        assert_eq!(scheduler.stats().timers_cancelled, 1);
    }

    #[test]
    fn test_cancel_by_id() {
        let scheduler = TimerScheduler::new();
        let (id, token) = scheduler.schedule_at(ms(100), ()).unwrap();

        assert!(scheduler.cancel(id));
        assert!(token.is_cancelled());
        assert!(!scheduler.cancel(id));
        assert!(scheduler.pop_due(ms(1000)).is_none());
    }

    #[test]
    fn test_cancel_where() {
        let scheduler = TimerScheduler::new();
        scheduler.schedule_at(ms(10), "scan").unwrap();
        let (_, voice) = scheduler.schedule_at(ms(20), "voice").unwrap();
        scheduler.schedule_at(ms(30), "voice").unwrap();

        assert_eq!(scheduler.cancel_where(|p| *p == "voice"), 2);
        assert!(voice.is_cancelled());
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn test_shutdown_cancels_everything() {
        let scheduler = TimerScheduler::new();
        let (_, token) = scheduler.schedule_at(ms(800), 1).unwrap();
        scheduler.schedule_at(ms(2500), 2).unwrap();

        assert_eq!(scheduler.shutdown(), 2);
        assert!(token.is_cancelled());
        assert!(scheduler.is_shut_down());
        assert!(scheduler.pop_due(ms(10_000)).is_none());
        assert!(scheduler.schedule_at(ms(1), 3).is_none());
        assert_eq!(scheduler.shutdown(), 0);
    }

    #[test]
    fn test_scheduler_is_send_and_sync() {
        fn assert_send_sync<S: Send + Sync>() {}
        assert_send_sync::<TimerScheduler<u32>>();
    }
}
