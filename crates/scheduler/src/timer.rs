//! Deadline-ordered timer queue
//!
//! Timers are ordered by deadline (earliest first), then by insertion order so
//! timers sharing a deadline fire FIFO.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

/// Unique timer identifier
pub type TimerId = u64;

/// A timer waiting for its deadline
#[derive(Debug, Clone)]
pub struct Timer<T> {
    /// Unique timer identifier
    pub id: TimerId,

    /// Virtual-clock instant at which the timer becomes due
    pub deadline: Duration,

    /// What the owner wants done when the timer fires
    pub payload: T,

    /// Insertion order (FIFO among equal deadlines)
    sequence: u64,
}

impl<T> PartialEq for Timer<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Timer<T> {}

impl<T> PartialOrd for Timer<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Timer<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max heap: reverse both keys so the earliest pops first
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Min-heap of timers keyed by deadline
#[derive(Debug)]
pub struct TimerQueue<T> {
    heap: BinaryHeap<Timer<T>>,
    next_id: TimerId,
    sequence: u64,
}

impl<T> TimerQueue<T> {
    /// Create an empty queue
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_id: 1,
            sequence: 0,
        }
    }

    /// Queue a payload for `deadline`, returning the assigned id
    pub fn push(&mut self, deadline: Duration, payload: T) -> TimerId {
        let id = self.next_id;
        self.next_id += 1;
        let sequence = self.sequence;
        self.sequence += 1;

        self.heap.push(Timer {
            id,
            deadline,
            payload,
            sequence,
        });
        id
    }

    /// Pop the earliest timer if it is due at `now`
    pub fn pop_due(&mut self, now: Duration) -> Option<Timer<T>> {
        if self.heap.peek()?.deadline <= now {
            self.heap.pop()
        } else {
            None
        }
    }

    /// Deadline of the earliest pending timer
    pub fn next_deadline(&self) -> Option<Duration> {
        self.heap.peek().map(|timer| timer.deadline)
    }

    /// Remove one timer by id. Returns `true` if it was pending.
    pub fn remove(&mut self, id: TimerId) -> bool {
        let before = self.heap.len();
        self.heap.retain(|timer| timer.id != id);
        self.heap.len() != before
    }

    /// Remove every timer whose payload matches, returning the removed ids
    pub fn remove_if<F>(&mut self, mut predicate: F) -> Vec<TimerId>
    where
        F: FnMut(&T) -> bool,
    {
        let mut removed = Vec::new();
        self.heap.retain(|timer| {
            if predicate(&timer.payload) {
                removed.push(timer.id);
                false
            } else {
                true
            }
        });
        removed
    }

    /// Drop every pending timer, returning how many there were
    pub fn clear(&mut self) -> usize {
        let count = self.heap.len();
        self.heap.clear();
        count
    }

    /// Number of pending timers
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether no timers are pending
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
