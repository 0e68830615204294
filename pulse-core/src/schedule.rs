//! Cooperative scheduling primitives.
//!
//! Self-rescheduling loops (the feed's reveal loop, the canvas frame driver)
//! are modelled as explicit tasks that re-submit themselves. Every
//! re-submission checks a [`CancelToken`], so tearing a component down stops
//! all of its future work deterministically.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use crate::types::Millis;

/// Shared flag that, once set, stops a task from being scheduled again.
///
/// Clones observe the same flag. Cancelling is idempotent.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, AtomicOrdering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(AtomicOrdering::Acquire)
    }
}

#[derive(Debug)]
struct Timer<T> {
    due: Millis,
    seq: u64,
    task: T,
}

impl<T> PartialEq for Timer<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<T> Eq for Timer<T> {}

impl<T> PartialOrd for Timer<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Timer<T> {
    // Reversed so the max-heap pops the earliest (due, seq) first.
    fn cmp(&self, other: &Self) -> Ordering {
        (other.due, other.seq).cmp(&(self.due, self.seq))
    }
}

/// Virtual-time timer queue.
///
/// Timers fire in `(due, submission order)` order. Once the owning token is
/// cancelled the queue refuses new timers and drains to nothing.
#[derive(Debug)]
pub struct Timers<T> {
    heap: BinaryHeap<Timer<T>>,
    next_seq: u64,
    token: CancelToken,
}

impl<T> Timers<T> {
    pub fn new(token: CancelToken) -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
            token,
        }
    }

    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    /// Schedules `task` to run at `at`. Returns `false` if the token is
    /// already cancelled and nothing was queued.
    pub fn schedule_at(&mut self, at: Millis, task: T) -> bool {
        if self.token.is_cancelled() {
            return false;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Timer { due: at, seq, task });
        true
    }

    pub fn schedule_after(&mut self, now: Millis, delay: Millis, task: T) -> bool {
        self.schedule_at(now.saturating_add(delay), task)
    }

    /// Earliest due time, if any live timer is queued.
    pub fn next_due(&self) -> Option<Millis> {
        if self.token.is_cancelled() {
            return None;
        }
        self.heap.peek().map(|t| t.due)
    }

    /// Pops the earliest timer due at or before `now`, with its due time.
    pub fn pop_due(&mut self, now: Millis) -> Option<(Millis, T)> {
        if self.token.is_cancelled() {
            self.heap.clear();
            return None;
        }
        if self.heap.peek()?.due > now {
            return None;
        }
        self.heap.pop().map(|t| (t.due, t.task))
    }

    pub fn len(&self) -> usize {
        if self.token.is_cancelled() {
            0
        } else {
            self.heap.len()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }
}
