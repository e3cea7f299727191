//! Multi-level priority queue with bounded starvation.
//!
//! Priorities are integers `0..=max_priority` (higher is served first).
//! Works best when the maximum priority is relatively small: every level
//! owns its own `Queue`.

use std::collections::BTreeMap;

use parking_lot::{Condvar, Mutex, MutexGuard};
use tracing::{debug, trace};

use super::fairness::LevelSelector;
use super::fifo::Queue;
use crate::config::PriorityQueueConfig;
use crate::telemetry;

/// State guarded by the aggregate lock.
struct Bookkeeping {
    selector: LevelSelector,
    closed: bool,
    waiters: usize,
}

/// Thread-safe priority queue over integer levels.
///
/// With a wait limit of 0 the queue is strictly prioritised. With a wait
/// limit `N > 0`, a nonempty level skipped by `N` consecutive any-level
/// removals is served ahead of the highest level.
///
/// A single aggregate lock serialises every operation. Blocking calls wait
/// on the aggregate condition variable and only reach into a level once
/// that level is known to hold an item, so no level operation ever blocks
/// while the aggregate lock is held.
pub struct PriorityQueue<T> {
    levels: Vec<Queue<T>>,
    state: Mutex<Bookkeeping>,
    available: Condvar,
    drained: Condvar,
}

impl<T> PriorityQueue<T> {
    /// Create a strictly prioritised queue with levels `0..=max_priority`.
    pub fn new(max_priority: usize) -> Self {
        Self::with_wait_limit(max_priority, 0)
    }

    /// Create a queue with levels `0..=max_priority` and the given
    /// starvation bound (0 disables fairness).
    pub fn with_wait_limit(max_priority: usize, wait_limit: usize) -> Self {
        let levels = (0..=max_priority).map(|_| Queue::new()).collect();
        Self {
            levels,
            state: Mutex::new(Bookkeeping {
                selector: LevelSelector::new(max_priority, wait_limit),
                closed: false,
                waiters: 0,
            }),
            available: Condvar::new(),
            drained: Condvar::new(),
        }
    }

    pub fn from_config(config: &PriorityQueueConfig) -> Self {
        Self::with_wait_limit(config.max_priority, config.wait_limit)
    }

    pub fn max_priority(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn wait_limit(&self) -> usize {
        self.state.lock().selector.wait_limit()
    }

    /// Add an item at `priority`, clipped into range. No-op once closed.
    pub fn add(&self, item: T, priority: usize) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        let level = state.selector.clip(priority);
        self.levels[level].add(item);
        state.selector.record_add(level);
        // Waiters have level-specific predicates; let each re-check.
        self.available.notify_all();
    }

    /// Remove the next item chosen by priority and fairness.
    pub fn remove(&self) -> Option<T> {
        let mut state = self.state.lock();
        if state.selector.total() == 0 {
            return None;
        }
        self.take_next(&mut state)
    }

    /// Remove the next item, blocking until one is available.
    /// Returns `None` once the queue is closed.
    pub fn remove_wait(&self) -> Option<T> {
        let state = self.state.lock();
        self.wait_for(state, |pq, state| {
            if state.selector.total() == 0 {
                return None;
            }
            pq.take_next(state)
        })
    }

    /// Remove the head of one level, bypassing fairness.
    pub fn remove_p(&self, priority: usize) -> Option<T> {
        let mut state = self.state.lock();
        self.take_level(&mut state, priority)
    }

    /// Remove the head of one level, blocking until it has an item.
    /// Returns `None` immediately for an out-of-range level, and once the
    /// queue is closed.
    pub fn remove_p_wait(&self, priority: usize) -> Option<T> {
        if priority > self.max_priority() {
            return None;
        }
        let state = self.state.lock();
        self.wait_for(state, |pq, state| pq.take_level(state, priority))
    }

    /// Total number of queued items.
    pub fn len(&self) -> usize {
        self.state.lock().selector.total()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Item count per occupied level.
    pub fn lens(&self) -> BTreeMap<usize, usize> {
        let _state = self.state.lock();
        self.levels
            .iter()
            .enumerate()
            .map(|(level, queue)| (level, queue.len()))
            .filter(|&(_, len)| len > 0)
            .collect()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Number of callers currently blocked in a `*_wait` call.
    pub fn waiters(&self) -> usize {
        self.state.lock().waiters
    }

    /// Discard every queued item and reset fairness counters.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        let discarded: Vec<_> = self.levels.iter().map(Queue::take_items).collect();
        state.selector.reset();
        drop(state);
        drop(discarded);
    }

    /// Close every level and release all blocked callers.
    ///
    /// Blocks until every caller waiting in this queue has returned.
    /// Closing twice is a no-op apart from waiting for stragglers.
    pub fn close(&self) {
        let mut state = self.state.lock();
        let was_closed = std::mem::replace(&mut state.closed, true);
        let discarded = state.selector.total();
        let items: Vec<_> = self.levels.iter().map(Queue::close_and_take).collect();
        state.selector.reset();
        let released = state.waiters;
        self.available.notify_all();
        while state.waiters > 0 {
            self.drained.wait(&mut state);
        }
        drop(state);
        drop(items);

        if !was_closed {
            debug!(
                levels = self.levels.len(),
                discarded,
                released,
                "priority queue closed"
            );
        }
    }

    fn occupied(&self) -> impl Fn(usize) -> bool + '_ {
        move |level| !self.levels[level].is_empty()
    }

    /// Pop from the level chosen by the selector. Requires `total > 0`.
    fn take_next(&self, state: &mut Bookkeeping) -> Option<T> {
        let selection = state.selector.next_level(self.occupied());
        if selection.promoted {
            trace!(
                level = selection.level,
                top = state.selector.top(),
                "serving starved priority level"
            );
            telemetry::record_starvation_promotion();
        }
        let item = self.levels[selection.level].remove();
        debug_assert!(item.is_some(), "selected level {} was empty", selection.level);
        if item.is_some() {
            state.selector.record_remove(selection.level, self.occupied());
        }
        item
    }

    fn take_level(&self, state: &mut Bookkeeping, priority: usize) -> Option<T> {
        let item = self.levels.get(priority)?.remove()?;
        state.selector.record_remove(priority, self.occupied());
        Some(item)
    }

    /// Park on the aggregate lock until `take` yields or the queue closes.
    fn wait_for<F>(&self, mut state: MutexGuard<'_, Bookkeeping>, mut take: F) -> Option<T>
    where
        F: FnMut(&Self, &mut Bookkeeping) -> Option<T>,
    {
        if state.closed {
            return None;
        }
        state.waiters += 1;
        let item = loop {
            if state.closed {
                break None;
            }
            if let Some(item) = take(self, &mut *state) {
                break Some(item);
            }
            self.available.wait(&mut state);
        };
        state.waiters -= 1;
        if state.closed && state.waiters == 0 {
            self.drained.notify_all();
        }
        item
    }
}

impl<T: Clone> PriorityQueue<T> {
    /// Clone the item the next `remove` would return.
    pub fn peek(&self) -> Option<T> {
        let state = self.state.lock();
        self.look_next(&state)
    }

    /// Clone the item the next `remove` would return, blocking until the
    /// queue holds one. Returns `None` once the queue is closed.
    pub fn peek_wait(&self) -> Option<T> {
        let state = self.state.lock();
        self.wait_for(state, |pq, state| pq.look_next(state))
    }

    /// Clone the head of one level.
    pub fn peek_p(&self, priority: usize) -> Option<T> {
        let _state = self.state.lock();
        self.levels.get(priority)?.peek()
    }

    /// Clone the head of one level, blocking until it has an item.
    /// Returns `None` immediately for an out-of-range level, and once the
    /// queue is closed.
    pub fn peek_p_wait(&self, priority: usize) -> Option<T> {
        let queue = self.levels.get(priority)?;
        let state = self.state.lock();
        self.wait_for(state, |_, _| queue.peek())
    }

    fn look_next(&self, state: &Bookkeeping) -> Option<T> {
        if state.selector.total() == 0 {
            return None;
        }
        let selection = state.selector.peek_level(self.occupied());
        self.levels[selection.level].peek()
    }
}

impl<T> std::fmt::Debug for PriorityQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("PriorityQueue")
            .field("levels", &self.levels.len())
            .field("top", &state.selector.top())
            .field("total", &state.selector.total())
            .field("wait_limit", &state.selector.wait_limit())
            .field("closed", &state.closed)
            .finish()
    }
}
