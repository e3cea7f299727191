//! Thread-safe FIFO queue with blocking waits and close-and-drain.
//!
//! Uses parking_lot::Mutex and Condvar for synchronous locking.
//! No async runtime requirement.

use std::collections::VecDeque;

use parking_lot::{Condvar, Mutex, MutexGuard};
use tracing::debug;

use super::limit::{LimitStrategy, OfferOutcome};

/// State guarded by the queue mutex.
struct QueueState<T> {
    items: VecDeque<T>,
    closed: bool,
    /// Callers currently parked in `remove_wait`/`peek_wait`.
    waiters: usize,
}

/// Unbounded thread-safe FIFO queue.
///
/// `remove_wait` and `peek_wait` park the caller until an item arrives or
/// the queue is closed. `close` releases every parked caller and does not
/// return until all of them have left.
pub struct Queue<T> {
    state: Mutex<QueueState<T>>,
    /// Signalled once per `add`, broadcast on `close`.
    available: Condvar,
    /// Signalled when the last waiter leaves a closed queue.
    drained: Condvar,
}

impl<T> Queue<T> {
    /// Create a new empty queue.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                closed: false,
                waiters: 0,
            }),
            available: Condvar::new(),
            drained: Condvar::new(),
        }
    }

    /// Append an item to the tail. Dropped silently if the queue is closed.
    pub fn add(&self, item: T) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        state.items.push_back(item);
        self.available.notify_one();
    }

    /// Remove the head item without blocking.
    pub fn remove(&self) -> Option<T> {
        self.state.lock().items.pop_front()
    }

    /// Remove the head item, blocking until one is available.
    /// Returns `None` once the queue is closed.
    pub fn remove_wait(&self) -> Option<T> {
        let state = self.state.lock();
        self.wait_for(state, |items| items.pop_front())
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Number of callers currently blocked in a `*_wait` call.
    pub fn waiters(&self) -> usize {
        self.state.lock().waiters
    }

    /// Discard all queued items. Blocked waiters keep waiting.
    pub fn clear(&self) {
        drop(self.take_items());
    }

    /// Close the queue.
    ///
    /// Remaining items are discarded, every blocked `*_wait` call returns
    /// `None`, and this call blocks until all of them have returned.
    /// Closing an already closed queue only waits for stragglers.
    pub fn close(&self) {
        drop(self.close_and_take());
    }

    /// Empty the queue and hand the items to the caller.
    pub(crate) fn take_items(&self) -> VecDeque<T> {
        std::mem::take(&mut self.state.lock().items)
    }

    /// `close`, returning the discarded items instead of dropping them.
    pub(crate) fn close_and_take(&self) -> VecDeque<T> {
        let mut state = self.state.lock();
        let discarded = std::mem::take(&mut state.items);
        let was_closed = std::mem::replace(&mut state.closed, true);
        let released = state.waiters;
        self.available.notify_all();
        while state.waiters > 0 {
            self.drained.wait(&mut state);
        }
        drop(state);

        if !was_closed {
            debug!(discarded = discarded.len(), released, "queue closed");
        }
        discarded
    }

    /// Park until `take` yields an item or the queue closes.
    ///
    /// The caller is counted as a waiter for the whole call so `close`
    /// can wait for it to leave.
    fn wait_for<F>(&self, mut state: MutexGuard<'_, QueueState<T>>, mut take: F) -> Option<T>
    where
        F: FnMut(&mut VecDeque<T>) -> Option<T>,
    {
        if state.closed {
            return None;
        }
        state.waiters += 1;
        let item = loop {
            if state.closed {
                break None;
            }
            if let Some(item) = take(&mut state.items) {
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

    /// Slots left under `max_items`; 0 once closed.
    pub(crate) fn free_slots(&self, max_items: usize) -> usize {
        let state = self.state.lock();
        if state.closed {
            return 0;
        }
        max_items.saturating_sub(state.items.len())
    }

    /// Append under a capacity limit. Backs `LimitQueue`.
    pub(crate) fn offer_bounded(
        &self,
        item: T,
        max_items: usize,
        strategy: LimitStrategy,
    ) -> OfferOutcome<T> {
        let mut state = self.state.lock();
        if state.closed {
            return OfferOutcome::Closed(item);
        }
        if state.items.len() < max_items {
            state.items.push_back(item);
            self.available.notify_one();
            return OfferOutcome::Enqueued;
        }
        match strategy {
            LimitStrategy::Reject => OfferOutcome::Rejected(item),
            LimitStrategy::Cycle => {
                let mut evicted = None;
                while state.items.len() >= max_items {
                    evicted = state.items.pop_front();
                }
                state.items.push_back(item);
                self.available.notify_one();
                match evicted {
                    Some(oldest) => OfferOutcome::Evicted(oldest),
                    // max_items > 0 guarantees at least one eviction
                    None => OfferOutcome::Enqueued,
                }
            }
        }
    }
}

impl<T: Clone> Queue<T> {
    /// Clone the head item without removing it.
    pub fn peek(&self) -> Option<T> {
        self.state.lock().items.front().cloned()
    }

    /// Clone the head item, blocking until one is available.
    /// Returns `None` once the queue is closed.
    pub fn peek_wait(&self) -> Option<T> {
        let state = self.state.lock();
        let item = self.wait_for(state, |items| items.front().cloned());
        if item.is_some() {
            // The item stays queued; hand the wakeup to the next waiter.
            self.available.notify_one();
        }
        item
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Queue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Queue")
            .field("len", &state.items.len())
            .field("closed", &state.closed)
            .field("waiters", &state.waiters)
            .finish()
    }
}
