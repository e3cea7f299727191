//! Counting pool of concurrency slots.
//!
//! Bounds how many queue items are processed at once: a consumer takes a
//! slot before working on an item and gives it back afterwards.

use parking_lot::{Condvar, Mutex};
use tracing::debug;

struct PoolState {
    free: usize,
    closed: bool,
    waiters: usize,
}

/// Fixed number of slots handed out to concurrent workers.
///
/// `get` blocks while every slot is taken. `close` releases every blocked
/// `get` and turns later `get`/`release` calls into immediate no-ops.
pub struct ConcurrencyPool {
    slots: usize,
    state: Mutex<PoolState>,
    available: Condvar,
    drained: Condvar,
}

impl ConcurrencyPool {
    /// Create a pool with `slots` free slots (at least one).
    pub fn new(slots: usize) -> Self {
        let slots = slots.max(1);
        Self {
            slots,
            state: Mutex::new(PoolState {
                free: slots,
                closed: false,
                waiters: 0,
            }),
            available: Condvar::new(),
            drained: Condvar::new(),
        }
    }

    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Slots currently free.
    pub fn available(&self) -> usize {
        self.state.lock().free
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Number of callers currently blocked in `get`.
    pub fn waiters(&self) -> usize {
        self.state.lock().waiters
    }

    /// Take a slot, blocking until one is free.
    ///
    /// Returns `false` without taking a slot once the pool is closed.
    pub fn get(&self) -> bool {
        let mut state = self.state.lock();
        if state.closed {
            return false;
        }
        state.waiters += 1;
        let taken = loop {
            if state.closed {
                break false;
            }
            if state.free > 0 {
                state.free -= 1;
                break true;
            }
            self.available.wait(&mut state);
        };
        state.waiters -= 1;
        if state.closed && state.waiters == 0 {
            self.drained.notify_all();
        }
        taken
    }

    /// Take a slot if one is free right now.
    pub fn try_get(&self) -> bool {
        let mut state = self.state.lock();
        if state.closed || state.free == 0 {
            return false;
        }
        state.free -= 1;
        true
    }

    /// Return a slot taken with `get` or `try_get`.
    ///
    /// No-op once closed. Releases beyond the pool size are ignored.
    pub fn release(&self) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        if state.free >= self.slots {
            debug!(slots = self.slots, "release without a matching get ignored");
            return;
        }
        state.free += 1;
        self.available.notify_one();
    }

    /// Take a slot that is returned when the guard drops.
    ///
    /// Returns `None` once the pool is closed.
    pub fn acquire(&self) -> Option<PoolSlot<'_>> {
        if self.get() {
            Some(PoolSlot { pool: self })
        } else {
            None
        }
    }

    /// Close the pool and release every blocked `get`.
    ///
    /// Blocks until all of them have returned. Idempotent.
    pub fn close(&self) {
        let mut state = self.state.lock();
        let was_closed = std::mem::replace(&mut state.closed, true);
        let released = state.waiters;
        self.available.notify_all();
        while state.waiters > 0 {
            self.drained.wait(&mut state);
        }
        let in_use = self.slots - state.free;
        drop(state);

        if !was_closed {
            debug!(slots = self.slots, in_use, released, "concurrency pool closed");
        }
    }
}

impl std::fmt::Debug for ConcurrencyPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ConcurrencyPool")
            .field("slots", &self.slots)
            .field("free", &state.free)
            .field("closed", &state.closed)
            .field("waiters", &state.waiters)
            .finish()
    }
}

/// RAII slot that returns itself to the pool on drop.
pub struct PoolSlot<'a> {
    pool: &'a ConcurrencyPool,
}

impl Drop for PoolSlot<'_> {
    fn drop(&mut self) {
        self.pool.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_slots_are_floored_to_one() {
        let pool = ConcurrencyPool::new(0);
        assert_eq!(pool.slots(), 1);
        assert!(pool.try_get());
        assert!(!pool.try_get());
    }

    #[test]
    fn release_returns_slot() {
        let pool = ConcurrencyPool::new(2);
        assert!(pool.get());
        assert!(pool.get());
        assert_eq!(pool.available(), 0);
        pool.release();
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn extra_release_is_ignored() {
        let pool = ConcurrencyPool::new(2);
        pool.release();
        assert_eq!(pool.available(), 2);
    }

    #[test]
    fn slot_guard_releases_on_drop() {
        let pool = ConcurrencyPool::new(1);
        {
            let _slot = pool.acquire();
            assert_eq!(pool.available(), 0);
        }
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn closed_pool_hands_out_nothing() {
        let pool = ConcurrencyPool::new(1);
        pool.close();
        pool.close();
        assert!(!pool.get());
        assert!(!pool.try_get());
        assert!(pool.acquire().is_none());
        pool.release();
        assert!(pool.is_closed());
    }
}
