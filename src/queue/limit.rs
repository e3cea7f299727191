//! Capacity-bounded FIFO queue with an overflow strategy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::fifo::Queue;
use crate::config::LimitQueueConfig;
use crate::error::QueueError;
use crate::telemetry;

/// What a full `LimitQueue` does with a new item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitStrategy {
    /// Refuse the new item and keep the contents unchanged.
    #[default]
    Reject = 0,
    /// Evict the oldest item to admit the new one.
    Cycle = 1,
}

impl LimitStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reject => "reject",
            Self::Cycle => "cycle",
        }
    }
}

impl fmt::Display for LimitStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LimitStrategy {
    type Err = QueueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "cycle" => Ok(Self::Cycle),
            other => Err(QueueError::UnknownStrategy(other.to_string())),
        }
    }
}

impl TryFrom<u8> for LimitStrategy {
    type Error = QueueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Reject),
            1 => Ok(Self::Cycle),
            other => Err(QueueError::UnknownStrategy(other.to_string())),
        }
    }
}

/// Result of offering an item to a `LimitQueue`.
#[derive(Debug, PartialEq, Eq)]
pub enum OfferOutcome<T> {
    /// Admitted without displacing anything.
    Enqueued,
    /// Admitted after evicting the contained oldest item.
    Evicted(T),
    /// Refused because the queue is full; the item is handed back.
    Rejected(T),
    /// Refused because the queue is closed; the item is handed back.
    Closed(T),
}

impl<T> OfferOutcome<T> {
    /// True when the offered item is now in the queue.
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Enqueued | Self::Evicted(_))
    }
}

/// FIFO queue holding at most `capacity` items.
///
/// All `Queue` operations are available with unchanged semantics; only
/// admission differs.
pub struct LimitQueue<T> {
    inner: Queue<T>,
    max_items: usize,
    strategy: LimitStrategy,
}

impl<T> LimitQueue<T> {
    /// Create an empty queue. Fails if `max_items` is zero.
    pub fn new(max_items: usize, strategy: LimitStrategy) -> Result<Self, QueueError> {
        if max_items == 0 {
            return Err(QueueError::InvalidCapacity);
        }
        Ok(Self {
            inner: Queue::new(),
            max_items,
            strategy,
        })
    }

    pub fn from_config(config: &LimitQueueConfig) -> Result<Self, QueueError> {
        Self::new(config.max_items, config.strategy)
    }

    /// Offer an item, applying the limit strategy when full.
    pub fn offer(&self, item: T) -> OfferOutcome<T> {
        let outcome = self.inner.offer_bounded(item, self.max_items, self.strategy);
        match &outcome {
            OfferOutcome::Evicted(_) => {
                trace!(capacity = self.max_items, "limit queue full, evicted oldest item");
                telemetry::record_evicted(1);
            }
            OfferOutcome::Rejected(_) => {
                trace!(capacity = self.max_items, "limit queue full, rejected item");
                telemetry::record_rejected();
            }
            OfferOutcome::Enqueued | OfferOutcome::Closed(_) => {}
        }
        outcome
    }

    /// Add an item to the tail.
    ///
    /// Under `Reject`, returns whether the item was added. Under `Cycle`,
    /// returns whether the queue had room without evicting. A closed queue
    /// counts as full.
    pub fn add(&self, item: T) -> bool {
        matches!(self.offer(item), OfferOutcome::Enqueued)
    }

    /// Free slots remaining; 0 once closed.
    pub fn available(&self) -> usize {
        self.inner.free_slots(self.max_items)
    }

    pub fn capacity(&self) -> usize {
        self.max_items
    }

    pub fn strategy(&self) -> LimitStrategy {
        self.strategy
    }

    pub fn remove(&self) -> Option<T> {
        self.inner.remove()
    }

    pub fn remove_wait(&self) -> Option<T> {
        self.inner.remove_wait()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    pub fn waiters(&self) -> usize {
        self.inner.waiters()
    }

    pub fn clear(&self) {
        self.inner.clear();
    }

    /// Close the queue and wait for blocked callers to leave.
    pub fn close(&self) {
        self.inner.close();
    }
}

impl<T: Clone> LimitQueue<T> {
    pub fn peek(&self) -> Option<T> {
        self.inner.peek()
    }

    pub fn peek_wait(&self) -> Option<T> {
        self.inner.peek_wait()
    }
}

impl<T> fmt::Debug for LimitQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LimitQueue")
            .field("inner", &self.inner)
            .field("max_items", &self.max_items)
            .field("strategy", &self.strategy)
            .finish()
    }
}
