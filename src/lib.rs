//! GG-QUEUE
//!
//! Thread-safe in-process queues for work scheduling layers.
//!
//! # Components
//!
//! - **Queue**: unbounded FIFO with blocking waits and close-and-drain
//! - **LimitQueue**: bounded FIFO that rejects or cycles on overflow
//! - **PriorityQueue**: integer priority levels with a bounded-starvation
//!   fairness policy
//! - **ConcurrencyPool**: counting slots that bound how many items are
//!   processed at once
//!
//! # Lifecycle
//!
//! Every queue is usable from any number of threads until `close` is
//! called. Closing discards queued items, releases every blocked caller
//! with `None`, and returns only after all of them have left. After close,
//! adds are ignored and removals return `None` immediately.
//!
//! ```
//! use gg_queue::queue::PriorityQueue;
//!
//! let pq = PriorityQueue::with_wait_limit(2, 0);
//! pq.add("low", 0);
//! pq.add("high", 2);
//! assert_eq!(pq.remove(), Some("high"));
//! assert_eq!(pq.remove(), Some("low"));
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod queue;
pub mod telemetry;

pub use error::QueueError;
pub use queue::{ConcurrencyPool, LimitQueue, LimitStrategy, OfferOutcome, PriorityQueue, Queue};
