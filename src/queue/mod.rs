//! Concurrent queues.
//!
//! - [`Queue`]: unbounded FIFO with blocking waits and close-and-drain.
//! - [`LimitQueue`]: bounded FIFO that rejects or cycles on overflow.
//! - [`PriorityQueue`]: integer-levelled queue with bounded starvation.
//! - [`ConcurrencyPool`]: counting slots that bound concurrent processing.

pub mod fairness;
mod fifo;
mod limit;
mod pool;
mod priority;


pub use fairness::{LevelSelector, Selection};
pub use fifo::Queue;
pub use limit::{LimitQueue, LimitStrategy, OfferOutcome};
pub use pool::{ConcurrencyPool, PoolSlot};
pub use priority::PriorityQueue;
