//! Queue construction error types.
//!
//! Runtime conditions (empty queue, closed queue, unknown level) are not
//! errors; they surface as `None` or `false`. Only misconfiguration fails.

use thiserror::Error;

/// Errors returned when a queue cannot be constructed as requested.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("Invalid capacity: a bounded queue needs room for at least one item")]
    InvalidCapacity,

    #[error("Unknown limit strategy: {0}")]
    UnknownStrategy(String),
}
