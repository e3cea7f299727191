//! Metric recording helpers over the `metrics` facade.
//!
//! Without an installed recorder every call is a no-op.

use ::metrics::{counter, gauge};

pub const EVICTED_TOTAL: &str = "gg_queue_evicted_total";
pub const REJECTED_TOTAL: &str = "gg_queue_rejected_total";
pub const STARVATION_PROMOTIONS_TOTAL: &str = "gg_queue_starvation_promotions_total";
pub const QUEUE_DEPTH: &str = "gg_queue_depth";

/// Items evicted by a cycling bounded queue.
pub fn record_evicted(count: u64) {
    counter!(EVICTED_TOTAL).increment(count);
}

/// Items refused by a full or closed bounded queue.
pub fn record_rejected() {
    counter!(REJECTED_TOTAL).increment(1);
}

/// Any-level removals that served a starved level instead of the top one.
pub fn record_starvation_promotion() {
    counter!(STARVATION_PROMOTIONS_TOTAL).increment(1);
}

/// Current depth of a named queue.
pub fn record_queue_depth(queue: &'static str, depth: usize) {
    gauge!(QUEUE_DEPTH, "queue" => queue).set(depth as f64);
}
