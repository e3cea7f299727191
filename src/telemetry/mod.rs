//! Telemetry for GG-QUEUE.
//!
//! Structured logging setup and metric recording. The queues emit `tracing`
//! events and `metrics` facade updates; exporting them is up to the host.

mod logging;
mod metrics;

pub use self::logging::{init_logging, LogConfig, LogError, LogFormat};
pub use self::metrics::{
    record_evicted, record_queue_depth, record_rejected, record_starvation_promotion,
    EVICTED_TOTAL, QUEUE_DEPTH, REJECTED_TOTAL, STARVATION_PROMOTIONS_TOTAL,
};
