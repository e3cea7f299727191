//! Queue configuration loading from environment variables.
//!
//! All configuration values are loaded from `GG_QUEUE_*` environment variables
//! with sensible defaults. Invalid values fall back to defaults without crashing.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `GG_QUEUE_MAX_PRIORITY` | 3 | Highest priority level (at most 1024) |
//! | `GG_QUEUE_WAIT_LIMIT` | 0 | Starvation bound (0 = strict priority) |
//! | `GG_QUEUE_MAX_ITEMS` | 256 | Bounded queue capacity |
//! | `GG_QUEUE_LIMIT_STRATEGY` | reject | Overflow strategy (`reject`, `cycle`) |
//! | `GG_QUEUE_PRODUCERS` | 2 | Simulation producer threads |
//! | `GG_QUEUE_CONSUMERS` | 0 | Simulation consumer threads (0 = auto) |
//! | `GG_QUEUE_ITEMS_PER_PRODUCER` | 1000 | Simulation items per producer |
//! | `GG_QUEUE_LOG_LEVEL` | info | Log filter directive |
//! | `GG_QUEUE_LOG_FORMAT` | json | Log format (`json`, `pretty`) |

use serde::Serialize;

use crate::queue::LimitStrategy;
use crate::telemetry::{LogConfig, LogFormat};

pub const DEFAULT_MAX_PRIORITY: usize = 3;
pub const DEFAULT_WAIT_LIMIT: usize = 0;
pub const DEFAULT_MAX_ITEMS: usize = 256;
pub const DEFAULT_PRODUCERS: usize = 2;
pub const DEFAULT_ITEMS_PER_PRODUCER: usize = 1000;

/// Ceiling for `GG_QUEUE_MAX_PRIORITY`. Every level owns a queue, so larger
/// values are clamped here and flagged by `config validate`.
pub const LARGE_MAX_PRIORITY: usize = 1024;

/// Configuration for a `PriorityQueue`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityQueueConfig {
    pub max_priority: usize,
    pub wait_limit: usize,
}

impl Default for PriorityQueueConfig {
    fn default() -> Self {
        Self {
            max_priority: DEFAULT_MAX_PRIORITY,
            wait_limit: DEFAULT_WAIT_LIMIT,
        }
    }
}

/// Configuration for a `LimitQueue`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitQueueConfig {
    pub max_items: usize,
    pub strategy: LimitStrategy,
}

impl Default for LimitQueueConfig {
    fn default() -> Self {
        Self {
            max_items: DEFAULT_MAX_ITEMS,
            strategy: LimitStrategy::Reject,
        }
    }
}

/// Producer/consumer workload for the CLI simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    pub producers: usize,
    /// 0 = one consumer per CPU.
    pub consumers: usize,
    pub items_per_producer: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            producers: DEFAULT_PRODUCERS,
            consumers: 0,
            items_per_producer: DEFAULT_ITEMS_PER_PRODUCER,
        }
    }
}

impl SimulationConfig {
    /// Consumer thread count with auto-detection applied.
    pub fn effective_consumers(&self) -> usize {
        if self.consumers == 0 {
            num_cpus::get().max(1)
        } else {
            self.consumers
        }
    }
}

/// Effective configuration summary (serializable).
#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    pub max_priority: usize,
    pub wait_limit: usize,
    pub max_items: usize,
    pub limit_strategy: LimitStrategy,
    pub producers: usize,
    pub consumers: usize,
    pub items_per_producer: usize,
    pub log_level: String,
    pub log_format: LogFormat,
}

/// All configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub priority: PriorityQueueConfig,
    pub limit: LimitQueueConfig,
    pub simulation: SimulationConfig,
    pub log: LogConfig,
}

/// Parse a `usize` env var, returning `default` on missing or invalid.
fn parse_usize(key: &str, default: usize) -> usize {
    match std::env::var(key) {
        Ok(val) => val.trim().parse::<usize>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Parse any `FromStr` env var, returning `default` on missing or invalid.
fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(val) => val.parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Load priority queue configuration from environment.
fn load_priority_config() -> PriorityQueueConfig {
    let max_priority = parse_usize("GG_QUEUE_MAX_PRIORITY", DEFAULT_MAX_PRIORITY);
    let max_priority = max_priority.min(LARGE_MAX_PRIORITY); // ceiling: one queue per level
    let wait_limit = parse_usize("GG_QUEUE_WAIT_LIMIT", DEFAULT_WAIT_LIMIT);
    PriorityQueueConfig { max_priority, wait_limit }
}

/// Load bounded queue configuration from environment.
fn load_limit_config() -> LimitQueueConfig {
    let max_items = parse_usize("GG_QUEUE_MAX_ITEMS", DEFAULT_MAX_ITEMS);
    let max_items = max_items.max(1); // floor: one slot
    let strategy = parse_or("GG_QUEUE_LIMIT_STRATEGY", LimitStrategy::Reject);
    LimitQueueConfig { max_items, strategy }
}

/// Load simulation workload from environment.
fn load_simulation_config() -> SimulationConfig {
    let producers = parse_usize("GG_QUEUE_PRODUCERS", DEFAULT_PRODUCERS).max(1);
    let consumers = parse_usize("GG_QUEUE_CONSUMERS", 0);
    let items_per_producer =
        parse_usize("GG_QUEUE_ITEMS_PER_PRODUCER", DEFAULT_ITEMS_PER_PRODUCER);
    SimulationConfig { producers, consumers, items_per_producer }
}

/// Load logging configuration from environment.
fn load_log_config() -> LogConfig {
    let level = std::env::var("GG_QUEUE_LOG_LEVEL")
        .ok()
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| "info".to_string());
    let format = parse_or("GG_QUEUE_LOG_FORMAT", LogFormat::Json);
    LogConfig { format, level, output_path: None }
}

/// Load all configuration from environment variables.
///
/// Missing or invalid values fall back to safe defaults without panicking.
pub fn load() -> EnvConfig {
    EnvConfig {
        priority: load_priority_config(),
        limit: load_limit_config(),
        simulation: load_simulation_config(),
        log: load_log_config(),
    }
}

impl EnvConfig {
    /// Return a serializable summary of all effective values.
    pub fn effective_config(&self) -> EffectiveConfig {
        EffectiveConfig {
            max_priority: self.priority.max_priority,
            wait_limit: self.priority.wait_limit,
            max_items: self.limit.max_items,
            limit_strategy: self.limit.strategy,
            producers: self.simulation.producers,
            consumers: self.simulation.effective_consumers(),
            items_per_producer: self.simulation.items_per_producer,
            log_level: self.log.level.clone(),
            log_format: self.log.format,
        }
    }
}
