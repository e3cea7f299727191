// Copyright 2024-2026 GG-CORE Contributors
// SPDX-License-Identifier: Apache-2.0

//! Config CLI subcommands: show, defaults, validate.
//!
//! These commands read configuration directly from environment variables.

use crate::config::{self, EffectiveConfig, LARGE_MAX_PRIORITY};
use crate::queue::LimitStrategy;
use crate::telemetry::LogFormat;

/// Print effective config as key-value pairs (or JSON) to stdout.
pub fn run_show(json_output: bool) -> i32 {
    let cfg = config::load().effective_config();
    if json_output {
        match serde_json::to_string_pretty(&cfg) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize config: {}", e);
                return 1;
            }
        }
    } else {
        print_config(&cfg);
    }
    0
}

/// Print default config values (no env overrides) to stdout.
pub fn run_defaults() {
    println!("GG_QUEUE_MAX_PRIORITY={}", config::DEFAULT_MAX_PRIORITY);
    println!("GG_QUEUE_WAIT_LIMIT={}", config::DEFAULT_WAIT_LIMIT);
    println!("GG_QUEUE_MAX_ITEMS={}", config::DEFAULT_MAX_ITEMS);
    println!("GG_QUEUE_LIMIT_STRATEGY={}", LimitStrategy::default());
    println!("GG_QUEUE_PRODUCERS={}", config::DEFAULT_PRODUCERS);
    println!("GG_QUEUE_CONSUMERS=0");
    println!("GG_QUEUE_ITEMS_PER_PRODUCER={}", config::DEFAULT_ITEMS_PER_PRODUCER);
    println!("GG_QUEUE_LOG_LEVEL=info");
    println!("GG_QUEUE_LOG_FORMAT={}", LogFormat::default());
}

/// Validate configuration for obvious misconfigurations.
///
/// Returns 0 if valid, 1 if any warnings are found.
pub fn run_validate() -> i32 {
    let warnings = collect_warnings();
    for warning in &warnings {
        eprintln!("WARNING: {}", warning);
    }
    if warnings.is_empty() {
        println!("Configuration is valid.");
        0
    } else {
        1
    }
}

/// Settings that load without error but are probably not what was meant.
pub fn collect_warnings() -> Vec<String> {
    let cfg = config::load().effective_config();
    let mut warnings = Vec::new();

    if let Ok(raw) = std::env::var("GG_QUEUE_LIMIT_STRATEGY") {
        if let Err(e) = raw.parse::<LimitStrategy>() {
            warnings.push(format!("{}; using {}", e, cfg.limit_strategy));
        }
    }

    if let Ok(raw) = std::env::var("GG_QUEUE_LOG_FORMAT") {
        if let Err(e) = raw.parse::<LogFormat>() {
            warnings.push(format!("{}; using {}", e, cfg.log_format));
        }
    }

    if let Ok(raw) = std::env::var("GG_QUEUE_MAX_PRIORITY") {
        if raw.trim().parse::<usize>().map_or(false, |v| v > LARGE_MAX_PRIORITY) {
            warnings.push(format!(
                "GG_QUEUE_MAX_PRIORITY ({}) allocates one queue per level; clamped to {}",
                raw.trim(),
                cfg.max_priority
            ));
        }
    }

    if cfg.max_priority == 0 && cfg.wait_limit > 0 {
        warnings.push("GG_QUEUE_WAIT_LIMIT has no effect with a single level".to_string());
    }

    warnings
}

fn print_config(cfg: &EffectiveConfig) {
    println!("GG_QUEUE_MAX_PRIORITY={}", cfg.max_priority);
    println!("GG_QUEUE_WAIT_LIMIT={}", cfg.wait_limit);
    println!("GG_QUEUE_MAX_ITEMS={}", cfg.max_items);
    println!("GG_QUEUE_LIMIT_STRATEGY={}", cfg.limit_strategy);
    println!("GG_QUEUE_PRODUCERS={}", cfg.producers);
    println!("GG_QUEUE_CONSUMERS={}", cfg.consumers);
    println!("GG_QUEUE_ITEMS_PER_PRODUCER={}", cfg.items_per_producer);
    println!("GG_QUEUE_LOG_LEVEL={}", cfg.log_level);
    println!("GG_QUEUE_LOG_FORMAT={}", cfg.log_format);
}
