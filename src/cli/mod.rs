// Copyright 2024-2026 GG-CORE Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI module for GG-QUEUE commands.
//!
//! Provides configuration inspection and a producer/consumer simulation
//! that exercises a configured priority queue end to end.
//!
//! ## Usage
//!
//! ```bash
//! gg-queue-cli config show      # Effective configuration
//! gg-queue-cli config defaults  # Documented defaults
//! gg-queue-cli config validate  # Warn about suspicious settings
//! gg-queue-cli simulate         # Run the producer/consumer workload
//! ```

pub mod config_cmd;
pub mod simulate_cmd;

pub use simulate_cmd::{run_simulation, SimulationReport};
