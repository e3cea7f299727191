// Copyright 2024-2026 GG-CORE Contributors
// SPDX-License-Identifier: Apache-2.0

//! Simulate subcommand: concurrent producers and consumers over a
//! configured `PriorityQueue`.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use rand::Rng;
use serde::Serialize;
use tracing::info;

use crate::config::{PriorityQueueConfig, SimulationConfig};
use crate::queue::PriorityQueue;
use crate::telemetry;

/// A simulated unit of work.
#[derive(Debug, Clone, Copy)]
struct Job {
    level: usize,
}

/// Outcome of a simulation run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub max_priority: usize,
    pub wait_limit: usize,
    pub producers: usize,
    pub consumers: usize,
    pub produced: usize,
    pub consumed: usize,
    /// Items served per priority level.
    pub served: BTreeMap<usize, usize>,
    pub elapsed_ms: u64,
}

/// Run producers and consumers until every produced item has been served.
///
/// The consumer that takes the last expected item closes the queue, which
/// releases the other consumers.
pub fn run_simulation(queue: &PriorityQueueConfig, workload: &SimulationConfig) -> SimulationReport {
    let pq = Arc::new(PriorityQueue::<Job>::from_config(queue));
    let consumers = workload.effective_consumers();
    let expected = workload.producers.saturating_mul(workload.items_per_producer);
    let taken = Arc::new(AtomicUsize::new(0));
    let started = Instant::now();

    info!(
        max_priority = queue.max_priority,
        wait_limit = queue.wait_limit,
        producers = workload.producers,
        consumers,
        "starting simulation"
    );

    let consumer_handles: Vec<_> = (0..consumers)
        .map(|_| {
            let pq = Arc::clone(&pq);
            let taken = Arc::clone(&taken);
            thread::spawn(move || {
                let mut served = BTreeMap::new();
                while let Some(job) = pq.remove_wait() {
                    *served.entry(job.level).or_insert(0usize) += 1;
                    telemetry::record_queue_depth("simulation", pq.len());
                    if taken.fetch_add(1, Ordering::SeqCst) + 1 == expected {
                        pq.close();
                    }
                }
                served
            })
        })
        .collect();

    let producer_handles: Vec<_> = (0..workload.producers)
        .map(|_| {
            let pq = Arc::clone(&pq);
            let items = workload.items_per_producer;
            let max_priority = queue.max_priority;
            thread::spawn(move || {
                let mut rng = rand::thread_rng();
                for _ in 0..items {
                    let level = rng.gen_range(0..=max_priority);
                    pq.add(Job { level }, level);
                }
                items
            })
        })
        .collect();

    let produced: usize = producer_handles
        .into_iter()
        .map(|h| h.join().unwrap_or(0))
        .sum();

    // Nothing left for a consumer to close on.
    if expected == 0 || produced < expected {
        pq.close();
    }

    let mut served = BTreeMap::new();
    for handle in consumer_handles {
        if let Ok(counts) = handle.join() {
            for (level, count) in counts {
                *served.entry(level).or_insert(0) += count;
            }
        }
    }
    let consumed: usize = served.values().sum();
    telemetry::record_queue_depth("simulation", 0);

    let report = SimulationReport {
        max_priority: queue.max_priority,
        wait_limit: queue.wait_limit,
        producers: workload.producers,
        consumers,
        produced,
        consumed,
        served,
        elapsed_ms: started.elapsed().as_millis() as u64,
    };
    info!(produced, consumed, elapsed_ms = report.elapsed_ms, "simulation finished");
    report
}
