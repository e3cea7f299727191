//! Tests for the multi-level priority queue and its fairness policy.

use gg_queue::config::PriorityQueueConfig;
use gg_queue::queue::PriorityQueue;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn wait_for_waiters<T>(queue: &PriorityQueue<T>, expected: usize) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while queue.waiters() < expected {
        assert!(Instant::now() < deadline, "callers never blocked");
        thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn strict_priority_walkthrough() {
    let pq = PriorityQueue::with_wait_limit(2, 0);
    pq.add(5, 1);
    pq.add(1, 0);
    pq.add(2, 2);
    pq.add(3, 1);
    assert_eq!(pq.len(), 4);

    assert_eq!(pq.peek_p(0), Some(1));
    assert_eq!(pq.remove_p(0), Some(1));
    assert_eq!(pq.len(), 3);

    assert_eq!(pq.remove(), Some(2));
    assert_eq!(pq.remove(), Some(5));
    assert_eq!(pq.peek(), Some(3));
    assert_eq!(pq.len(), 1);
}

#[test]
fn higher_levels_are_served_first() {
    let pq = PriorityQueue::new(3);
    pq.add("low", 0);
    pq.add("critical", 3);
    pq.add("normal", 1);

    assert_eq!(pq.remove(), Some("critical"));
    assert_eq!(pq.remove(), Some("normal"));
    assert_eq!(pq.remove(), Some("low"));
    assert_eq!(pq.remove(), None);
}

#[test]
fn fifo_within_one_level() {
    let pq = PriorityQueue::new(1);
    pq.add("first", 1);
    pq.add("second", 1);
    pq.add("third", 1);

    assert_eq!(pq.remove(), Some("first"));
    assert_eq!(pq.remove(), Some("second"));
    assert_eq!(pq.remove(), Some("third"));
}

#[test]
fn out_of_range_priority_is_clipped_on_add() {
    let pq = PriorityQueue::new(2);
    pq.add('x', 50);

    assert_eq!(pq.lens(), BTreeMap::from([(2, 1)]));
    assert_eq!(pq.peek_p(2), Some('x'));
}

#[test]
fn out_of_range_level_lookups_are_absent() {
    let pq = PriorityQueue::new(2);
    pq.add(1, 2);

    assert_eq!(pq.peek_p(3), None);
    assert_eq!(pq.remove_p(3), None);
    assert_eq!(pq.remove_p_wait(3), None);
    assert_eq!(pq.peek_p_wait(3), None);
    assert_eq!(pq.len(), 1);
}

#[test]
fn remove_p_on_empty_level_is_absent() {
    let pq = PriorityQueue::new(2);
    pq.add(1, 2);
    assert_eq!(pq.remove_p(1), None);
    assert_eq!(pq.len(), 1);
}

#[test]
fn lens_reports_only_occupied_levels() {
    let pq = PriorityQueue::new(4);
    pq.add(0, 0);
    pq.add(1, 3);
    pq.add(2, 3);

    assert_eq!(pq.lens(), BTreeMap::from([(0, 1), (3, 2)]));
    assert_eq!(pq.len(), 3);
}

#[test]
fn top_falls_back_after_level_specific_removal() {
    let pq = PriorityQueue::new(3);
    pq.add("low", 0);
    pq.add("high", 3);

    assert_eq!(pq.remove_p(3), Some("high"));
    assert_eq!(pq.peek(), Some("low"));
    assert_eq!(pq.remove(), Some("low"));
    assert!(pq.is_empty());
}

#[test]
fn strict_priority_starves_low_level() {
    let pq = PriorityQueue::with_wait_limit(1, 0);
    pq.add(-1, 0);
    for i in 0..20 {
        pq.add(i, 1);
    }

    for i in 0..20 {
        assert_eq!(pq.remove(), Some(i));
    }
    assert_eq!(pq.remove(), Some(-1));
}

#[test]
fn wait_limit_promotes_starved_level() {
    const WAIT_LIMIT: usize = 3;
    let pq = PriorityQueue::with_wait_limit(2, WAIT_LIMIT);
    pq.add("starved", 0);
    for _ in 0..10 {
        pq.add("busy", 2);
    }

    for _ in 0..WAIT_LIMIT {
        assert_eq!(pq.remove(), Some("busy"));
    }
    assert_eq!(pq.remove(), Some("starved"));
    assert_eq!(pq.lens(), BTreeMap::from([(2, 10 - WAIT_LIMIT)]));
}

#[test]
fn starved_levels_are_served_repeatedly() {
    let pq = PriorityQueue::with_wait_limit(1, 2);
    for i in 0..3 {
        pq.add(100 + i, 0);
    }
    for i in 0..10 {
        pq.add(i, 1);
    }

    let order: Vec<_> = (0..9).filter_map(|_| pq.remove()).collect();
    assert_eq!(order, vec![0, 1, 100, 2, 3, 101, 4, 5, 102]);
}

#[test]
fn peek_matches_next_fair_remove_without_advancing() {
    let pq = PriorityQueue::with_wait_limit(1, 1);
    pq.add("low", 0);
    pq.add("high-a", 1);
    pq.add("high-b", 1);

    assert_eq!(pq.peek(), Some("high-a"));
    assert_eq!(pq.peek(), Some("high-a"));
    assert_eq!(pq.remove(), Some("high-a"));

    // level 0 has now been skipped once
    assert_eq!(pq.peek(), Some("low"));
    assert_eq!(pq.remove(), Some("low"));
    assert_eq!(pq.remove(), Some("high-b"));
}

#[test]
fn level_specific_service_resets_starvation() {
    let pq = PriorityQueue::with_wait_limit(1, 2);
    pq.add("low-a", 0);
    pq.add("low-b", 0);
    for _ in 0..5 {
        pq.add("high", 1);
    }

    assert_eq!(pq.remove(), Some("high"));
    assert_eq!(pq.remove_p(0), Some("low-a"));

    // counter restarted: two more skips before promotion
    assert_eq!(pq.remove(), Some("high"));
    assert_eq!(pq.remove(), Some("high"));
    assert_eq!(pq.remove(), Some("low-b"));
}

#[test]
fn clear_resets_everything() {
    let pq = PriorityQueue::with_wait_limit(2, 1);
    pq.add(1, 0);
    pq.add(2, 2);
    pq.remove();
    pq.clear();

    assert_eq!(pq.len(), 0);
    assert!(pq.lens().is_empty());
    assert_eq!(pq.remove(), None);

    pq.add(3, 1);
    assert_eq!(pq.remove(), Some(3));
}

#[test]
fn from_config_applies_levels_and_wait_limit() {
    let config = PriorityQueueConfig { max_priority: 5, wait_limit: 2 };
    let pq: PriorityQueue<u8> = PriorityQueue::from_config(&config);
    assert_eq!(pq.max_priority(), 5);
    assert_eq!(pq.wait_limit(), 2);
}

#[test]
fn single_level_queue_is_plain_fifo() {
    let pq = PriorityQueue::with_wait_limit(0, 4);
    pq.add('a', 0);
    pq.add('b', 9);

    assert_eq!(pq.lens(), BTreeMap::from([(0, 2)]));
    assert_eq!(pq.remove(), Some('a'));
    assert_eq!(pq.remove(), Some('b'));
}

#[test]
fn remove_wait_receives_next_add() {
    let pq = Arc::new(PriorityQueue::new(3));
    let consumer = {
        let pq = Arc::clone(&pq);
        thread::spawn(move || pq.remove_wait())
    };

    wait_for_waiters(&pq, 1);
    pq.add("job", 2);

    assert_eq!(consumer.join().unwrap(), Some("job"));
    assert!(pq.is_empty());
}

#[test]
fn level_waiter_ignores_other_levels() {
    let pq = Arc::new(PriorityQueue::new(2));
    let consumer = {
        let pq = Arc::clone(&pq);
        thread::spawn(move || pq.remove_p_wait(0))
    };

    wait_for_waiters(&pq, 1);
    pq.add("high", 2);
    thread::sleep(Duration::from_millis(20));
    assert_eq!(pq.waiters(), 1);
    assert_eq!(pq.len(), 1);

    pq.add("low", 0);
    assert_eq!(consumer.join().unwrap(), Some("low"));
    assert_eq!(pq.remove(), Some("high"));
}

#[test]
fn peek_p_wait_leaves_item_queued() {
    let pq = Arc::new(PriorityQueue::new(1));
    let peeker = {
        let pq = Arc::clone(&pq);
        thread::spawn(move || pq.peek_p_wait(1))
    };

    wait_for_waiters(&pq, 1);
    pq.add(8, 1);

    assert_eq!(peeker.join().unwrap(), Some(8));
    assert_eq!(pq.len(), 1);
    assert_eq!(pq.peek_wait(), Some(8));
}

#[test]
fn concurrent_producers_and_consumers_account_for_every_item() {
    const PRODUCERS: usize = 4;
    const CONSUMERS: usize = 3;
    const PER_PRODUCER: usize = 500;
    let pq = Arc::new(PriorityQueue::with_wait_limit(3, 2));

    let consumers: Vec<_> = (0..CONSUMERS)
        .map(|_| {
            let pq = Arc::clone(&pq);
            thread::spawn(move || {
                let mut taken = 0usize;
                while pq.remove_wait().is_some() {
                    taken += 1;
                }
                taken
            })
        })
        .collect();

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|p| {
            let pq = Arc::clone(&pq);
            thread::spawn(move || {
                for i in 0..PER_PRODUCER {
                    pq.add((p, i), i % 4);
                }
            })
        })
        .collect();
    for h in producers {
        h.join().unwrap();
    }

    let deadline = Instant::now() + Duration::from_secs(10);
    while !pq.is_empty() {
        assert!(Instant::now() < deadline, "consumers stalled");
        thread::sleep(Duration::from_millis(1));
    }
    pq.close();

    let taken: usize = consumers.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(taken, PRODUCERS * PER_PRODUCER);
}

/// Item whose destructor reads back into the queue that held it.
struct Reentrant {
    owner: std::sync::Weak<PriorityQueue<Reentrant>>,
    dropped: Arc<std::sync::atomic::AtomicUsize>,
}

impl Drop for Reentrant {
    fn drop(&mut self) {
        if let Some(pq) = self.owner.upgrade() {
            let _ = pq.len();
        }
        self.dropped.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }
}

fn fill_reentrant(pq: &Arc<PriorityQueue<Reentrant>>) -> Arc<std::sync::atomic::AtomicUsize> {
    let dropped = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    for level in 0..=2 {
        pq.add(
            Reentrant { owner: Arc::downgrade(pq), dropped: Arc::clone(&dropped) },
            level,
        );
    }
    dropped
}

fn run_with_deadline(f: impl FnOnce() + Send + 'static) {
    let (done_tx, done_rx) = std::sync::mpsc::channel();
    thread::spawn(move || {
        f();
        let _ = done_tx.send(());
    });
    assert!(
        done_rx.recv_timeout(Duration::from_secs(5)).is_ok(),
        "operation deadlocked"
    );
}

#[test]
fn clear_drops_items_outside_the_lock() {
    let pq = Arc::new(PriorityQueue::new(2));
    let dropped = fill_reentrant(&pq);

    let clearing = Arc::clone(&pq);
    run_with_deadline(move || clearing.clear());

    assert_eq!(dropped.load(std::sync::atomic::Ordering::SeqCst), 3);
    assert!(pq.is_empty());
}

#[test]
fn close_drops_items_outside_the_lock() {
    let pq = Arc::new(PriorityQueue::new(2));
    let dropped = fill_reentrant(&pq);

    let closing = Arc::clone(&pq);
    run_with_deadline(move || closing.close());

    assert_eq!(dropped.load(std::sync::atomic::Ordering::SeqCst), 3);
    assert!(pq.is_closed());
}
