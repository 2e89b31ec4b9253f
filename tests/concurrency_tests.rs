//! Concurrency Tests for FlatDB
//!
//! Tests covering:
//! - Concurrent upserts keeping rows and ids aligned
//! - Searches racing with upserts and compactions
//! - Deletes issued during compaction
//! - Deadlock detection across all operations

mod common;

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use flatdb::UpsertItem;
use tokio::time::{timeout, Duration};

use common::{assert_well_formed, random_vector, seeded_vector, test_engine};

// ============================================================================
// RACE CONDITION TESTS
// ============================================================================

/// Test: Concurrent upserts never tear the parallel row/id arrays
#[test]
fn test_concurrent_upserts() {
    let dims = 8;
    let engine = Arc::new(test_engine(dims, 100));

    let num_threads = 8;
    let batches_per_thread = 50;
    let batch_size = 5;

    let handles: Vec<_> = (0..num_threads)
        .map(|thread_id| {
            let engine = engine.clone();
            thread::spawn(move || {
                for batch in 0..batches_per_thread {
                    let items: Vec<UpsertItem> = (0..batch_size)
                        .map(|i| {
                            let n = (thread_id * batches_per_thread + batch) * batch_size + i;
                            UpsertItem::new(format!("t{n}"), seeded_vector(dims, n as u64))
                        })
                        .collect();
                    engine.upsert(items).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let expected = num_threads * batches_per_thread * batch_size;
    assert_eq!(engine.stats().count, expected);
    engine.with_store(|store| {
        assert_eq!(store.ids().len(), store.row_count());
        let unique: HashSet<&String> = store.ids().iter().collect();
        assert_eq!(unique.len(), expected);
    });
}

/// Test: Searches see a consistent store while writers append
#[test]
fn test_concurrent_upsert_and_search() {
    let dims = 8;
    let engine = Arc::new(test_engine(dims, 50));

    let running = Arc::new(AtomicBool::new(true));
    let write_count = Arc::new(AtomicU64::new(0));
    let search_count = Arc::new(AtomicU64::new(0));

    let mut handles = vec![];

    // Writer threads
    for writer_id in 0..3u64 {
        let engine = engine.clone();
        let running = running.clone();
        let write_count = write_count.clone();
        handles.push(thread::spawn(move || {
            let mut id = writer_id * 100_000;
            while running.load(Ordering::Relaxed) && id < writer_id * 100_000 + 2_000 {
                engine
                    .upsert(vec![UpsertItem::new(format!("w{id}"), random_vector(dims))])
                    .unwrap();
                write_count.fetch_add(1, Ordering::Relaxed);
                id += 1;
            }
        }));
    }

    // Reader threads
    for _ in 0..3 {
        let engine = engine.clone();
        let running = running.clone();
        let search_count = search_count.clone();
        handles.push(thread::spawn(move || {
            for _ in 0..500 {
                let results = engine.search(&random_vector(dims), 10).unwrap();
                assert!(results.len() <= 10);
                assert_well_formed(&results);
                search_count.fetch_add(1, Ordering::Relaxed);
            }
            running.store(false, Ordering::Relaxed);
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(write_count.load(Ordering::Relaxed) > 0);
    assert_eq!(search_count.load(Ordering::Relaxed), 1500);
    assert_eq!(
        engine.stats().count as u64,
        write_count.load(Ordering::Relaxed)
    );
}

/// Test: Deletes issued while compactions run are neither lost nor doubled
#[test]
fn test_deletes_during_compaction() {
    let dims = 8;
    let total = 2_000u64;
    let engine = Arc::new(test_engine(dims, 100));

    let items: Vec<UpsertItem> = (0..total)
        .map(|i| UpsertItem::new(format!("v{i}"), seeded_vector(dims, i)))
        .collect();
    engine.upsert(items).unwrap();

    let done = Arc::new(AtomicBool::new(false));

    let compactor = {
        let engine = engine.clone();
        let done = done.clone();
        thread::spawn(move || {
            let mut removed = 0;
            while !done.load(Ordering::Acquire) {
                removed += engine.compact().removed;
            }
            removed
        })
    };

    let deleter = {
        let engine = engine.clone();
        thread::spawn(move || {
            let mut newly = 0;
            for i in (0..total).filter(|i| i % 4 == 0) {
                newly += engine.delete([format!("v{i}")]);
                // Repeat: never counted twice
                newly += engine.delete([format!("v{i}")]);
            }
            newly
        })
    };

    let newly = deleter.join().unwrap();
    done.store(true, Ordering::Release);
    let mut removed = compactor.join().unwrap();
    removed += engine.compact().removed;

    // An id deleted again after its compaction is a fresh tombstone
    assert!(newly >= 500);
    assert_eq!(removed, newly);

    let stats = engine.stats();
    assert_eq!(stats.tombstones, 0);
    assert_eq!(stats.count, 1500);
    engine.with_store(|store| {
        assert!(store
            .ids()
            .iter()
            .all(|id| id[1..].parse::<u64>().unwrap() % 4 != 0));
    });
}

/// Test: Once delete returns, no later search returns the id
#[test]
fn test_delete_visible_to_subsequent_search() {
    let dims = 8;
    let total = 300u64;
    let engine = Arc::new(test_engine(dims, 100));
    let items: Vec<UpsertItem> = (0..total)
        .map(|i| UpsertItem::new(format!("v{i}"), seeded_vector(dims, i)))
        .collect();
    engine.upsert(items).unwrap();

    let done = Arc::new(AtomicBool::new(false));
    let compactor = {
        let engine = engine.clone();
        let done = done.clone();
        thread::spawn(move || {
            while !done.load(Ordering::Acquire) {
                engine.compact();
                thread::yield_now();
            }
        })
    };

    for i in 0..total {
        let id = format!("v{i}");
        engine.delete([id.clone()]);
        let hits = engine.search(&seeded_vector(dims, i), 5).unwrap();
        assert!(
            hits.iter().all(|h| h.id != id),
            "{} returned after delete",
            id
        );
    }

    done.store(true, Ordering::Release);
    compactor.join().unwrap();

    engine.compact();
    assert_eq!(engine.stats().count, 0);
}

// ============================================================================
// DEADLOCK DETECTION
// ============================================================================

/// Test: Mixed operations on blocking tasks finish within a timeout
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_no_deadlock_mixed_operations() {
    let dims = 8;
    let engine = Arc::new(test_engine(dims, 50));

    let mut handles = vec![];
    for worker in 0..8u64 {
        let engine = engine.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            for i in 0..200u64 {
                let n = worker * 1_000 + i;
                match (worker + i) % 4 {
                    0 => {
                        engine
                            .upsert(vec![UpsertItem::new(format!("m{n}"), seeded_vector(dims, n))])
                            .unwrap();
                    }
                    1 => {
                        engine.delete([format!("m{}", n.saturating_sub(3))]);
                    }
                    2 => {
                        engine.compact();
                    }
                    _ => {
                        engine.search(&seeded_vector(dims, n), 10).unwrap();
                    }
                }
            }
        }));
    }

    let all = async {
        for handle in handles {
            handle.await.unwrap();
        }
    };
    timeout(Duration::from_secs(30), all)
        .await
        .expect("operations deadlocked");

    engine.compact();
    engine.with_store(|store| assert_eq!(store.ids().len(), store.row_count()));
}
