//! End-to-end scenarios for the worker-pool job system.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use jobring::{Pool, PoolConfig, PoolError};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn pool(workers: usize, max_jobs: usize, queue: usize) -> Pool {
    Pool::new(
        PoolConfig::new()
            .workers(workers)
            .max_jobs(max_jobs)
            .queue_capacity(queue),
    )
    .unwrap()
}

// Fan-out sum: 1000 tasks, each adds its index to a shared accumulator.
#[test]
fn fan_out_sum() {
    init_logging();
    let pool = pool(4, 256, 256);
    let sum = Arc::new(AtomicU64::new(0));

    let job = pool.begin().unwrap();
    for i in 0..1000u64 {
        let sum = Arc::clone(&sum);
        pool.add(&job, move || {
            sum.fetch_add(i, Ordering::Relaxed);
        });
    }
    pool.commit(&job, None);
    pool.wait(&job);

    assert_eq!(sum.load(Ordering::Relaxed), 499500);
    assert_eq!(pool.free_jobs(), pool.job_capacity());
}

// The completion callback fires exactly once, on the last-completing worker.
#[test]
fn callback_fires_exactly_once() {
    init_logging();
    let pool = pool(8, 256, 256);
    let fired = Arc::new(AtomicUsize::new(0));

    let job = pool.begin().unwrap();
    for _ in 0..32 {
        pool.add(&job, || thread::sleep(Duration::from_millis(1)));
    }
    let f = Arc::clone(&fired);
    pool.commit(&job, Some(Box::new(move || {
        f.fetch_add(1, Ordering::SeqCst);
    })));
    pool.wait(&job);

    assert_eq!(fired.load(Ordering::SeqCst), 1);
    // A second wait on the now-recycled handle returns immediately.
    pool.wait(&job);
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

// Ring backpressure: far more tasks than ring slots, a single worker. The
// producer blocks transiently on `add`; every task still runs, and the
// number of queued tasks never exceeds capacity - 1.
#[test]
fn ring_backpressure() {
    init_logging();
    let pool = pool(1, 16, 256);
    let executed = Arc::new(AtomicUsize::new(0));
    let max_queued = Arc::new(AtomicUsize::new(0));
    let done = Arc::new(AtomicBool::new(false));

    thread::scope(|s| {
        let monitor = {
            let max_queued = Arc::clone(&max_queued);
            let done = Arc::clone(&done);
            let pool = &pool;
            s.spawn(move || {
                while !done.load(Ordering::Relaxed) {
                    max_queued.fetch_max(pool.queued_tasks(), Ordering::Relaxed);
                    thread::yield_now();
                }
            })
        };

        let job = pool.begin().unwrap();
        for _ in 0..1024 {
            let executed = Arc::clone(&executed);
            pool.add(&job, move || {
                thread::sleep(Duration::from_micros(10));
                executed.fetch_add(1, Ordering::Relaxed);
            });
        }
        pool.commit(&job, None);
        pool.wait(&job);

        done.store(true, Ordering::Relaxed);
        monitor.join().unwrap();
    });

    assert_eq!(executed.load(Ordering::Relaxed), 1024);
    assert!(max_queued.load(Ordering::Relaxed) <= 255);
}

// Slab exhaustion: call 257 on a 256-slot slab fails, the first 256 are
// distinct.
#[test]
fn slab_exhaustion() {
    init_logging();
    let pool = pool(1, 256, 256);

    let jobs: Vec<_> = (0..256).map(|_| pool.begin().unwrap()).collect();
    let mut indices: Vec<u32> = jobs.iter().map(|j| j.index()).collect();
    indices.sort_unstable();
    indices.dedup();
    assert_eq!(indices.len(), 256);

    assert_eq!(pool.begin().unwrap_err(), PoolError::NoJobsFree);

    // Recycle everything so the pool tears down with a full freelist.
    for job in &jobs {
        pool.commit(job, None);
    }
    assert_eq!(pool.free_jobs(), 256);
}

// Clean shutdown: destroy returns, no worker remains, re-init succeeds.
#[test]
fn clean_shutdown_and_reinit() {
    init_logging();
    let mut first = pool(4, 256, 256);
    let sum = Arc::new(AtomicU64::new(0));

    let job = first.begin().unwrap();
    for i in 0..1000u64 {
        let sum = Arc::clone(&sum);
        first.add(&job, move || {
            sum.fetch_add(i, Ordering::Relaxed);
        });
    }
    first.commit(&job, None);
    first.wait(&job);
    assert_eq!(sum.load(Ordering::Relaxed), 499500);

    first.shutdown();
    assert_eq!(first.worker_count(), 0);

    let second = pool(4, 256, 256);
    assert_eq!(second.worker_count(), 4);
    let job = second.begin().unwrap();
    second.commit(&job, None);
    second.wait(&job);
}

// Waiting on an uncommitted job returns immediately, even with tasks
// queued. Documented sharp edge.
#[test]
fn uncommitted_wait_returns_immediately() {
    init_logging();
    let pool = pool(1, 16, 16);
    let job = pool.begin().unwrap();
    for _ in 0..4 {
        pool.add(&job, || thread::sleep(Duration::from_millis(5)));
    }

    let start = Instant::now();
    pool.wait(&job);
    assert!(start.elapsed() < Duration::from_millis(500));

    // Drain before teardown.
    pool.commit(&job, None);
    pool.wait(&job);
}

// Conservation: across many jobs, tasks run exactly as many times as they
// were queued and each callback fires once.
#[test]
fn conservation_across_jobs() {
    init_logging();
    let pool = pool(4, 16, 64);
    let runs: Vec<_> = (0..8).map(|_| Arc::new(AtomicUsize::new(0))).collect();
    let fires: Vec<_> = (0..8).map(|_| Arc::new(AtomicUsize::new(0))).collect();

    let jobs: Vec<_> = (0..8).map(|_| pool.begin().unwrap()).collect();
    for (j, job) in jobs.iter().enumerate() {
        for _ in 0..50 {
            let runs = Arc::clone(&runs[j]);
            pool.add(job, move || {
                runs.fetch_add(1, Ordering::Relaxed);
            });
        }
        let fires = Arc::clone(&fires[j]);
        pool.commit(job, Some(Box::new(move || {
            fires.fetch_add(1, Ordering::SeqCst);
        })));
    }
    for job in &jobs {
        pool.wait(job);
    }

    for j in 0..8 {
        assert_eq!(runs[j].load(Ordering::Relaxed), 50, "job {} run count", j);
        assert_eq!(fires[j].load(Ordering::SeqCst), 1, "job {} callback count", j);
    }
    assert_eq!(pool.free_jobs(), pool.job_capacity());
}

// With a single worker, a single-producer batch executes in insertion
// order.
#[test]
fn single_worker_preserves_fifo() {
    init_logging();
    let pool = pool(1, 16, 256);
    let order = Arc::new(Mutex::new(Vec::new()));

    let job = pool.begin().unwrap();
    for i in 0..100usize {
        let order = Arc::clone(&order);
        pool.add(&job, move || {
            order.lock().unwrap().push(i);
        });
    }
    pool.commit(&job, None);
    pool.wait(&job);

    let order = order.lock().unwrap();
    assert_eq!(*order, (0..100).collect::<Vec<_>>());
}

// No leaks: after arbitrary begin/add/commit/wait traffic, the freelist is
// full again.
#[test]
fn freelist_restored_after_traffic() {
    init_logging();
    let pool = pool(2, 8, 32);
    for round in 0..100usize {
        let job = pool.begin().unwrap();
        for _ in 0..(round % 7) {
            pool.add(&job, || {});
        }
        pool.commit(&job, None);
        pool.wait(&job);
    }
    assert_eq!(pool.free_jobs(), pool.job_capacity());
}

// Writes a task performs before its decrement are visible to the callback
// and to the waiter.
#[test]
fn completion_visibility() {
    init_logging();
    let pool = pool(4, 16, 64);
    let payload = Arc::new(AtomicU32::new(0));
    let seen_by_callback = Arc::new(AtomicU32::new(0));

    let job = pool.begin().unwrap();
    {
        let payload = Arc::clone(&payload);
        pool.add(&job, move || {
            payload.store(42, Ordering::Relaxed);
        });
    }
    let payload_cb = Arc::clone(&payload);
    let seen = Arc::clone(&seen_by_callback);
    pool.commit(&job, Some(Box::new(move || {
        seen.store(payload_cb.load(Ordering::Relaxed), Ordering::SeqCst);
    })));
    pool.wait(&job);

    assert_eq!(seen_by_callback.load(Ordering::SeqCst), 42);
    assert_eq!(payload.load(Ordering::Relaxed), 42);
}

// The global convenience instance mirrors the Pool surface.
#[test]
fn global_facade_roundtrip() {
    init_logging();
    let config = PoolConfig::new().workers(2).max_jobs(8).queue_capacity(32);
    jobring::init(config).unwrap();

    let hits = Arc::new(AtomicUsize::new(0));
    let job = jobring::begin().unwrap();
    for _ in 0..16 {
        let hits = Arc::clone(&hits);
        jobring::add(&job, move || {
            hits.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    }
    jobring::commit(&job, None).unwrap();
    jobring::wait(&job).unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 16);

    jobring::shutdown();
    assert!(jobring::begin().is_err());
}
