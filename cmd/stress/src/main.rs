//! Stress test - many jobs from many producers
//!
//! Several producer threads each run a stream of jobs against one shared
//! pool, pushing the slab and the ring hard enough to exercise both
//! exhaustion backoff and full-ring backpressure.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use jobring::{Pool, PoolConfig, PoolError};

const PRODUCERS: usize = 4;
const JOBS_PER_PRODUCER: usize = 200;
const TASKS_PER_JOB: usize = 64;

fn main() {
    env_logger::init();

    println!("=== jobring stress ===\n");

    let config = PoolConfig::from_env()
        .max_jobs(32)
        .queue_capacity(128);
    let pool = Arc::new(Pool::new(config).expect("failed to start pool"));
    println!(
        "pool: {} workers, {} job slots, {} producers x {} jobs x {} tasks\n",
        pool.worker_count(),
        pool.job_capacity(),
        PRODUCERS,
        JOBS_PER_PRODUCER,
        TASKS_PER_JOB,
    );

    let executed = Arc::new(AtomicU64::new(0));
    let callbacks = Arc::new(AtomicU64::new(0));
    let backoffs = Arc::new(AtomicUsize::new(0));
    let start = Instant::now();

    let mut producers = Vec::with_capacity(PRODUCERS);
    for p in 0..PRODUCERS {
        let pool = Arc::clone(&pool);
        let executed = Arc::clone(&executed);
        let callbacks = Arc::clone(&callbacks);
        let backoffs = Arc::clone(&backoffs);

        producers.push(thread::spawn(move || {
            for _ in 0..JOBS_PER_PRODUCER {
                // Slab exhaustion is expected under this load; back off by
                // yielding until a slot frees up.
                let job = loop {
                    match pool.begin() {
                        Ok(job) => break job,
                        Err(PoolError::NoJobsFree) => {
                            backoffs.fetch_add(1, Ordering::Relaxed);
                            thread::yield_now();
                        }
                        Err(e) => panic!("begin failed: {}", e),
                    }
                };

                for _ in 0..TASKS_PER_JOB {
                    let executed = Arc::clone(&executed);
                    pool.add(&job, move || {
                        executed.fetch_add(1, Ordering::Relaxed);
                    });
                }

                let callbacks = Arc::clone(&callbacks);
                pool.commit(&job, Some(Box::new(move || {
                    callbacks.fetch_add(1, Ordering::Relaxed);
                })));
                pool.wait(&job);
            }
            println!("producer {} done", p);
        }));
    }

    for handle in producers {
        handle.join().expect("producer panicked");
    }

    let elapsed = start.elapsed();
    let total_jobs = (PRODUCERS * JOBS_PER_PRODUCER) as u64;
    let total_tasks = total_jobs * TASKS_PER_JOB as u64;

    println!("\nelapsed:          {:?}", elapsed);
    println!("tasks executed:   {} (expected {})", executed.load(Ordering::Relaxed), total_tasks);
    println!("callbacks fired:  {} (expected {})", callbacks.load(Ordering::Relaxed), total_jobs);
    println!("begin backoffs:   {}", backoffs.load(Ordering::Relaxed));
    println!("free job slots:   {}/{}", pool.free_jobs(), pool.job_capacity());

    assert_eq!(executed.load(Ordering::Relaxed), total_tasks);
    assert_eq!(callbacks.load(Ordering::Relaxed), total_jobs);

    println!("\n=== stress complete ===");
}
