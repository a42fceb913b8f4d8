//! Basic jobring example
//!
//! Fans a batch of tasks out over the pool, waits for the job, then runs
//! a second job that signals completion through a callback instead.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use jobring::{Pool, PoolConfig};

fn main() {
    env_logger::init();

    println!("=== jobring basic example ===\n");

    let config = PoolConfig::from_env().workers(4);
    let pool = Pool::new(config).expect("failed to start pool");
    println!(
        "pool: {} workers, {} job slots\n",
        pool.worker_count(),
        pool.job_capacity(),
    );

    // Job 1: blocking wait.
    let sum = Arc::new(AtomicU64::new(0));
    let job = pool.begin().expect("no job slots free");
    for i in 0..1000u64 {
        let sum = Arc::clone(&sum);
        pool.add(&job, move || {
            sum.fetch_add(i, Ordering::Relaxed);
        });
    }
    pool.commit(&job, None);
    pool.wait(&job);
    println!("job 1: sum of 0..1000 = {}", sum.load(Ordering::Relaxed));

    // Job 2: completion callback.
    let fired = Arc::new(AtomicUsize::new(0));
    let job = pool.begin().expect("no job slots free");
    for _ in 0..32 {
        pool.add(&job, || {
            std::thread::sleep(std::time::Duration::from_millis(1));
        });
    }
    let f = Arc::clone(&fired);
    pool.commit(&job, Some(Box::new(move || {
        f.fetch_add(1, Ordering::SeqCst);
        println!("job 2: callback fired on the last-completing worker");
    })));
    pool.wait(&job);
    println!("job 2: callback count = {}", fired.load(Ordering::SeqCst));

    println!("\nfree job slots: {}/{}", pool.free_jobs(), pool.job_capacity());
    println!("\n=== example complete ===");
}
