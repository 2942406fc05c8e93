//! Bounded-parallelism primitives shared by the parallel duplicate-hash and
//! integrity stages. Both acquire a permit on the submitting thread before
//! spawning a worker, so submission backpressures once every permit is held;
//! the permit is released by the worker's terminal step, success or failure.

use std::sync::{Condvar, Mutex};
use std::thread;

/// Resolve the configured job count: 0 means detect CPU count, clamped to
/// at least one permit.
pub fn resolve_max_jobs(configured: usize) -> usize {
    if configured > 0 {
        return configured;
    }
    thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

/// Counting semaphore. `acquire` blocks until a permit is free and returns a
/// guard that releases on drop, so a panicking worker still frees its permit.
pub struct Semaphore {
    permits: Mutex<usize>,
    available: Condvar,
}

impl Semaphore {
    pub fn new(permits: usize) -> Semaphore {
        Semaphore {
            permits: Mutex::new(permits.max(1)),
            available: Condvar::new(),
        }
    }

    pub fn acquire(&self) -> Permit<'_> {
        let mut permits = self.permits.lock().unwrap();
        while *permits == 0 {
            permits = self.available.wait(permits).unwrap();
        }
        *permits -= 1;
        Permit { semaphore: self }
    }

    fn release(&self) {
        let mut permits = self.permits.lock().unwrap();
        *permits += 1;
        self.available.notify_one();
    }
}

/// Held permit; moves into the worker and releases when the worker finishes.
pub struct Permit<'a> {
    semaphore: &'a Semaphore,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.semaphore.release();
    }
}
