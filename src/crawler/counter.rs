//! Atomic progress counters, shared between the coordinator and a
//! background task that logs crawl progress periodically.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time;

#[derive(Debug, Default)]
pub struct Counter {
    open_count: AtomicUsize,
    closed_count: AtomicUsize,
    error_count: AtomicUsize,
}

impl Counter {
    pub fn register_open(&self) {
        self.open_count.fetch_add(1, Ordering::Release);
    }

    pub fn register_closed(&self) {
        self.closed_count.fetch_add(1, Ordering::Release);
    }

    pub fn register_error(&self) {
        self.register_closed();
        self.error_count.fetch_add(1, Ordering::Release);
    }

    pub fn n_closed(&self) -> usize {
        self.closed_count.load(Ordering::Acquire)
    }

    pub fn n_error(&self) -> usize {
        self.error_count.load(Ordering::Acquire)
    }

    pub fn n_active(&self) -> usize {
        self.open_count
            .load(Ordering::Acquire)
            .saturating_sub(self.closed_count.load(Ordering::Acquire))
    }
}

/// Logs crawl progress every second until dropped; meant to be spawned
/// alongside the coordinator loop and left to die when the crawl ends.
pub async fn log_stats(counter: Arc<Counter>) {
    loop {
        time::sleep(Duration::from_secs(1)).await;
        log::info!(
            "active: {}, closed: {}, errors: {}",
            counter.n_active(),
            counter.n_closed(),
            counter.n_error(),
        );
    }
}
