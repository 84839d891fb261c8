//! Wires up a fixed-size pool of `CrawlWorker`s, one dispatch channel per
//! worker and a single shared results channel, round-robining work across
//! them by `hash(origin) % n_workers` so requests to the same host always
//! land on the same worker.
//!
//! The dispatch channels are bounded, giving the coordinator natural
//! backpressure; the results channel is unbounded, since only the dispatch
//! side is meant to throttle the coordinator.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::crawler::downloader::Downloader;
use crate::crawler::worker::{CrawlWorker, WorkItem, WorkerMessage};
use crate::hash::hash;

/// How many outstanding work items a worker's own dispatch channel will
/// buffer before the coordinator's send suspends.
const DISPATCH_BUFFER: usize = 8;

pub struct WorkerPool {
    dispatch: Vec<mpsc::Sender<WorkItem>>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `n_workers` worker tasks, each draining its own dispatch
    /// channel with up to `concurrency_per_worker` fetches in flight at
    /// once, and forwarding every result onto `results`.
    pub fn spawn<D: Downloader>(
        downloader: Arc<D>,
        n_workers: usize,
        concurrency_per_worker: usize,
        results: mpsc::UnboundedSender<WorkerMessage>,
    ) -> WorkerPool {
        let mut dispatch = Vec::with_capacity(n_workers);
        let mut handles = Vec::with_capacity(n_workers);

        for worker_id in 0..n_workers {
            let (tx, rx) = mpsc::channel(DISPATCH_BUFFER);
            let worker = CrawlWorker::new(downloader.clone());
            let results = results.clone();

            let handle = tokio::spawn(async move {
                worker.run(rx, results, concurrency_per_worker).await;
                log::debug!("worker {} drained and exited", worker_id);
            });

            dispatch.push(tx);
            handles.push(handle);
        }

        WorkerPool { dispatch, handles }
    }

    pub fn n_workers(&self) -> usize {
        self.dispatch.len()
    }

    /// Routes `item` to the worker that owns `origin_key`'s hash. Fails only
    /// if that worker's task has already died.
    pub async fn dispatch(
        &self,
        origin_key: &str,
        item: WorkItem,
    ) -> Result<(), mpsc::error::SendError<WorkItem>> {
        let chosen = hash(origin_key) as usize % self.dispatch.len();
        self.dispatch[chosen].send(item).await
    }

    /// Closes every dispatch channel and waits for each worker to drain its
    /// in-flight tasks and exit.
    pub async fn shutdown(self) {
        drop(self.dispatch);

        for handle in self.handles {
            if let Err(error) = handle.await {
                log::error!("worker task failed to join cleanly: {}", error);
            }
        }
    }
}
