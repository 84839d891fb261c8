//! The fetch side of the crawl: the HTTP(S)/file transport (`downloader`)
//! and the per-destination worker built on top of it (`worker`). The
//! coordinator and worker pool that drive these live at the crate root
//! (`crate::coordinator`, `crate::pool`), since they are specific to this
//! crawl rather than to fetching a single destination.

pub mod counter;
pub mod downloader;
pub mod worker;

pub use downloader::{Downloaded, Downloader, SimpleDownloader};
pub use worker::{CrawlWorker, WorkItem, WorkerMessage};
