//! The fetch worker: given `{url, should_parse}`, issues the request,
//! follows redirects, parses the body if asked to, and emits a
//! `DestinationResult` plus whatever outbound links it found.

use std::sync::Arc;

use futures::future::FutureExt;
use futures::stream::StreamExt;
use tokio::sync::mpsc;
use url::Url;

use crate::model::{DestinationResult, OutboundLink};
use crate::normalize;
use crate::parser;

use super::downloader::Downloader;

/// One unit of dispatch: a destination to fetch, and whether its body
/// should be parsed for further links and anchors (true for internal
/// destinations, false for external ones — §4.7 step 2.a).
pub struct WorkItem {
    pub url: Url,
    pub should_parse: bool,
}

/// What a worker reports back for one `WorkItem`.
pub struct WorkerMessage {
    pub result: DestinationResult,
    pub outbound: Vec<OutboundLink>,
}

fn panicked_message(url: &Url) -> WorkerMessage {
    WorkerMessage {
        result: DestinationResult {
            url: normalize::key(url),
            final_url: None,
            status_code: None,
            content_type: None,
            redirects: Vec::new(),
            is_source: false,
            anchors: Vec::new(),
            did_not_connect: true,
        },
        outbound: Vec::new(),
    }
}

pub struct CrawlWorker<D: Downloader> {
    downloader: Arc<D>,
}

impl<D: Downloader> CrawlWorker<D> {
    pub fn new(downloader: Arc<D>) -> CrawlWorker<D> {
        CrawlWorker { downloader }
    }

    /// Fetches and, if asked, parses one destination. Never fails: every
    /// outcome (success, bad status, transport failure, unparseable body)
    /// becomes a `WorkerMessage`, per §7's "all per-destination errors are
    /// captured into the Destination".
    pub async fn run_one(&self, item: WorkItem) -> WorkerMessage {
        let key = normalize::key(&item.url);
        let downloaded = self.downloader.fetch(&item.url).await;

        if downloaded.did_not_connect {
            return WorkerMessage {
                result: DestinationResult {
                    url: key,
                    final_url: None,
                    status_code: None,
                    content_type: None,
                    redirects: downloaded.redirects,
                    is_source: false,
                    anchors: Vec::new(),
                    did_not_connect: true,
                },
                outbound: Vec::new(),
            };
        }

        let final_url = downloaded.final_url.as_str().to_owned();

        let should_try_parse = item.should_parse
            && downloaded
                .content_type
                .as_ref()
                .map_or(false, |ct| ct.is_parseable());

        let (is_source, anchors, outbound) = if should_try_parse {
            let body = downloaded.body.as_deref().unwrap_or(&[]);
            let text = String::from_utf8_lossy(body);
            let content_type = downloaded.content_type.as_ref().expect("checked above");

            match parser::parse(content_type, &text) {
                Some(parsed) => (true, parsed.anchors, parsed.links),
                None => (false, Vec::new(), Vec::new()),
            }
        } else {
            (false, Vec::new(), Vec::new())
        };

        WorkerMessage {
            result: DestinationResult {
                url: key,
                final_url: Some(final_url),
                status_code: downloaded.status_code,
                content_type: downloaded.content_type,
                redirects: downloaded.redirects,
                is_source,
                anchors,
                did_not_connect: false,
            },
            outbound,
        }
    }

    /// Drains `dispatch` until it closes, running tasks concurrently up to
    /// `concurrency`, and forwards every result onto `results`. Mirrors the
    /// teacher's `CrawlWorker::run`, which drives its dispatch stream with
    /// `for_each_concurrent` and relies on the stream drying up to know when
    /// to stop — here that "stream drying up" is the dispatch channel
    /// closing, which the pool does once the coordinator has no more work.
    ///
    /// A panicking fetch is caught and degraded to `did_not_connect = true`
    /// for that one URL (§7: "Worker panics are caught by the pool and
    /// reported as TransportFailure") instead of taking the whole worker
    /// down.
    pub async fn run(
        self,
        dispatch: mpsc::Receiver<WorkItem>,
        results: mpsc::UnboundedSender<WorkerMessage>,
        concurrency: usize,
    ) {
        let worker = Arc::new(self);
        let mut dispatch = dispatch;
        let stream = futures::stream::poll_fn(move |cx| dispatch.poll_recv(cx));

        stream
            .for_each_concurrent(Some(concurrency), move |item| {
                let worker = worker.clone();
                let results = results.clone();
                async move {
                    let url = item.url.clone();
                    let message =
                        match std::panic::AssertUnwindSafe(worker.run_one(item))
                            .catch_unwind()
                            .await
                        {
                            Ok(message) => message,
                            Err(_) => {
                                log::error!("worker task panicked while fetching {}", url);
                                panicked_message(&url)
                            }
                        };

                    if results.send(message).is_err() {
                        log::debug!("results channel closed, dropping message for {}", url);
                    }
                }
            })
            .await;
    }
}
