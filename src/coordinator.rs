//! The crawl coordinator: owns the destination store and the frontier,
//! dispatches work to the pool, absorbs results, and assembles the final
//! `CrawlResult`.
//!
//! Drives a "while there is work, dispatch a batch, wait for a result" loop
//! against an in-memory `VecDeque` frontier; since the whole frontier lives
//! in memory there is no need to poll it on a timer, the loop just blocks on
//! the results channel directly.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use tokio::sync::mpsc;
use url::Url;

use crate::crawler::counter::{log_stats, Counter};
use crate::crawler::downloader::Downloader;
use crate::crawler::worker::WorkItem;
use crate::glob::HostGlobMatcher;
use crate::model::{AnchorWarning, CrawlResult, Link, Origin};
use crate::normalize::{self, Normalized};
use crate::pool::WorkerPool;
use crate::store::DestinationStore;
use crate::Error;

pub struct CoordinatorOptions {
    pub connections: usize,
    pub checks_external: bool,
    pub quota: Option<usize>,
}

/// Crawls `seeds`, constrained to `globs` (or, if empty, each seed's own
/// implicit `<seed>**` glob), using `downloader` to fetch.
pub async fn crawl<D: Downloader>(
    seeds: Vec<Url>,
    globs: Vec<String>,
    downloader: D,
    options: CoordinatorOptions,
) -> Result<CrawlResult, Error> {
    let effective_globs: Vec<String> = if globs.is_empty() {
        seeds.iter().map(HostGlobMatcher::seed_glob).collect()
    } else {
        globs
    };
    let matcher = HostGlobMatcher::new(effective_globs);

    let mut store = DestinationStore::new();
    let mut links: Vec<Link> = Vec::new();
    let mut pending: VecDeque<String> = VecDeque::new();
    let mut in_flight: HashSet<String> = HashSet::new();

    for seed in &seeds {
        let key = normalize::key(seed);
        let destination = store.intern(seed.clone(), None);
        destination.is_external = !matcher.matches_as_internal(seed);
        if !normalize::is_supported_scheme(seed) {
            destination.is_unsupported_scheme = true;
        }
        if !destination.is_settled() {
            pending.push_back(key);
        }
    }

    let (results_tx, mut results_rx) = mpsc::unbounded_channel();
    let pool = WorkerPool::spawn(
        Arc::new(downloader),
        options.connections.max(1),
        1,
        results_tx,
    );

    log::info!(
        "seeding crawl with {} url(s), {} worker(s)",
        seeds.len(),
        pool.n_workers()
    );

    let counter = Arc::new(Counter::default());
    let stats_task = tokio::spawn(log_stats(counter.clone()));

    while !(pending.is_empty() && in_flight.is_empty()) {
        while let Some(key) = pending.pop_front() {
            if let Some(quota) = options.quota {
                if store.len() > quota {
                    log::info!("quota of {} destinations reached", quota);
                    pending.clear();
                    break;
                }
            }

            let destination = match store.get(&key) {
                Some(destination) => destination,
                None => continue,
            };
            let url = match &destination.uri {
                Some(url) => url.clone(),
                None => continue,
            };
            in_flight.insert(key.clone());
            counter.register_open();

            pool.dispatch(
                &url.origin().ascii_serialization(),
                WorkItem {
                    url,
                    should_parse: !destination.is_external,
                },
            )
            .await
            .map_err(|_| Error::Internal("a worker task died unexpectedly".to_owned()))?;
        }

        if in_flight.is_empty() {
            break;
        }

        let message = results_rx
            .recv()
            .await
            .ok_or_else(|| Error::Internal("results channel closed unexpectedly".to_owned()))?;

        in_flight.remove(&message.result.url);
        if message.result.did_not_connect {
            counter.register_error();
        } else {
            counter.register_closed();
        }

        let origin_url = message.result.final_url.clone().unwrap_or_else(|| message.result.url.clone());
        let base = origin_url.parse::<Url>().ok();

        store.merge(message.result)?;

        for outbound in message.outbound {
            let (url, fragment) = match normalize::normalize(base.as_ref(), &outbound.href) {
                Normalized::Ok { url, fragment } => (url, fragment.or(outbound.fragment)),
                Normalized::Invalid => {
                    store.intern_invalid(&outbound.href);
                    links.push(Link {
                        origin: Origin {
                            source_url: origin_url.clone(),
                            location: outbound.location.clone(),
                        },
                        target_url: outbound.href.clone(),
                        fragment: outbound.fragment,
                    });
                    continue;
                }
            };

            let target_key = normalize::key(&url);
            let is_new = store.get(&target_key).is_none();

            let destination = store.intern(url.clone(), fragment.clone());
            if is_new {
                destination.is_external = !matcher.matches_as_internal(&url);
                if !normalize::is_supported_scheme(&url) {
                    destination.is_unsupported_scheme = true;
                }
            }
            let should_enqueue =
                is_new && !destination.is_settled() && (!destination.is_external || options.checks_external);

            links.push(Link {
                origin: Origin {
                    source_url: origin_url.clone(),
                    location: outbound.location.clone(),
                },
                target_url: target_key.clone(),
                fragment,
            });

            if should_enqueue {
                pending.push_back(target_key);
            }
        }
    }

    pool.shutdown().await;
    stats_task.abort();

    let destinations = store.into_destinations();
    let broken: Vec<String> = destinations
        .iter()
        .filter(|d| d.is_broken())
        .map(|d| d.url.clone())
        .collect();

    let mut anchor_warnings = Vec::new();
    let by_url: std::collections::HashMap<&str, &crate::model::Destination> =
        destinations.iter().map(|d| (d.url.as_str(), d)).collect();

    for link in &links {
        let fragment = match &link.fragment {
            Some(fragment) if !fragment.is_empty() => fragment,
            _ => continue,
        };

        if let Some(target) = by_url.get(link.target_url.as_str()) {
            if target.is_source && !target.anchors.iter().any(|a| a == fragment) {
                anchor_warnings.push(AnchorWarning {
                    link: link.clone(),
                    fragment: fragment.clone(),
                });
            }
        }
    }

    Ok(CrawlResult {
        destinations,
        links,
        broken,
        anchor_warnings,
    })
}
