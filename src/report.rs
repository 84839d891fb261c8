//! Classifies a crawl's destinations for reporting: broken, carrying an
//! anchor warning, skipped as an unsupported scheme, or healthy.

use std::collections::HashSet;

use crate::model::{CrawlResult, Destination};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Broken,
    Warning,
    UnsupportedScheme,
    Healthy,
}

/// Per-crawl totals, one of each destination's classification.
#[derive(Debug, Clone, Copy, Default)]
pub struct Summary {
    pub total: usize,
    pub broken: usize,
    pub warnings: usize,
    pub unsupported: usize,
    pub healthy: usize,
}

/// `warned_urls` is the set of destination URLs that carry at least one
/// anchor warning; broken still outranks a warning, since a destination
/// that never resolved has nothing for its anchors to be validated against.
pub fn classify(destination: &Destination, warned_urls: &HashSet<&str>) -> Classification {
    if destination.is_broken() {
        Classification::Broken
    } else if destination.is_unsupported_scheme {
        Classification::UnsupportedScheme
    } else if warned_urls.contains(destination.url.as_str()) {
        Classification::Warning
    } else {
        Classification::Healthy
    }
}

pub fn summarize(result: &CrawlResult) -> Summary {
    let warned_urls: HashSet<&str> = result
        .anchor_warnings
        .iter()
        .map(|warning| warning.link.target_url.as_str())
        .collect();

    let mut summary = Summary {
        total: result.destinations.len(),
        ..Summary::default()
    };

    for destination in &result.destinations {
        match classify(destination, &warned_urls) {
            Classification::Broken => summary.broken += 1,
            Classification::Warning => summary.warnings += 1,
            Classification::UnsupportedScheme => summary.unsupported += 1,
            Classification::Healthy => summary.healthy += 1,
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnchorWarning, Link, Origin};

    fn destination(url: &str) -> Destination {
        Destination::new(url.to_owned(), None)
    }

    #[test]
    fn broken_outranks_warning() {
        let mut d = destination("http://site/a");
        d.status_code = Some(404);
        let warned = HashSet::from(["http://site/a"]);
        assert_eq!(classify(&d, &warned), Classification::Broken);
    }

    #[test]
    fn unsupported_scheme_is_not_broken() {
        let mut d = destination("mailto:x@y");
        d.is_unsupported_scheme = true;
        assert_eq!(classify(&d, &HashSet::new()), Classification::UnsupportedScheme);
    }

    #[test]
    fn summary_counts_every_destination_once() {
        let mut healthy = destination("http://site/a");
        healthy.status_code = Some(200);
        let mut broken = destination("http://site/b");
        broken.status_code = Some(404);

        let result = CrawlResult {
            destinations: vec![healthy, broken],
            links: vec![],
            broken: vec!["http://site/b".to_owned()],
            anchor_warnings: vec![AnchorWarning {
                link: Link {
                    origin: Origin {
                        source_url: "http://site/a".to_owned(),
                        location: "a[href]".to_owned(),
                    },
                    target_url: "http://site/a".to_owned(),
                    fragment: Some("ghost".to_owned()),
                },
                fragment: "ghost".to_owned(),
            }],
        };

        let summary = summarize(&result);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.broken, 1);
        assert_eq!(summary.warnings, 1);
    }
}
