//! The crawl graph's vertex and edge types.
//!
//! A `Destination` is a vertex (a URL, fragment stripped); a `Link` is an
//! edge from an `Origin` (the page + textual location a link was found at)
//! to a `Destination`, carrying whatever fragment the origin asked for.

use std::collections::BTreeSet;

use serde_derive::{Deserialize, Serialize};
use url::Url;

/// A parsed MIME type, split the way `mime`-adjacent crates usually do:
/// `text/html` becomes `{primary_type: "text", sub_type: "html"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentType {
    pub primary_type: String,
    pub sub_type: String,
}

impl ContentType {
    pub fn parse(value: &str) -> Option<ContentType> {
        let essence = value.split(';').next()?.trim();
        let (primary, sub) = essence.split_once('/')?;

        if primary.is_empty() || sub.is_empty() {
            return None;
        }

        Some(ContentType {
            primary_type: primary.to_ascii_lowercase(),
            sub_type: sub.to_ascii_lowercase(),
        })
    }

    pub fn is_html(&self) -> bool {
        self.primary_type == "text" && self.sub_type == "html"
    }

    pub fn is_css(&self) -> bool {
        self.primary_type == "text" && self.sub_type == "css"
    }

    pub fn is_parseable(&self) -> bool {
        self.is_html() || self.is_css()
    }
}

/// One hop of a redirect chain, in the order it was followed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicRedirectInfo {
    pub url: String,
    pub status_code: u16,
}

/// The (source page, textual location) a link was found at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Origin {
    /// Normalized URL of the page the link was found on.
    pub source_url: String,
    /// A human-readable description of where on the page, e.g. `a[href]`,
    /// `img[src]`, `css:url()`. Best-effort; never load-bearing for
    /// correctness, only for diagnostics.
    pub location: String,
}

/// An edge from an `Origin` to a `Destination`, with the fragment (if any)
/// that this specific reference requested. The fragment is not part of
/// `Destination` identity (see I1/I2 in the design notes); it only matters
/// for anchor validation of this one edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub origin: Origin,
    pub target_url: String,
    pub fragment: Option<String>,
}

/// A resource identified by its URL with the fragment stripped — the vertex
/// of the crawl graph. Two `Destination`s are equal iff their `url` is
/// equal; fragments never participate in identity (I1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Destination {
    pub url: String,
    #[serde(skip, default)]
    pub uri: Option<Url>,
    pub fragments: BTreeSet<String>,
    pub status_code: Option<u16>,
    pub content_type: Option<ContentType>,
    pub redirects: Vec<BasicRedirectInfo>,
    pub final_url: Option<String>,
    pub anchors: Vec<String>,
    pub is_external: bool,
    pub is_source: bool,
    pub is_invalid: bool,
    pub is_unsupported_scheme: bool,
    pub did_not_connect: bool,
}

impl PartialEq for Destination {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl Eq for Destination {}

impl Destination {
    pub fn new(url: String, uri: Option<Url>) -> Destination {
        Destination {
            url,
            uri,
            fragments: BTreeSet::new(),
            status_code: None,
            content_type: None,
            redirects: Vec::new(),
            final_url: None,
            anchors: Vec::new(),
            is_external: false,
            is_source: false,
            is_invalid: false,
            is_unsupported_scheme: false,
            did_not_connect: false,
        }
    }

    /// (I5) A destination is checked once a worker has actually tried it.
    pub fn was_tried(&self) -> bool {
        self.did_not_connect || self.status_code.is_some()
    }

    /// A destination is done with (no more dispatch needed) once it has
    /// either been tried, or was skipped for cause at intern-time.
    pub fn is_settled(&self) -> bool {
        self.was_tried() || self.is_invalid || self.is_unsupported_scheme
    }

    /// (I4/P5) Broken excludes unsupported schemes explicitly: a `mailto:`
    /// link is reported, but it never fails the exit code.
    pub fn is_broken(&self) -> bool {
        if self.is_unsupported_scheme {
            return false;
        }

        self.is_invalid || self.did_not_connect || self.status_code.map_or(false, |c| c != 200)
    }

    /// Merges a worker's result into this destination. Must only be called
    /// once per destination (I5); a second call is a programming error.
    pub fn merge(&mut self, result: DestinationResult) {
        debug_assert!(
            !self.was_tried(),
            "merged a DestinationResult into an already-checked Destination"
        );

        self.final_url = result.final_url;
        self.status_code = result.status_code;
        self.content_type = result.content_type;
        self.redirects = result.redirects;
        self.is_source = result.is_source;
        self.anchors = result.anchors;
        self.did_not_connect = result.did_not_connect;
    }
}

/// The serializable message a worker produces for one destination; the
/// fields that get merged into the corresponding `Destination` in the store.
/// `url` is the correlation key the coordinator uses to find the
/// destination to merge into.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationResult {
    pub url: String,
    pub final_url: Option<String>,
    pub status_code: Option<u16>,
    pub content_type: Option<ContentType>,
    pub redirects: Vec<BasicRedirectInfo>,
    pub is_source: bool,
    pub anchors: Vec<String>,
    pub did_not_connect: bool,
}

/// An outbound reference a worker found on a page: the textual location it
/// came from, and the raw (possibly relative) href it pointed to.
#[derive(Debug, Clone)]
pub struct OutboundLink {
    pub location: String,
    pub href: String,
    pub fragment: Option<String>,
}

/// An anchor that a link asked for but that does not exist on the target
/// page, surfaced as a warning rather than a broken link (I4 excludes
/// anchor-missing from `is_broken`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnchorWarning {
    pub link: Link,
    pub fragment: String,
}

/// The assembled result of a full crawl: every destination and link the
/// coordinator interned, plus the post-hoc classification of each.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlResult {
    pub destinations: Vec<Destination>,
    pub links: Vec<Link>,
    pub broken: Vec<String>,
    pub anchor_warnings: Vec<AnchorWarning>,
}

impl CrawlResult {
    pub fn has_broken_links(&self) -> bool {
        !self.broken.is_empty()
    }
}
