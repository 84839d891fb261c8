//! Parses a fetched body for outbound links and declared anchors.
//!
//! A pure function of `(body, content_type)` with no network or filesystem
//! access — this is the only CPU-heavy stage, and isolating it like this
//! makes it testable on its own.

mod css;
mod html;

use crate::model::{ContentType, OutboundLink};

/// What parsing a body produced.
pub struct Parsed {
    /// Outbound links found on the page, with their raw (possibly relative)
    /// hrefs left unresolved — resolving them against the final URL is the
    /// coordinator's job.
    pub links: Vec<OutboundLink>,
    /// Anchor names declared on the page. Only meaningful for HTML; CSS
    /// payloads never declare anchors.
    pub anchors: Vec<String>,
}

/// Parses `body` according to `content_type`. Returns `None` when the
/// content type is not one this crawler knows how to parse.
pub fn parse(content_type: &ContentType, body: &str) -> Option<Parsed> {
    if content_type.is_html() {
        Some(html::parse(body))
    } else if content_type.is_css() {
        Some(css::parse(body))
    } else {
        None
    }
}
