//! HTML link and anchor extraction, built on `scraper` with
//! statically-compiled `Selector`s walking the parsed DOM once per tag
//! family.

use lazy_static::lazy_static;
use scraper::{Html, Selector};

use crate::model::OutboundLink;

use super::Parsed;

lazy_static! {
    static ref HREF_SOURCES: Selector =
        Selector::parse("a[href], link[href]").expect("static selector");
    static ref SRC_SOURCES: Selector =
        Selector::parse("img[src], script[src], iframe[src], frame[src]")
            .expect("static selector");
    static ref ANCHOR_ID: Selector = Selector::parse("[id]").expect("static selector");
    static ref ANCHOR_NAME: Selector = Selector::parse("a[name]").expect("static selector");
}

/// Splits `href="...#fragment"` into the href itself and the fragment, the
/// way `Origin::normalize` would, but without needing a parsed `Url` yet —
/// the coordinator resolves the href to an absolute URL later.
fn split_fragment(raw: &str) -> (&str, Option<String>) {
    match raw.split_once('#') {
        Some((href, fragment)) => (href, Some(fragment.to_owned())),
        None => (raw, None),
    }
}

pub fn parse(body: &str) -> Parsed {
    let document = Html::parse_document(body);

    let mut links = Vec::new();

    for element in document.select(&HREF_SOURCES) {
        if let Some(raw) = element.value().attr("href") {
            let (href, fragment) = split_fragment(raw);
            if href.is_empty() && fragment.is_none() {
                continue;
            }
            links.push(OutboundLink {
                location: format!("{}[href]", element.value().name()),
                href: href.to_owned(),
                fragment,
            });
        }
    }

    for element in document.select(&SRC_SOURCES) {
        if let Some(raw) = element.value().attr("src") {
            let (href, fragment) = split_fragment(raw);
            if href.is_empty() {
                continue;
            }
            links.push(OutboundLink {
                location: format!("{}[src]", element.value().name()),
                href: href.to_owned(),
                fragment,
            });
        }
    }

    let mut anchors = Vec::new();

    for element in document.select(&ANCHOR_ID) {
        if let Some(id) = element.value().attr("id") {
            anchors.push(id.to_owned());
        }
    }

    for element in document.select(&ANCHOR_NAME) {
        if let Some(name) = element.value().attr("name") {
            anchors.push(name.to_owned());
        }
    }

    Parsed { links, anchors }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_anchor_and_image_links() {
        let parsed = parse(
            r#"<html><body>
                <a href="/b">b</a>
                <a href="/c#top">c</a>
                <img src="/logo.png">
                <a id="top">Top</a>
            </body></html>"#,
        );

        assert_eq!(parsed.links.len(), 3);
        assert!(parsed
            .links
            .iter()
            .any(|l| l.href == "/c" && l.fragment.as_deref() == Some("top")));
        assert!(parsed.anchors.iter().any(|a| a == "top"));
    }

    #[test]
    fn named_anchors_are_collected() {
        let parsed = parse(r#"<a name="section-1">Section</a>"#);
        assert!(parsed.anchors.iter().any(|a| a == "section-1"));
    }

    #[test]
    fn empty_href_is_ignored() {
        let parsed = parse(r#"<a href="">self</a>"#);
        assert!(parsed.links.is_empty());
    }
}
