//! CSS link extraction: `url(...)` references and `@import` targets.
//!
//! Same shape as the HTML parser (a pure function of the body producing
//! outbound links), built on `regex` rather than a dedicated CSS parser
//! crate, since two extraction patterns don't justify pulling one in.

use lazy_static::lazy_static;
use regex::Regex;

use crate::model::OutboundLink;

use super::Parsed;

lazy_static! {
    static ref URL_FN: Regex = Regex::new(r#"url\(\s*(['"]?)([^'")]+)\1\s*\)"#).unwrap();
    static ref IMPORT: Regex =
        Regex::new(r#"@import\s+(?:url\(\s*)?['"]?([^'")\s;]+)['"]?\)?"#).unwrap();
}

pub fn parse(body: &str) -> Parsed {
    let mut links = Vec::new();

    for capture in URL_FN.captures_iter(body) {
        let href = capture[2].trim().to_owned();
        if href.is_empty() || href.starts_with("data:") {
            continue;
        }
        links.push(OutboundLink {
            location: "css:url()".to_owned(),
            href,
            fragment: None,
        });
    }

    for capture in IMPORT.captures_iter(body) {
        let href = capture[1].trim().to_owned();
        if href.is_empty() {
            continue;
        }
        links.push(OutboundLink {
            location: "css:@import".to_owned(),
            href,
            fragment: None,
        });
    }

    Parsed {
        links,
        anchors: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_url_function_references() {
        let parsed = parse("body { background: url('/images/bg.png'); }");
        assert_eq!(parsed.links.len(), 1);
        assert_eq!(parsed.links[0].href, "/images/bg.png");
    }

    #[test]
    fn extracts_import_targets() {
        let parsed = parse(r#"@import "reset.css";"#);
        assert_eq!(parsed.links.len(), 1);
        assert_eq!(parsed.links[0].href, "reset.css");
    }

    #[test]
    fn ignores_data_uris() {
        let parsed = parse("body { background: url(data:image/png;base64,AAA); }");
        assert!(parsed.links.is_empty());
    }

    #[test]
    fn css_has_no_anchors() {
        let parsed = parse("a { color: red; }");
        assert!(parsed.anchors.is_empty());
    }
}
