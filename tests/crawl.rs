//! End-to-end crawl scenarios driven against an in-memory fixture
//! downloader, one per literal scenario in the design notes (redirect
//! chains, broken links, unsupported schemes, cycles, missing anchors).

use std::collections::HashMap;

use async_trait::async_trait;
use url::Url;

use linkwarden::coordinator::{self, CoordinatorOptions};
use linkwarden::crawler::downloader::{Downloaded, Downloader};
use linkwarden::model::{BasicRedirectInfo, ContentType};

#[derive(Clone)]
struct Page {
    status: u16,
    content_type: Option<ContentType>,
    body: &'static str,
    redirect_to: Option<&'static str>,
}

fn html() -> ContentType {
    ContentType {
        primary_type: "text".to_owned(),
        sub_type: "html".to_owned(),
    }
}

struct FixtureDownloader {
    pages: HashMap<&'static str, Page>,
}

impl FixtureDownloader {
    fn new(pages: Vec<(&'static str, Page)>) -> FixtureDownloader {
        FixtureDownloader {
            pages: pages.into_iter().collect(),
        }
    }
}

#[async_trait]
impl Downloader for FixtureDownloader {
    async fn fetch(&self, url: &Url) -> Downloaded {
        let mut current = url.as_str();
        let mut redirects = Vec::new();

        loop {
            let page = match self.pages.get(current) {
                Some(page) => page,
                None => {
                    return Downloaded {
                        status_code: None,
                        final_url: url.clone(),
                        redirects,
                        content_type: None,
                        body: None,
                        did_not_connect: true,
                    }
                }
            };

            if let Some(location) = page.redirect_to {
                redirects.push(BasicRedirectInfo {
                    url: location.to_owned(),
                    status_code: page.status,
                });
                current = location;
                continue;
            }

            return Downloaded {
                status_code: Some(page.status),
                final_url: Url::parse(current).expect("fixture urls are valid"),
                redirects,
                content_type: page.content_type.clone(),
                body: Some(page.body.as_bytes().to_vec()),
                did_not_connect: false,
            };
        }
    }
}

fn options() -> CoordinatorOptions {
    CoordinatorOptions {
        connections: 2,
        checks_external: true,
        quota: None,
    }
}

#[tokio::test]
async fn seed_with_internal_and_fragment_links_has_no_broken_or_warnings() {
    let downloader = FixtureDownloader::new(vec![
        (
            "http://site/a",
            Page {
                status: 200,
                content_type: Some(html()),
                body: r#"<a href="/b">b</a><a href="/c#top">c</a>"#,
                redirect_to: None,
            },
        ),
        (
            "http://site/b",
            Page {
                status: 200,
                content_type: Some(html()),
                body: "",
                redirect_to: None,
            },
        ),
        (
            "http://site/c",
            Page {
                status: 200,
                content_type: Some(html()),
                body: r#"<a id="top">Top</a>"#,
                redirect_to: None,
            },
        ),
    ]);

    let result = coordinator::crawl(
        vec![Url::parse("http://site/a").unwrap()],
        vec![],
        downloader,
        options(),
    )
    .await
    .unwrap();

    assert_eq!(result.destinations.len(), 3);
    assert!(result.broken.is_empty());
    assert!(result.anchor_warnings.is_empty());
}

#[tokio::test]
async fn missing_page_is_broken_and_exits_nonzero() {
    let downloader = FixtureDownloader::new(vec![(
        "http://site/a",
        Page {
            status: 200,
            content_type: Some(html()),
            body: r#"<a href="/missing">gone</a>"#,
            redirect_to: None,
        },
    )]);

    let result = coordinator::crawl(
        vec![Url::parse("http://site/a").unwrap()],
        vec![],
        downloader,
        options(),
    )
    .await
    .unwrap();

    assert_eq!(result.broken.len(), 1);
    assert!(result.has_broken_links());
}

#[tokio::test]
async fn redirect_chain_resolves_to_healthy_destination() {
    let downloader = FixtureDownloader::new(vec![
        (
            "http://site/old",
            Page {
                status: 301,
                content_type: None,
                body: "",
                redirect_to: Some("http://site/new"),
            },
        ),
        (
            "http://site/new",
            Page {
                status: 200,
                content_type: Some(html()),
                body: "",
                redirect_to: None,
            },
        ),
    ]);

    let result = coordinator::crawl(
        vec![Url::parse("http://site/old").unwrap()],
        vec![],
        downloader,
        options(),
    )
    .await
    .unwrap();

    let seed = result
        .destinations
        .iter()
        .find(|d| d.url == "http://site/old")
        .unwrap();

    assert_eq!(seed.redirects.len(), 1);
    assert_eq!(seed.redirects[0].status_code, 301);
    assert_eq!(seed.redirects[0].url, "http://site/new");
    assert_eq!(seed.final_url.as_deref(), Some("http://site/new"));
    assert_eq!(seed.status_code, Some(200));
    assert!(!seed.is_broken());
}

#[tokio::test]
async fn unsupported_scheme_link_is_not_broken_and_not_dispatched() {
    let downloader = FixtureDownloader::new(vec![(
        "http://site/a",
        Page {
            status: 200,
            content_type: Some(html()),
            body: r#"<a href="mailto:x@y">mail</a>"#,
            redirect_to: None,
        },
    )]);

    let result = coordinator::crawl(
        vec![Url::parse("http://site/a").unwrap()],
        vec![],
        downloader,
        options(),
    )
    .await
    .unwrap();

    let mail = result
        .destinations
        .iter()
        .find(|d| d.url.starts_with("mailto:"))
        .unwrap();

    assert!(mail.is_unsupported_scheme);
    assert!(!mail.is_broken());
    assert!(result.broken.is_empty());
}

#[tokio::test]
async fn cycle_between_two_pages_is_checked_exactly_once_each() {
    let downloader = FixtureDownloader::new(vec![
        (
            "http://site/a",
            Page {
                status: 200,
                content_type: Some(html()),
                body: r#"<a href="/b">b</a>"#,
                redirect_to: None,
            },
        ),
        (
            "http://site/b",
            Page {
                status: 200,
                content_type: Some(html()),
                body: r#"<a href="/a">a</a>"#,
                redirect_to: None,
            },
        ),
    ]);

    let result = coordinator::crawl(
        vec![Url::parse("http://site/a").unwrap()],
        vec![],
        downloader,
        options(),
    )
    .await
    .unwrap();

    assert_eq!(result.destinations.len(), 2);
    assert!(result.destinations.iter().all(|d| d.was_tried()));
}

#[tokio::test]
async fn missing_anchor_is_a_warning_not_a_broken_link() {
    let downloader = FixtureDownloader::new(vec![
        (
            "http://site/a",
            Page {
                status: 200,
                content_type: Some(html()),
                body: r#"<a href="/page#ghost">ghost</a>"#,
                redirect_to: None,
            },
        ),
        (
            "http://site/page",
            Page {
                status: 200,
                content_type: Some(html()),
                body: "<p>no anchors here</p>",
                redirect_to: None,
            },
        ),
    ]);

    let result = coordinator::crawl(
        vec![Url::parse("http://site/a").unwrap()],
        vec![],
        downloader,
        options(),
    )
    .await
    .unwrap();

    assert!(result.broken.is_empty());
    assert_eq!(result.anchor_warnings.len(), 1);
    assert_eq!(result.anchor_warnings[0].fragment, "ghost");
}
