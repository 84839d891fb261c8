use std::io;
use thiserror::Error;

/// Errors that abort the crawl outright. Per-destination failures (bad
/// status, transport failure, timeout) never reach this type; they are
/// captured on the `Destination` itself and surfaced in the report instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("http error: {0}")]
    Http(#[from] hyper::Error),
    #[error("invalid uri: {0}")]
    InvalidUri(#[from] http::uri::InvalidUri),
    #[error("url parse error: {0}")]
    UrlParseError(#[from] url::ParseError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("unknown Content-Encoding: {0}")]
    UnknownContentEncoding(String),
    #[error("crawl coordinator invariant violated: {0}")]
    Internal(String),
}
