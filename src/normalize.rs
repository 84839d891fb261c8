//! URL normalization: canonicalizing a raw URL into the destination key
//! (fragment stripped) plus the fragment it carried, if any.
//!
//! Handles both the relative-to-absolute join against a base URL and the
//! scheme screening needed to tell an unsupported scheme from a URL that
//! just doesn't parse.

use url::Url;

/// The outcome of normalizing a raw URL reference against a base URL.
pub enum Normalized {
    /// Parsed fine. `url` has its fragment stripped and is the destination
    /// key; `fragment` is whatever followed the first `#`, verbatim.
    Ok { url: Url, fragment: Option<String> },
    /// Did not parse at all (not even as relative-to-base).
    Invalid,
}

/// Resolves `raw` against `base`, strips the fragment, and reports the
/// fragment separately. A relative reference with no base at all (the
/// top-level seed case) should pass `base = None`.
pub fn normalize(base: Option<&Url>, raw: &str) -> Normalized {
    let parsed = match raw.parse::<Url>() {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => match base {
            Some(base) => base.join(raw),
            None => return Normalized::Invalid,
        },
        Err(_) => return Normalized::Invalid,
    };

    let mut url = match parsed {
        Ok(url) => url,
        Err(_) => return Normalized::Invalid,
    };

    let fragment = url.fragment().map(|f| f.to_owned());
    url.set_fragment(None);

    Normalized::Ok { url, fragment }
}

/// The canonical string key used to dedupe destinations: the fragment-less
/// URL, serialized the same way every time.
pub fn key(url: &Url) -> String {
    url.as_str().to_owned()
}

/// Schemes the fetch worker knows how to handle at all. Anything else is
/// `UnsupportedScheme`, not invalid: it still parses, it is just not
/// dispatched.
pub fn is_supported_scheme(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https" | "file")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fragment_and_keeps_key_stable() {
        let base = Url::parse("http://site/a").unwrap();
        match normalize(Some(&base), "/c#top") {
            Normalized::Ok { url, fragment } => {
                assert_eq!(url.as_str(), "http://site/c");
                assert_eq!(fragment.as_deref(), Some("top"));
            }
            Normalized::Invalid => panic!("expected a valid url"),
        }
    }

    #[test]
    fn relative_without_base_is_invalid() {
        match normalize(None, "/c") {
            Normalized::Invalid => {}
            Normalized::Ok { .. } => panic!("expected invalid"),
        }
    }

    #[test]
    fn resolves_relative_against_base() {
        let base = Url::parse("http://site/a/b").unwrap();
        match normalize(Some(&base), "../c") {
            Normalized::Ok { url, fragment } => {
                assert_eq!(url.as_str(), "http://site/c");
                assert!(fragment.is_none());
            }
            Normalized::Invalid => panic!("expected valid"),
        }
    }

    #[test]
    fn mailto_parses_but_is_unsupported_scheme() {
        let url = "mailto:x@y".parse::<Url>().unwrap();
        assert!(!is_supported_scheme(&url));
    }

    #[test]
    fn fragment_only_reference_keeps_base_as_key() {
        let base = Url::parse("http://site/page").unwrap();
        match normalize(Some(&base), "#ghost") {
            Normalized::Ok { url, fragment } => {
                assert_eq!(url.as_str(), "http://site/page");
                assert_eq!(fragment.as_deref(), Some("ghost"));
            }
            Normalized::Invalid => panic!("expected valid"),
        }
    }
}
