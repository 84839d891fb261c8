//! Host-glob matching: classifies a URL as internal (subject to recursion)
//! or external (fetched but not recursed into) against a set of
//! user-supplied glob patterns such as `http://example.com/guides**`.
//!
//! Grounded in the teacher's `directives::directives` module, which compiles
//! allow/disallow/frontier rules into a `regex::RegexSet` and tests URLs
//! against it with `RegexSet::is_match`; this module narrows that machinery
//! down to the single internal/external boundary the spec calls for.

use regex::RegexSet;
use url::Url;

const REGEX_META_CHARS: &str = r".+?()[]{}|^$\";

/// Translates a glob pattern into an anchored regex. `**` matches any
/// sequence of characters (including none); a lone `*` matches any
/// sequence of non-`/` characters, i.e. within one path segment. Everything
/// else is matched literally.
fn glob_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 2);
    out.push('^');

    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '*' {
            if chars.peek() == Some(&'*') {
                chars.next();
                out.push_str(".*");
            } else {
                out.push_str("[^/]*");
            }
        } else if REGEX_META_CHARS.contains(c) {
            out.push('\\');
            out.push(c);
        } else {
            out.push(c);
        }
    }

    out.push('$');
    out
}

/// Classifies URLs as internal (matching at least one configured glob) or
/// external (matching none).
pub struct HostGlobMatcher {
    patterns: RegexSet,
}

impl HostGlobMatcher {
    /// Builds a matcher from a set of glob patterns. Invalid patterns are
    /// logged and skipped rather than failing the whole crawl — a typo in
    /// one `--glob` flag shouldn't prevent checking the rest.
    pub fn new<I: IntoIterator<Item = S>, S: AsRef<str>>(patterns: I) -> HostGlobMatcher {
        let regexes = patterns
            .into_iter()
            .filter_map(|pattern| {
                let pattern = pattern.as_ref();
                let regex = glob_to_regex(pattern);
                if regex::Regex::new(&regex).is_err() {
                    log::warn!("ignoring malformed host glob: {}", pattern);
                    None
                } else {
                    Some(regex)
                }
            })
            .collect::<Vec<_>>();

        HostGlobMatcher {
            patterns: RegexSet::new(&regexes).unwrap_or_else(|_| {
                RegexSet::new(std::iter::empty::<&str>()).expect("empty set always compiles")
            }),
        }
    }

    /// The implicit glob a bare seed contributes when the caller supplies
    /// no explicit patterns: the seed's origin, not the seed's own path, so
    /// sibling same-host resources (`http://site/b` next to seed
    /// `http://site/a`) classify as internal too.
    pub fn seed_glob(seed: &Url) -> String {
        format!("{}/**", seed.origin().ascii_serialization())
    }

    pub fn matches_as_internal(&self, url: &Url) -> bool {
        self.patterns.is_match(url.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_star_star_matches_any_path() {
        let matcher = HostGlobMatcher::new(["http://localhost:4000/**"]);
        assert!(matcher.matches_as_internal(&Url::parse("http://localhost:4000/").unwrap()));
        assert!(matcher.matches_as_internal(&Url::parse("http://localhost:4000/guides").unwrap()));
    }

    #[test]
    fn prefixed_star_star_matches_only_prefix() {
        let matcher = HostGlobMatcher::new(["http://localhost:4000/guides**"]);
        assert!(
            matcher.matches_as_internal(&Url::parse("http://localhost:4000/guides/").unwrap())
        );
        assert!(!matcher.matches_as_internal(&Url::parse("http://example.com/").unwrap()));
    }

    #[test]
    fn no_match_is_external() {
        let matcher = HostGlobMatcher::new(["http://localhost:4000/guides**"]);
        assert!(!matcher.matches_as_internal(&Url::parse("http://localhost:4000/other").unwrap()));
    }

    #[test]
    fn seed_glob_covers_sibling_paths_on_the_same_origin() {
        let seed = Url::parse("http://site/a").unwrap();
        let matcher = HostGlobMatcher::new([HostGlobMatcher::seed_glob(&seed)]);
        assert!(matcher.matches_as_internal(&Url::parse("http://site/a").unwrap()));
        assert!(matcher.matches_as_internal(&Url::parse("http://site/b").unwrap()));
        assert!(!matcher.matches_as_internal(&Url::parse("http://example.com/").unwrap()));
    }
}
