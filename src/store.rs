//! The destination store: a deduplicating, insertion-ordered map from
//! normalized URL to `Destination`. Single-writer by design — only the
//! crawl coordinator ever touches it (§5, "Shared-resource policy").

use std::collections::HashMap;

use url::Url;

use crate::model::{Destination, DestinationResult};
use crate::normalize;

pub struct DestinationStore {
    by_url: HashMap<String, Destination>,
    order: Vec<String>,
}

impl DestinationStore {
    pub fn new() -> DestinationStore {
        DestinationStore {
            by_url: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Returns the existing destination for `url`, or creates, inserts and
    /// returns a new one. If `fragment` is given, it is folded into the
    /// destination's `fragments` set regardless of whether the destination
    /// already existed (I2).
    pub fn intern(&mut self, url: Url, fragment: Option<String>) -> &mut Destination {
        let key = normalize::key(&url);

        if !self.by_url.contains_key(&key) {
            self.by_url
                .insert(key.clone(), Destination::new(key.clone(), Some(url)));
            self.order.push(key.clone());
        }

        let destination = self.by_url.get_mut(&key).expect("just inserted");

        if let Some(fragment) = fragment {
            if !fragment.is_empty() {
                destination.fragments.insert(fragment);
            }
        }

        destination
    }

    /// Interns a reference that failed to parse at all (§4.1: "on failure
    /// mark the Destination isInvalid, retain the original text"). The raw
    /// text itself stands in for a normalized key, since there is no
    /// parsed URL to canonicalize.
    pub fn intern_invalid(&mut self, raw: &str) -> &mut Destination {
        if !self.by_url.contains_key(raw) {
            let mut destination = Destination::new(raw.to_owned(), None);
            destination.is_invalid = true;
            self.by_url.insert(raw.to_owned(), destination);
            self.order.push(raw.to_owned());
        }

        self.by_url.get_mut(raw).expect("just inserted")
    }

    pub fn get(&self, url: &str) -> Option<&Destination> {
        self.by_url.get(url)
    }

    /// Merges a worker's result into the destination it refers to. The
    /// destination must already exist — it is a programming error
    /// (`Error::Internal`) for a result to arrive for a URL nobody ever
    /// interned.
    pub fn merge(&mut self, result: DestinationResult) -> Result<(), crate::Error> {
        let destination = self.by_url.get_mut(&result.url).ok_or_else(|| {
            crate::Error::Internal(format!(
                "received a result for {:?} but it was never interned",
                result.url
            ))
        })?;

        destination.merge(result);
        Ok(())
    }

    /// All interned destinations, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Destination> {
        self.order.iter().map(move |key| &self.by_url[key])
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn into_destinations(self) -> Vec<Destination> {
        self.order
            .into_iter()
            .map(|key| {
                self.by_url
                    .get(&key)
                    .cloned()
                    .expect("order and by_url stay in sync")
            })
            .collect()
    }
}

impl Default for DestinationStore {
    fn default() -> Self {
        DestinationStore::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_twice_yields_one_destination() {
        let mut store = DestinationStore::new();
        let url = Url::parse("http://site/a").unwrap();

        store.intern(url.clone(), None);
        store.intern(url, None);

        assert_eq!(store.len(), 1);
    }

    #[test]
    fn fragments_accumulate_across_origins() {
        let mut store = DestinationStore::new();
        let url = Url::parse("http://site/a").unwrap();

        store.intern(url.clone(), Some("top".to_owned()));
        store.intern(url.clone(), Some("bottom".to_owned()));

        let destination = store.get(&normalize::key(&url)).unwrap();
        assert_eq!(destination.fragments.len(), 2);
    }

    #[test]
    fn merge_without_intern_is_internal_error() {
        let mut store = DestinationStore::new();
        let result = DestinationResult {
            url: "http://site/a".to_owned(),
            final_url: None,
            status_code: Some(200),
            content_type: None,
            redirects: vec![],
            is_source: false,
            anchors: vec![],
            did_not_connect: false,
        };

        assert!(store.merge(result).is_err());
    }
}
