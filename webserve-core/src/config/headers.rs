//! Response headers injected on every response

use http::header::{CACHE_CONTROL, EXPIRES, PRAGMA};
use http::{HeaderMap, HeaderName, HeaderValue};

const COEP: HeaderName = HeaderName::from_static("cross-origin-embedder-policy");
const COOP: HeaderName = HeaderName::from_static("cross-origin-opener-policy");

/// Ordered set of headers applied after the normal response is built
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseHeaderSet {
    entries: Vec<(HeaderName, HeaderValue)>,
}

impl Default for ResponseHeaderSet {
    fn default() -> Self {
        Self::cross_origin_isolation().with_no_cache()
    }
}

impl ResponseHeaderSet {
    /// An empty set
    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    /// COEP/COOP pair required for `SharedArrayBuffer` in the served app
    pub fn cross_origin_isolation() -> Self {
        Self::empty()
            .with(COEP, HeaderValue::from_static("require-corp"))
            .with(COOP, HeaderValue::from_static("same-origin"))
    }

    /// Append the cache-busting headers so every reload fetches a fresh bundle
    pub fn with_no_cache(self) -> Self {
        self.with(
            CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, must-revalidate"),
        )
        .with(PRAGMA, HeaderValue::from_static("no-cache"))
        .with(EXPIRES, HeaderValue::from_static("0"))
    }

    /// Add an entry, replacing an earlier one with the same name
    pub fn with(mut self, name: HeaderName, value: HeaderValue) -> Self {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
        self
    }

    /// Set every entry on `headers`, overriding values already present
    pub fn apply(&self, headers: &mut HeaderMap) {
        for (name, value) in self.iter() {
            headers.insert(name.clone(), value.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &HeaderValue)> {
        self.entries.iter().map(|(n, v)| (n, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_isolation_plus_no_cache() {
        let set = ResponseHeaderSet::default();
        let names: Vec<&str> = set.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "cross-origin-embedder-policy",
                "cross-origin-opener-policy",
                "cache-control",
                "pragma",
                "expires",
            ]
        );
    }

    #[test]
    fn test_apply_overrides_existing_values() {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=3600"));
        headers.insert("content-type", HeaderValue::from_static("text/html"));

        ResponseHeaderSet::default().apply(&mut headers);

        assert_eq!(headers.get_all(CACHE_CONTROL).iter().count(), 1);
        assert_eq!(headers[CACHE_CONTROL], "no-cache, no-store, must-revalidate");
        assert_eq!(headers["cross-origin-embedder-policy"], "require-corp");
        assert_eq!(headers["cross-origin-opener-policy"], "same-origin");
        assert_eq!(headers[PRAGMA], "no-cache");
        assert_eq!(headers[EXPIRES], "0");
        assert_eq!(headers["content-type"], "text/html");
    }

    #[test]
    fn test_isolation_only() {
        let set = ResponseHeaderSet::cross_origin_isolation();
        let mut headers = HeaderMap::new();
        set.apply(&mut headers);
        assert_eq!(headers.len(), 2);
        assert!(headers.get(CACHE_CONTROL).is_none());
    }

    #[test]
    fn test_with_replaces_same_name() {
        let set = ResponseHeaderSet::cross_origin_isolation()
            .with(COOP, HeaderValue::from_static("same-origin-allow-popups"));
        assert_eq!(set.iter().count(), 2);
        let mut headers = HeaderMap::new();
        set.apply(&mut headers);
        assert_eq!(headers["cross-origin-opener-policy"], "same-origin-allow-popups");
    }
}
