//! Memoized lookup of valid source identifiers.
//!
//! The catalog is fetched from the `sources` endpoint at most once per API key
//! for the lifetime of the process. There is no TTL and no eviction; a catalog
//! goes stale if the upstream list changes mid-session.
//!
//! Two entry points:
//! - [`SourceCatalogCache::resolve`] returns a [`SourceLookupOutcome`] so a
//!   failed lookup can be told apart from an empty catalog
//! - [`SourceCatalogCache::lookup`] collapses failures to an empty list and
//!   logs a warning; it never returns an error
//!
//! Only successful lookups are stored, so a transient failure is retried on
//! the next call instead of pinning an empty catalog to the key.

use crate::api::{HttpGet, NewsApi};
use crate::models::SourcesResponse;
use crate::utils::{mask_api_key, truncate_for_log};
use itertools::Itertools;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Result of resolving the catalog for one API key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLookupOutcome {
    /// Sorted, deduplicated source identifiers (possibly empty).
    Fetched(Vec<String>),
    /// The lookup failed; the string says why.
    Failed(String),
}

impl SourceLookupOutcome {
    pub fn into_ids(self) -> Vec<String> {
        match self {
            SourceLookupOutcome::Fetched(ids) => ids,
            SourceLookupOutcome::Failed(_) => Vec::new(),
        }
    }
}

/// Catalog slot for one API key. `None` until a lookup succeeds.
type CatalogSlot = Arc<Mutex<Option<Vec<String>>>>;

/// Read-through cache of source catalogs keyed by API key.
///
/// Each key has its own async lock, held across check-then-fetch-then-store,
/// so concurrent callers never issue duplicate fetches for the same key while
/// lookups for different keys proceed independently.
#[derive(Debug, Default)]
pub struct SourceCatalogCache {
    slots: Mutex<HashMap<String, CatalogSlot>>,
}

impl SourceCatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    async fn slot(&self, api_key: &str) -> CatalogSlot {
        let mut slots = self.slots.lock().await;
        Arc::clone(slots.entry(api_key.to_string()).or_default())
    }

    #[instrument(level = "info", skip_all, fields(api_key = %mask_api_key(api_key)))]
    pub async fn resolve<C: HttpGet>(&self, api: &NewsApi<C>, api_key: &str) -> SourceLookupOutcome {
        if api_key.trim().is_empty() {
            return SourceLookupOutcome::Failed("no API key configured".to_string());
        }

        let slot = self.slot(api_key).await;
        let mut entry = slot.lock().await;
        if let Some(ids) = entry.as_ref() {
            debug!(count = ids.len(), "Source catalog served from cache");
            return SourceLookupOutcome::Fetched(ids.clone());
        }

        let outcome = fetch_catalog(api, api_key).await;
        if let SourceLookupOutcome::Fetched(ids) = &outcome {
            info!(count = ids.len(), "Source catalog fetched");
            *entry = Some(ids.clone());
        }
        outcome
    }

    /// Catalog for `api_key`, or an empty list if it could not be fetched.
    pub async fn lookup<C: HttpGet>(&self, api: &NewsApi<C>, api_key: &str) -> Vec<String> {
        let outcome = self.resolve(api, api_key).await;
        if let SourceLookupOutcome::Failed(reason) = &outcome {
            warn!(%reason, "Source lookup failed; no sources available");
        }
        outcome.into_ids()
    }

    /// Number of API keys with a cached catalog.
    pub async fn len(&self) -> usize {
        let slots: Vec<CatalogSlot> = self.slots.lock().await.values().cloned().collect();
        let mut cached = 0;
        for slot in slots {
            if slot.lock().await.is_some() {
                cached += 1;
            }
        }
        cached
    }
}

async fn fetch_catalog<C: HttpGet>(api: &NewsApi<C>, api_key: &str) -> SourceLookupOutcome {
    match api.sources(api_key).await {
        Err(e) => SourceLookupOutcome::Failed(e.to_string()),
        Ok(raw) if raw.status != 200 => {
            debug!(status = raw.status, body = %truncate_for_log(&raw.body, 200), "sources returned non-200");
            SourceLookupOutcome::Failed(format!("HTTP status {}", raw.status))
        }
        Ok(raw) => parse_catalog(&raw.body),
    }
}

/// Turn a `sources` response body into a catalog.
pub fn parse_catalog(body: &str) -> SourceLookupOutcome {
    let response: SourcesResponse = match serde_json::from_str(body) {
        Ok(r) => r,
        Err(e) => return SourceLookupOutcome::Failed(format!("malformed sources body: {e}")),
    };

    if response.status.as_deref() != Some("ok") {
        return SourceLookupOutcome::Failed(
            response
                .message
                .unwrap_or_else(|| "upstream status is not ok".to_string()),
        );
    }

    let ids = response
        .sources
        .into_iter()
        .filter_map(|s| s.id)
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .sorted()
        .dedup()
        .collect();
    SourceLookupOutcome::Fetched(ids)
}

/// Requested source ids that are not in `catalog`.
pub fn unknown_sources<'a>(requested: &'a [String], catalog: &[String]) -> Vec<&'a str> {
    requested
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty() && catalog.binary_search_by(|c| c.as_str().cmp(*s)).is_err())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::DEFAULT_BASE_URL;
    use crate::api::testing::StubHttp;

    const CATALOG: &str = r#"{
        "status": "ok",
        "sources": [
            {"id": "the-verge", "name": "The Verge"},
            {"id": "bbc-news", "name": "BBC News"},
            {"id": null, "name": "No id"},
            {"id": "bbc-news", "name": "BBC News again"},
            {"id": "abc-news", "name": "ABC News"}
        ]
    }"#;

    fn api(stub: StubHttp) -> NewsApi<StubHttp> {
        NewsApi::new(stub, DEFAULT_BASE_URL)
    }

    #[tokio::test]
    async fn test_lookup_sorted_and_deduplicated() {
        let api = api(StubHttp::ok(CATALOG));
        let cache = SourceCatalogCache::new();
        let ids = cache.lookup(&api, "abc123").await;
        assert_eq!(ids, vec!["abc-news", "bbc-news", "the-verge"]);
    }

    #[tokio::test]
    async fn test_same_key_fetched_once() {
        let api = api(StubHttp::ok(CATALOG));
        let cache = SourceCatalogCache::new();
        let first = cache.lookup(&api, "abc123").await;
        let second = cache.lookup(&api, "abc123").await;
        assert_eq!(first, second);
        assert_eq!(api.client().call_count(), 1);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_lookups_fetch_once() {
        let api = api(StubHttp::ok(CATALOG));
        let cache = SourceCatalogCache::new();
        let (a, b) = tokio::join!(cache.lookup(&api, "k"), cache.lookup(&api, "k"));
        assert_eq!(a, b);
        assert_eq!(api.client().call_count(), 1);
    }

    #[tokio::test]
    async fn test_distinct_keys_fetched_separately() {
        let api = api(StubHttp::ok(CATALOG));
        let cache = SourceCatalogCache::new();
        cache.lookup(&api, "key-one").await;
        cache.lookup(&api, "key-two").await;
        assert_eq!(api.client().call_count(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_distinct_keys_each_fetch_once() {
        let api = api(StubHttp::ok(CATALOG));
        let cache = SourceCatalogCache::new();
        let (a, b, c) = tokio::join!(
            cache.lookup(&api, "key-one"),
            cache.lookup(&api, "key-two"),
            cache.lookup(&api, "key-one"),
        );
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(api.client().call_count(), 2);
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn test_other_key_not_blocked_by_held_slot() {
        let api = api(StubHttp::ok(CATALOG));
        let cache = SourceCatalogCache::new();
        let slot = cache.slot("busy").await;
        let _held = slot.lock().await;

        let ids = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            cache.lookup(&api, "free"),
        )
        .await
        .unwrap();
        assert_eq!(ids.len(), 3);
    }

    #[tokio::test]
    async fn test_blank_key_skips_network() {
        let api = api(StubHttp::ok(CATALOG));
        let cache = SourceCatalogCache::new();
        assert!(cache.lookup(&api, "").await.is_empty());
        assert!(matches!(
            cache.resolve(&api, "  ").await,
            SourceLookupOutcome::Failed(_)
        ));
        assert_eq!(api.client().call_count(), 0);
    }

    #[tokio::test]
    async fn test_non_200_degrades_to_empty() {
        let api = api(StubHttp::with_status(401, r#"{"status":"error","message":"bad key"}"#));
        let cache = SourceCatalogCache::new();
        assert!(cache.lookup(&api, "k").await.is_empty());
        assert_eq!(
            cache.resolve(&api, "k").await,
            SourceLookupOutcome::Failed("HTTP status 401".to_string())
        );
    }

    #[tokio::test]
    async fn test_failures_are_not_memoized() {
        let api = api(StubHttp::failing("connection reset"));
        let cache = SourceCatalogCache::new();
        assert!(cache.lookup(&api, "k").await.is_empty());
        assert!(cache.lookup(&api, "k").await.is_empty());
        assert_eq!(api.client().call_count(), 2);
        assert_eq!(cache.len().await, 0);
    }

    #[test]
    fn test_parse_catalog_error_status() {
        let outcome = parse_catalog(r#"{"status":"error","message":"Your API key is invalid."}"#);
        assert_eq!(
            outcome,
            SourceLookupOutcome::Failed("Your API key is invalid.".to_string())
        );
        assert!(outcome.into_ids().is_empty());
    }

    #[test]
    fn test_parse_catalog_malformed_body() {
        assert!(matches!(parse_catalog("not json"), SourceLookupOutcome::Failed(_)));
    }

    #[test]
    fn test_parse_catalog_legitimately_empty() {
        assert_eq!(
            parse_catalog(r#"{"status":"ok","sources":[]}"#),
            SourceLookupOutcome::Fetched(vec![])
        );
    }

    #[test]
    fn test_unknown_sources() {
        let catalog = vec!["abc-news".to_string(), "bbc-news".to_string()];
        let requested = vec!["bbc-news".to_string(), "fake-news".to_string(), " ".to_string()];
        assert_eq!(unknown_sources(&requested, &catalog), vec!["fake-news"]);
    }
}
