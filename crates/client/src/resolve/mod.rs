//! Retrieval orchestration: fresh cache, live fetch, stale fallback.
//!
//! For each reference the [`Resolver`]:
//!
//! 1. derives the raw-content URL and its namespaced cache key,
//! 2. serves the cached payload when [`is_fresh`] holds,
//! 3. otherwise fetches, and on success overwrites the cache entry,
//! 4. on fetch failure serves any cached payload without touching its
//!    write time,
//! 5. reports `None` only when neither the network nor the cache has data.
//!
//! Each call performs its storage and network steps strictly in sequence.
//! Concurrent calls for the same key are not coordinated; both may fetch
//! and the later write wins.

pub mod freshness;

pub use freshness::is_fresh;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use ghsnip_core::cache::compute_cache_key;
use ghsnip_core::{AppConfig, Clock, ContentStore, Hosts, SourceReference, SystemClock};

use crate::fetch::Fetcher;

/// Where a resolved payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Cache entry young enough to skip the network.
    FreshCache,
    /// Live fetch; the cache now holds this payload.
    Network,
    /// Fetch failed; cache entry served regardless of age.
    StaleCache,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::FreshCache => "fresh_cache",
            Origin::Network => "network",
            Origin::StaleCache => "stale_cache",
        }
    }
}

/// Payload produced by [`Resolver::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub payload: Bytes,
    pub origin: Origin,
    pub raw_url: String,
    pub cache_key: String,
}

/// Fetch/cache/fallback orchestrator.
pub struct Resolver<S, F, C = SystemClock> {
    store: S,
    fetcher: F,
    clock: C,
    hosts: Hosts,
    namespace: String,
}

impl<S, F> Resolver<S, F, SystemClock>
where
    S: ContentStore,
    F: Fetcher,
{
    /// Resolver using the system clock and the hosts and namespace of `config`.
    pub fn from_config(store: S, fetcher: F, config: &AppConfig) -> Self {
        Resolver::new(store, fetcher, SystemClock, config.hosts(), config.cache_namespace.clone())
    }
}

impl<S, F, C> Resolver<S, F, C>
where
    S: ContentStore,
    F: Fetcher,
    C: Clock,
{
    pub fn new(store: S, fetcher: F, clock: C, hosts: Hosts, namespace: impl Into<String>) -> Self {
        Self { store, fetcher, clock, hosts, namespace: namespace.into() }
    }

    pub fn hosts(&self) -> &Hosts {
        &self.hosts
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Cache key for a raw-content URL in this resolver's namespace.
    pub fn cache_key(&self, raw_url: &str) -> String {
        compute_cache_key(raw_url, &self.namespace)
    }

    /// Resolve `reference` to its best available payload.
    ///
    /// `referenced_at` is the last modification time of the referencing
    /// document; `purge` skips the freshness check and always attempts a
    /// live fetch. References that are not renderable resolve to `None`
    /// without touching the cache or the network.
    pub async fn resolve(
        &self, reference: &SourceReference, referenced_at: Option<DateTime<Utc>>, purge: bool,
    ) -> Option<Resolved> {
        if !reference.is_renderable() {
            tracing::debug!(?reference, "skipping incomplete reference");
            return None;
        }

        let raw_url = reference.raw_url(&self.hosts);
        let cache_key = self.cache_key(&raw_url);

        let cached_at = self.store.write_time_of(&cache_key).await.unwrap_or_else(|e| {
            tracing::warn!(key = %cache_key, error = %e, "cache lookup failed, treating as miss");
            None
        });

        let now = self.clock.now();
        if is_fresh(cached_at, referenced_at, purge, now) {
            if let Some(payload) = self.cached_payload(&cache_key).await {
                tracing::debug!(url = %raw_url, "serving fresh cache");
                return Some(Resolved { payload, origin: Origin::FreshCache, raw_url, cache_key });
            }
            tracing::debug!(url = %raw_url, "fresh entry has no payload, fetching");
        } else {
            tracing::debug!(url = %raw_url, cached = cached_at.is_some(), purge, "cache not fresh, fetching");
        }

        if let Some(payload) = self.fetcher.fetch(&raw_url).await.filter(|b| !b.is_empty()) {
            let written_at = self.clock.now();
            if let Err(e) = self.store.put(&cache_key, &raw_url, &payload, written_at).await {
                tracing::warn!(key = %cache_key, error = %e, "failed to update cache");
            }
            return Some(Resolved { payload, origin: Origin::Network, raw_url, cache_key });
        }

        // The write time may be unreadable while the payload is intact.
        if let Some(payload) = self.cached_payload(&cache_key).await {
            tracing::warn!(url = %raw_url, "fetch failed, serving stale cache");
            return Some(Resolved { payload, origin: Origin::StaleCache, raw_url, cache_key });
        }

        tracing::debug!(url = %raw_url, "no content available");
        None
    }

    async fn cached_payload(&self, key: &str) -> Option<Bytes> {
        match self.store.get(key).await {
            Ok(Some(payload)) if !payload.is_empty() => Some(Bytes::from(payload)),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(key, error = %e, "cache read failed");
                None
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedFetcher;
    use super::*;
    use chrono::TimeDelta;
    use ghsnip_core::{CacheDb, FixedClock};
    use std::sync::Arc;

    const LOCATOR: &str = "https://github.com/owner/repo/blob/main/src/lib.rs";
    const RAW: &str = "https://raw.githubusercontent.com/owner/repo/main/src/lib.rs";

    type TestResolver = Resolver<CacheDb, Arc<ScriptedFetcher>, Arc<FixedClock>>;

    async fn setup(
        responses: impl IntoIterator<Item = Option<&'static str>>, now: i64,
    ) -> (TestResolver, Arc<ScriptedFetcher>, Arc<FixedClock>) {
        let db = CacheDb::open_in_memory().await.unwrap();
        let fetcher = Arc::new(ScriptedFetcher::new(responses));
        let clock = Arc::new(FixedClock::at_secs(now));
        let resolver = Resolver::new(db, fetcher.clone(), clock.clone(), Hosts::default(), ".ghplugin");
        (resolver, fetcher, clock)
    }

    async fn seed(resolver: &TestResolver, payload: &str, secs: i64) {
        let key = resolver.cache_key(RAW);
        let at = DateTime::from_timestamp(secs, 0).unwrap();
        resolver.store().put(&key, RAW, payload.as_bytes(), at).await.unwrap();
    }

    fn at(secs: i64) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(secs, 0)
    }

    fn reference() -> SourceReference {
        SourceReference::parse(LOCATOR)
    }

    #[tokio::test]
    async fn test_fresh_cache_skips_network() {
        let (resolver, fetcher, _) = setup([Some("live")], 110).await;
        seed(&resolver, "cached", 100).await;

        let resolved = resolver.resolve(&reference(), at(50), false).await.unwrap();

        assert_eq!(resolved.origin, Origin::FreshCache);
        assert_eq!(resolved.payload, "cached");
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_stale_cache_refetches_and_overwrites() {
        let (resolver, fetcher, _) = setup([Some("live")], 110).await;
        seed(&resolver, "cached", 50).await;

        let resolved = resolver.resolve(&reference(), at(100), false).await.unwrap();

        assert_eq!(resolved.origin, Origin::Network);
        assert_eq!(resolved.payload, "live");
        assert_eq!(fetcher.calls(), 1);
        assert_eq!(fetcher.urls(), vec![RAW.to_string()]);

        let key = resolver.cache_key(RAW);
        assert_eq!(resolver.store().get(&key).await.unwrap().unwrap(), b"live");
        assert_eq!(resolver.store().write_time_of(&key).await.unwrap(), at(110));
    }

    #[tokio::test]
    async fn test_purge_forces_fetch_even_when_fresh() {
        let (resolver, fetcher, _) = setup([Some("live")], 110).await;
        seed(&resolver, "cached", 100).await;

        let resolved = resolver.resolve(&reference(), at(50), true).await.unwrap();

        assert_eq!(resolved.origin, Origin::Network);
        assert_eq!(resolved.payload, "live");
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_serves_stale_cache_without_touching_time() {
        let (resolver, fetcher, _) = setup([None], 110).await;
        seed(&resolver, "cached", 10).await;

        let resolved = resolver.resolve(&reference(), at(100), false).await.unwrap();

        assert_eq!(resolved.origin, Origin::StaleCache);
        assert_eq!(resolved.payload, "cached");
        assert_eq!(fetcher.calls(), 1);
        let key = resolver.cache_key(RAW);
        assert_eq!(resolver.store().write_time_of(&key).await.unwrap(), at(10));
    }

    #[tokio::test]
    async fn test_purge_with_failed_fetch_still_falls_back() {
        let (resolver, _, _) = setup([None], 110).await;
        seed(&resolver, "cached", 100).await;

        let resolved = resolver.resolve(&reference(), at(50), true).await.unwrap();
        assert_eq!(resolved.origin, Origin::StaleCache);
    }

    #[tokio::test]
    async fn test_empty_body_counts_as_failure() {
        let (resolver, _, _) = setup([Some("")], 110).await;
        seed(&resolver, "cached", 10).await;

        let resolved = resolver.resolve(&reference(), at(100), false).await.unwrap();
        assert_eq!(resolved.origin, Origin::StaleCache);

        let key = resolver.cache_key(RAW);
        assert_eq!(resolver.store().get(&key).await.unwrap().unwrap(), b"cached");
    }

    #[tokio::test]
    async fn test_total_absence() {
        let (resolver, fetcher, _) = setup([None], 110).await;

        assert!(resolver.resolve(&reference(), at(100), false).await.is_none());
        assert_eq!(fetcher.calls(), 1);
        assert_eq!(resolver.store().count_entries().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_reference_time_always_fetches() {
        let (resolver, fetcher, _) = setup([Some("live")], 110).await;
        seed(&resolver, "cached", 109).await;

        let resolved = resolver.resolve(&reference(), None, false).await.unwrap();
        assert_eq!(resolved.origin, Origin::Network);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_successful_fetch_is_reused_immediately() {
        let (resolver, fetcher, _) = setup([Some("live"), Some("second")], 110).await;

        let first = resolver.resolve(&reference(), at(50), false).await.unwrap();
        assert_eq!(first.origin, Origin::Network);

        let second = resolver.resolve(&reference(), at(50), false).await.unwrap();
        assert_eq!(second.origin, Origin::FreshCache);
        assert_eq!(second.payload, "live");
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_cache_ages_out_as_time_passes() {
        let (resolver, fetcher, clock) = setup([Some("v1"), Some("v2")], 110).await;

        resolver.resolve(&reference(), at(100), false).await.unwrap();
        // 15 < 25 * 2
        clock.advance(TimeDelta::seconds(15));
        let hit = resolver.resolve(&reference(), at(100), false).await.unwrap();
        assert_eq!(hit.origin, Origin::FreshCache);

        // page edited at 600: 500 < 10 * 2 fails
        clock.advance(TimeDelta::seconds(485));
        let refetched = resolver.resolve(&reference(), at(600), false).await.unwrap();
        assert_eq!(refetched.origin, Origin::Network);
        assert_eq!(refetched.payload, "v2");
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_unrenderable_reference_does_nothing() {
        let (resolver, fetcher, _) = setup([Some("live")], 110).await;
        let reference = SourceReference::parse("https://github.com/owner/repo/tree/main/src");

        assert!(resolver.resolve(&reference, at(50), false).await.is_none());
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_namespace_isolates_keys() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let fetcher = Arc::new(ScriptedFetcher::new([Some("a")]));
        let ours =
            Resolver::new(db.clone(), fetcher.clone(), FixedClock::at_secs(110), Hosts::default(), ".ghplugin");
        let theirs = Resolver::new(db, fetcher.clone(), FixedClock::at_secs(110), Hosts::default(), ".other");

        ours.resolve(&reference(), at(50), false).await.unwrap();

        assert!(theirs.resolve(&reference(), at(50), false).await.is_none());
        assert_eq!(fetcher.calls(), 2);
    }

    /// Store whose rows have an unreadable write time but an intact payload.
    struct UnreadableTimeStore {
        payload: Option<&'static str>,
    }

    #[async_trait::async_trait]
    impl ContentStore for UnreadableTimeStore {
        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, ghsnip_core::Error> {
            Ok(self.payload.map(|p| p.as_bytes().to_vec()))
        }

        async fn put(
            &self, _key: &str, _url: &str, _payload: &[u8], _written_at: DateTime<Utc>,
        ) -> Result<(), ghsnip_core::Error> {
            Err(ghsnip_core::Error::CorruptEntry("read-only".into()))
        }

        async fn write_time_of(&self, _key: &str) -> Result<Option<DateTime<Utc>>, ghsnip_core::Error> {
            Err(ghsnip_core::Error::CorruptEntry("written_at: not a timestamp".into()))
        }
    }

    #[tokio::test]
    async fn test_unreadable_write_time_still_falls_back_to_payload() {
        let store = UnreadableTimeStore { payload: Some("cached") };
        let resolver =
            Resolver::new(store, ScriptedFetcher::new([None]), FixedClock::at_secs(110), Hosts::default(), ".ghplugin");

        let resolved = resolver.resolve(&reference(), at(100), false).await.unwrap();

        assert_eq!(resolved.origin, Origin::StaleCache);
        assert_eq!(resolved.payload, "cached");
        assert_eq!(resolver.fetcher().calls(), 1);
    }

    #[tokio::test]
    async fn test_unreadable_write_time_prefers_live_fetch() {
        let store = UnreadableTimeStore { payload: Some("cached") };
        let resolver = Resolver::new(
            store,
            ScriptedFetcher::new([Some("live")]),
            FixedClock::at_secs(110),
            Hosts::default(),
            ".ghplugin",
        );

        let resolved = resolver.resolve(&reference(), at(100), false).await.unwrap();

        assert_eq!(resolved.origin, Origin::Network);
        assert_eq!(resolved.payload, "live");
    }

    #[tokio::test]
    async fn test_empty_cached_payload_is_not_fresh() {
        let (resolver, fetcher, _) = setup([Some("live")], 110).await;
        seed(&resolver, "", 100).await;

        let resolved = resolver.resolve(&reference(), at(50), false).await.unwrap();

        assert_eq!(resolved.origin, Origin::Network);
        assert_eq!(fetcher.calls(), 1);
    }
}
