//! Key set cache with per-URL refresh locking.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use tokio::sync::Mutex;
use tracing::debug;

use super::{HttpKeySetFetcher, KeySetFetcher};
use crate::error::{jwks_error, Error, JwksErrorKind};
use crate::http::HttpClientConfig;

/// When cached key sets are refetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    /// Age after which a cached set is refetched before use.
    pub max_age: Duration,
    /// Minimum time between refetches triggered by an unknown `kid`.
    pub min_refresh_interval: Duration,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            max_age: Duration::from_secs(3600),
            min_refresh_interval: Duration::from_secs(30),
        }
    }
}

struct CachedKeySet {
    keys: JwkSet,
    fetched_at: Instant,
}

impl CachedKeySet {
    fn age(&self) -> Duration {
        self.fetched_at.elapsed()
    }
}

/// Cache of key sets keyed by URL.
///
/// Concurrent misses for one URL wait on the same refresh lock, so a rotation storm
/// results in a single fetch. Unknown key ids trigger at most one refetch per
/// `min_refresh_interval`.
pub struct JwksCache {
    fetcher: Arc<dyn KeySetFetcher>,
    policy: RefreshPolicy,
    key_sets: DashMap<String, Arc<CachedKeySet>>,
    refresh_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl JwksCache {
    pub fn new(fetcher: Arc<dyn KeySetFetcher>, policy: RefreshPolicy) -> Self {
        Self {
            fetcher,
            policy,
            key_sets: DashMap::new(),
            refresh_locks: DashMap::new(),
        }
    }

    /// Cache backed by an [`HttpKeySetFetcher`].
    pub fn with_http(config: HttpClientConfig, policy: RefreshPolicy) -> Result<Self, Error> {
        let fetcher = HttpKeySetFetcher::from_config(config)?;
        Ok(Self::new(Arc::new(fetcher), policy))
    }

    /// Resolve the key `kid` published at `url`.
    ///
    /// # Returns
    ///
    /// The matching key, or an `UnknownKeyId` error if the set does not publish it
    /// even after a permitted refetch.
    pub async fn resolve(&self, url: &str, kid: &str) -> Result<Jwk, Error> {
        if let Some(cached) = self.cached(url) {
            if cached.age() < self.policy.max_age {
                if let Some(jwk) = cached.keys.find(kid) {
                    return Ok(jwk.clone());
                }
                if cached.age() < self.policy.min_refresh_interval {
                    return Err(unknown_kid(kid));
                }
                debug!("Key id {} not in cached set for {}, refetching", kid, url);
            }
        }

        let refreshed = self.refresh(url).await?;
        refreshed
            .keys
            .find(kid)
            .cloned()
            .ok_or_else(|| unknown_kid(kid))
    }

    /// Drop the cached set for `url`.
    pub fn invalidate(&self, url: &str) {
        self.key_sets.remove(url);
    }

    fn cached(&self, url: &str) -> Option<Arc<CachedKeySet>> {
        self.key_sets.get(url).map(|entry| Arc::clone(entry.value()))
    }

    async fn refresh(&self, url: &str) -> Result<Arc<CachedKeySet>, Error> {
        let lock = self
            .refresh_locks
            .entry(url.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let _guard = lock.lock().await;

        // Another caller may have refreshed while we waited.
        if let Some(cached) = self.cached(url) {
            if cached.age() < self.policy.min_refresh_interval {
                debug!("Key set for {} was refreshed by another request", url);
                return Ok(cached);
            }
        }

        let keys = self.fetcher.fetch(url).await?;
        let refreshed = Arc::new(CachedKeySet {
            keys,
            fetched_at: Instant::now(),
        });
        self.key_sets.insert(url.to_string(), Arc::clone(&refreshed));

        debug!("Cached {} keys from {}", refreshed.keys.keys.len(), url);
        Ok(refreshed)
    }
}

fn unknown_kid(kid: &str) -> Error {
    jwks_error(
        JwksErrorKind::UnknownKeyId,
        &format!("key id {} is not published", kid),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, WebhookErrorKind};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const URL: &str = "https://issuer.example/.well-known/jwks.json";

    fn key_set(kids: &[&str]) -> JwkSet {
        let keys: Vec<serde_json::Value> = kids
            .iter()
            .map(|kid| serde_json::json!({"kty": "oct", "k": "c2VjcmV0", "kid": kid}))
            .collect();
        serde_json::from_value(serde_json::json!({ "keys": keys })).unwrap()
    }

    /// Serves `rotations[n]` on the n-th fetch, repeating the last one.
    struct StubFetcher {
        rotations: Vec<Vec<&'static str>>,
        calls: AtomicUsize,
        delay: Duration,
    }

    impl StubFetcher {
        fn new(rotations: Vec<Vec<&'static str>>) -> Self {
            Self {
                rotations,
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl KeySetFetcher for StubFetcher {
        async fn fetch(&self, _url: &str) -> Result<JwkSet, Error> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let kids = &self.rotations[n.min(self.rotations.len() - 1)];
            Ok(key_set(kids))
        }
    }

    fn policy(max_age_secs: u64, min_refresh_secs: u64) -> RefreshPolicy {
        RefreshPolicy {
            max_age: Duration::from_secs(max_age_secs),
            min_refresh_interval: Duration::from_secs(min_refresh_secs),
        }
    }

    #[tokio::test]
    async fn test_cached_set_is_reused() {
        let fetcher = Arc::new(StubFetcher::new(vec![vec!["a", "b"]]));
        let cache = JwksCache::new(fetcher.clone(), policy(3600, 30));

        assert!(cache.resolve(URL, "a").await.is_ok());
        assert!(cache.resolve(URL, "b").await.is_ok());
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_unknown_kid_refetches_after_interval() {
        let fetcher = Arc::new(StubFetcher::new(vec![vec!["a"], vec!["a", "rotated"]]));
        let cache = JwksCache::new(fetcher.clone(), policy(3600, 0));

        assert!(cache.resolve(URL, "a").await.is_ok());
        assert!(cache.resolve(URL, "rotated").await.is_ok());
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_unknown_kid_within_interval_does_not_refetch() {
        let fetcher = Arc::new(StubFetcher::new(vec![vec!["a"], vec!["a", "rotated"]]));
        let cache = JwksCache::new(fetcher.clone(), policy(3600, 60));

        assert!(cache.resolve(URL, "a").await.is_ok());
        let err = cache.resolve(URL, "rotated").await.unwrap_err();

        assert_eq!(err.error_kind, ErrorKind::Jwks(JwksErrorKind::UnknownKeyId));
        assert_eq!(err.reason(), WebhookErrorKind::MalformedCredential);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_misses_fetch_once() {
        let mut stub = StubFetcher::new(vec![vec!["a"]]);
        stub.delay = Duration::from_millis(50);
        let fetcher = Arc::new(stub);
        let cache = JwksCache::new(fetcher.clone(), policy(3600, 30));

        let (a, b, c) = tokio::join!(
            cache.resolve(URL, "a"),
            cache.resolve(URL, "a"),
            cache.resolve(URL, "a"),
        );

        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let fetcher = Arc::new(StubFetcher::new(vec![vec!["a"]]));
        let cache = JwksCache::new(fetcher.clone(), policy(3600, 0));

        assert!(cache.resolve(URL, "a").await.is_ok());
        cache.invalidate(URL);
        assert!(cache.resolve(URL, "a").await.is_ok());
        assert_eq!(fetcher.calls(), 2);
    }
}
