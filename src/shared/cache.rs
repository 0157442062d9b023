//! Process-wide TTL cache for expensive query results.
//!
//! Values are stored as `serde_json::Value` so a single cache instance can hold
//! heterogeneous results. Concurrent misses on the same key all compute and the
//! last writer wins; staleness is bounded by the entry's TTL.

use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Prefix of every page-cache key
pub const PAGE_CACHE_PREFIX: &str = "view_cache_";

struct CacheEntry {
    value: serde_json::Value,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

#[derive(Default)]
pub struct TtlCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl TtlCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch an unexpired value, dropping the entry if it has expired
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.is_fresh() => {
                    return match serde_json::from_value(entry.value.clone()) {
                        Ok(value) => Some(value),
                        Err(e) => {
                            warn!("Cached value for '{}' has an unexpected shape: {}", key, e);
                            None
                        }
                    };
                }
                Some(_) => {}
                None => return None,
            }
        }

        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|entry| !entry.is_fresh()) {
            entries.remove(key);
        }
        None
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(e) => {
                warn!("Skipping cache write for '{}': {}", key, e);
                return;
            }
        };

        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// Return the cached value for `key`, or run `compute` and cache its result.
    ///
    /// Errors from `compute` are returned as-is and never cached.
    pub async fn get_or_compute<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        compute: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(hit) = self.get::<T>(key).await {
            debug!("Cache hit: {}", key);
            return Ok(hit);
        }

        debug!("Cache miss: {}", key);
        let value = compute().await?;
        self.set(key, &value, ttl).await;
        Ok(value)
    }

    /// Drop every entry whose key starts with `prefix`
    pub async fn invalidate_prefix(&self, prefix: &str) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        let removed = before - entries.len();
        if removed > 0 {
            debug!("Invalidated {} cache entries with prefix '{}'", removed, prefix);
        }
        removed
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

/// Build the page-cache key for a request path and raw query string.
///
/// Query parameters are decoded, sorted by name then value and re-encoded, so
/// the same parameter set yields the same key regardless of order or encoding.
pub fn page_cache_key(path: &str, query: Option<&str>) -> String {
    let mut pairs: Vec<(String, String)> = query
        .unwrap_or("")
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(name), decode_component(value))
        })
        .collect();
    pairs.sort();

    let canonical = pairs
        .iter()
        .map(|(name, value)| {
            format!(
                "{}={}",
                urlencoding::encode(name),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&");

    format!("{}{}_{}", PAGE_CACHE_PREFIX, path, canonical)
}

/// Key prefix shared by every cached page under `path`
pub fn page_cache_prefix(path: &str) -> String {
    format!("{}{}", PAGE_CACHE_PREFIX, path)
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_page_cache_key_is_order_insensitive() {
        let a = page_cache_key("/api/documents/insurance", Some("page=2&category=promotion"));
        let b = page_cache_key("/api/documents/insurance", Some("category=promotion&page=2"));
        assert_eq!(a, b);
        assert_eq!(
            a,
            "view_cache_/api/documents/insurance_category=promotion&page=2"
        );
    }

    #[test]
    fn test_page_cache_key_normalizes_encoding() {
        let encoded = page_cache_key("/api/documents/investment/search", Some("q=%E5%9F%BA%E9%87%91"));
        let raw = page_cache_key("/api/documents/investment/search", Some("q=基金"));
        assert_eq!(encoded, raw);

        let plus = page_cache_key("/p", Some("q=us+stock"));
        let percent = page_cache_key("/p", Some("q=us%20stock"));
        assert_eq!(plus, percent);
    }

    #[test]
    fn test_page_cache_key_distinguishes_values_and_paths() {
        assert_ne!(
            page_cache_key("/p", Some("page=1")),
            page_cache_key("/p", Some("page=2"))
        );
        assert_ne!(page_cache_key("/a", None), page_cache_key("/b", None));
        assert_eq!(page_cache_key("/a", None), page_cache_key("/a", Some("")));
    }

    #[tokio::test]
    async fn test_get_or_compute_caches_successful_results() {
        let cache = TtlCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value: Result<Vec<i64>, String> = cache
                .get_or_compute("numbers", Duration::from_secs(60), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(vec![1, 2, 3])
                })
                .await;
            assert_eq!(value.unwrap(), vec![1, 2, 3]);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_or_compute_does_not_cache_errors() {
        let cache = TtlCache::new();

        let first: Result<i64, String> = cache
            .get_or_compute("flaky", Duration::from_secs(60), || async {
                Err("boom".to_string())
            })
            .await;
        assert!(first.is_err());
        assert_eq!(cache.len().await, 0);

        let second: Result<i64, String> = cache
            .get_or_compute("flaky", Duration::from_secs(60), || async { Ok(7) })
            .await;
        assert_eq!(second.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_expired_entries_are_recomputed_and_dropped() {
        let cache = TtlCache::new();
        cache.set("stale", &1_i64, Duration::ZERO).await;

        assert_eq!(cache.get::<i64>("stale").await, None);
        assert_eq!(cache.len().await, 0);

        let value: Result<i64, String> = cache
            .get_or_compute("stale", Duration::from_secs(60), || async { Ok(2) })
            .await;
        assert_eq!(value.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_prefix_only_touches_matching_keys() {
        let cache = TtlCache::new();
        let ttl = Duration::from_secs(60);
        cache
            .set(&page_cache_key("/api/documents/insurance", Some("page=1")), &1, ttl)
            .await;
        cache
            .set(&page_cache_key("/api/documents/insurance", Some("page=2")), &2, ttl)
            .await;
        cache
            .set(&page_cache_key("/api/documents/investment", None), &3, ttl)
            .await;

        let removed = cache
            .invalidate_prefix(&page_cache_prefix("/api/documents/insurance"))
            .await;

        assert_eq!(removed, 2);
        assert_eq!(cache.len().await, 1);
    }
}
