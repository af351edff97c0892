//! Bounded memoization of sentiment results keyed by exact headline text.
//!
//! Entries never expire; the least-recently-used entry is evicted once the
//! capacity is exceeded. Concurrent requests for the same text share one
//! computation: later callers wait on a per-key gate and then read the
//! stored result.

use crate::types::SentimentResult;
use lru::LruCache;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::debug;

type KeyGate = Arc<tokio::sync::Mutex<()>>;

pub struct SentimentCache {
    entries: Mutex<LruCache<String, SentimentResult>>,
    in_flight: Mutex<HashMap<String, KeyGate>>,
}

impl SentimentCache {
    /// Creates a cache holding at most `capacity` entries (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached result for `text`, or runs `compute` and stores its output.
    ///
    /// A hit refreshes the entry's recency and does not call `compute`. Errors
    /// from `compute` are returned unchanged and nothing is stored.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `compute`.
    pub async fn get_or_compute<F, Fut, E>(&self, text: &str, compute: F) -> Result<SentimentResult, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<SentimentResult, E>>,
    {
        if let Some(hit) = self.lookup(text) {
            return Ok(hit);
        }

        let guard = InFlightGuard {
            cache: self,
            text,
            gate: self.gate_for(text),
        };
        let _permit = guard.gate.lock().await;

        // Another caller may have filled the entry while we waited.
        if let Some(hit) = self.lookup(text) {
            return Ok(hit);
        }

        let computed = compute().await;
        if let Ok(result) = &computed {
            self.entries.lock().put(text.to_owned(), *result);
        }
        computed
    }

    fn gate_for(&self, text: &str) -> KeyGate {
        let mut in_flight = self.in_flight.lock();
        Arc::clone(
            in_flight
                .entry(text.to_owned())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
        )
    }

    fn lookup(&self, text: &str) -> Option<SentimentResult> {
        let hit = self.entries.lock().get(text).copied();
        if hit.is_some() {
            debug!(text, "Sentiment cache hit");
        }
        hit
    }

    /// Returns true if `text` is cached, without touching its recency.
    #[must_use]
    pub fn contains(&self, text: &str) -> bool {
        self.entries.lock().contains(text)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

/// Releases a key's gate when its holder finishes, including when the
/// `get_or_compute` future is dropped mid-computation.
struct InFlightGuard<'a> {
    cache: &'a SentimentCache,
    text: &'a str,
    gate: KeyGate,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut in_flight = self.cache.in_flight.lock();
        // Only the map and this guard still hold the gate: nobody is waiting on it.
        if Arc::strong_count(&self.gate) == 2 {
            in_flight.remove(self.text);
        }
    }
}

impl Default for SentimentCache {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SentimentLabel;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn positive(score: f64) -> SentimentResult {
        SentimentResult::try_new(score, SentimentLabel::Positive).unwrap()
    }

    async fn insert(cache: &SentimentCache, text: &str) {
        cache
            .get_or_compute(text, || async { Ok::<_, Infallible>(positive(0.5)) })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_second_lookup_is_a_hit() {
        let cache = SentimentCache::new(10);
        let calls = AtomicUsize::new(0);
        let counter = &calls;

        for _ in 0..2 {
            let result = cache
                .get_or_compute("Fed holds rates", move || async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, Infallible>(positive(0.9))
                })
                .await
                .unwrap();
            assert_eq!(result, positive(0.9));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_keys_are_exact_text() {
        let cache = SentimentCache::new(10);
        insert(&cache, "Tesla beats estimates").await;

        assert!(cache.contains("Tesla beats estimates"));
        assert!(!cache.contains("tesla beats estimates"));
        assert!(!cache.contains("Tesla beats estimates "));
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache = SentimentCache::new(10);

        let failed: Result<SentimentResult, &str> =
            cache.get_or_compute("headline", || async { Err("down") }).await;
        assert_eq!(failed, Err("down"));
        assert!(cache.is_empty());

        let ok: Result<SentimentResult, &str> = cache
            .get_or_compute("headline", || async { Ok(positive(0.7)) })
            .await;
        assert_eq!(ok, Ok(positive(0.7)));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_overflow_evicts_least_recently_inserted() {
        let cache = SentimentCache::new(3);
        for text in ["a", "b", "c", "d"] {
            insert(&cache, text).await;
        }

        assert_eq!(cache.len(), 3);
        assert!(!cache.contains("a"));
        assert!(cache.contains("b"));
        assert!(cache.contains("c"));
        assert!(cache.contains("d"));
    }

    #[tokio::test]
    async fn test_hit_refreshes_recency() {
        let cache = SentimentCache::new(2);
        insert(&cache, "a").await;
        insert(&cache, "b").await;

        // Touch "a" so "b" becomes least recently used
        insert(&cache, "a").await;
        insert(&cache, "c").await;

        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
        assert!(cache.contains("c"));
    }

    #[tokio::test]
    async fn test_concurrent_requests_compute_once() {
        let cache = SentimentCache::new(10);
        let calls = AtomicUsize::new(0);
        let counter = &calls;

        let compute = move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok::<_, Infallible>(positive(0.8))
        };

        let (first, second, third) = tokio::join!(
            cache.get_or_compute("same headline", compute),
            cache.get_or_compute("same headline", compute),
            cache.get_or_compute("same headline", compute),
        );

        assert_eq!(first.unwrap(), positive(0.8));
        assert_eq!(second.unwrap(), positive(0.8));
        assert_eq!(third.unwrap(), positive(0.8));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.in_flight.lock().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_computation_releases_gate() {
        let cache = SentimentCache::new(10);

        let timed_out = tokio::time::timeout(
            Duration::from_millis(10),
            cache.get_or_compute("slow headline", || async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, Infallible>(positive(0.9))
            }),
        )
        .await;

        assert!(timed_out.is_err());
        assert!(!cache.contains("slow headline"));
        assert!(cache.in_flight.lock().is_empty());

        let retried = cache
            .get_or_compute("slow headline", || async { Ok::<_, Infallible>(positive(0.7)) })
            .await;
        assert_eq!(retried.unwrap(), positive(0.7));
        assert!(cache.in_flight.lock().is_empty());
    }

    #[tokio::test]
    async fn test_capacity_and_clear() {
        let cache = SentimentCache::new(0);
        assert_eq!(cache.capacity(), 1);

        insert(&cache, "x").await;
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(SentimentCache::default().capacity(), 1000);
    }
}
