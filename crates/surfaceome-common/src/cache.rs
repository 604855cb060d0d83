//! Bounded single-flight cache
//!
//! [`SingleFlightCache`] memoizes the result of an async computation per key.
//! Concurrent callers asking for the same missing key share one computation:
//! the first caller runs it, the others wait on the same [`OnceCell`].
//! A computation that returns an error leaves the key uninitialized, so the
//! next caller tries again.
//!
//! The cache holds at most `capacity` keys. Inserting a new key into a full
//! cache evicts the least recently used key whose value is ready. Keys still
//! being computed are never evicted, so while every held key is in flight the
//! cache may briefly exceed `capacity`.
//!
//! # Example
//!
//! ```
//! use surfaceome_common::cache::SingleFlightCache;
//!
//! let runtime = tokio::runtime::Runtime::new().unwrap();
//! runtime.block_on(async {
//!     let cache: SingleFlightCache<String, usize> = SingleFlightCache::new(5000);
//!     let length = cache
//!         .get_or_try_init("P12345".to_string(), || async { Ok::<_, ()>(393) })
//!         .await
//!         .unwrap();
//!     assert_eq!(length, 393);
//!     assert_eq!(cache.stats().misses, 1);
//! });
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::OnceCell;

/// Usage counters for a cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered without running the computation
    pub hits: u64,
    /// Lookups that ran the computation
    pub misses: u64,
    pub evictions: u64,
    /// Keys currently held
    pub size: usize,
    pub capacity: usize,
}

impl CacheStats {
    /// Hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

struct Slot<V> {
    cell: Arc<OnceCell<V>>,
    last_access: u64,
}

/// Thread-safe, capacity-bounded, get-or-compute cache
pub struct SingleFlightCache<K, V> {
    slots: Mutex<HashMap<K, Slot<V>>>,
    capacity: usize,
    // Monotonic clock for recency; a larger tick means more recently used.
    clock: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl<K, V> SingleFlightCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Create a cache holding at most `capacity` keys (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: Mutex::new(HashMap::with_capacity(capacity.min(1024))),
            capacity,
            clock: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Return the cached value for `key`, computing it with `init` on a miss
    ///
    /// Only one `init` runs per key at a time; callers arriving while it is in
    /// flight wait for its outcome instead of starting their own.
    pub async fn get_or_try_init<F, Fut, E>(&self, key: K, init: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let cell = self.slot_for(key);

        let mut computed = false;
        let value = cell
            .get_or_try_init(|| {
                computed = true;
                init()
            })
            .await?
            .clone();

        if computed {
            self.misses.fetch_add(1, Ordering::Relaxed);
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }

        Ok(value)
    }

    /// Peek at an initialized value without touching recency or counters
    pub fn get(&self, key: &K) -> Option<V> {
        self.lock()
            .get(key)
            .and_then(|slot| slot.cell.get().cloned())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            size: self.len(),
            capacity: self.capacity,
        }
    }

    /// Find or create the cell for `key`, marking it most recently used
    fn slot_for(&self, key: K) -> Arc<OnceCell<V>> {
        let tick = self.clock.fetch_add(1, Ordering::Relaxed);
        let mut slots = self.lock();

        if let Some(slot) = slots.get_mut(&key) {
            slot.last_access = tick;
            return Arc::clone(&slot.cell);
        }

        if slots.len() >= self.capacity {
            self.evict_lru(&mut slots);
        }

        let cell = Arc::new(OnceCell::new());
        slots.insert(
            key,
            Slot {
                cell: Arc::clone(&cell),
                last_access: tick,
            },
        );
        cell
    }

    fn evict_lru(&self, slots: &mut HashMap<K, Slot<V>>) {
        if let Some(lru_key) = slots
            .iter()
            .filter(|(_, slot)| slot.cell.initialized())
            .min_by_key(|(_, slot)| slot.last_access)
            .map(|(key, _)| key.clone())
        {
            slots.remove(&lru_key);
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }
    }

    // A poisoned map is still structurally valid.
    fn lock(&self) -> MutexGuard<'_, HashMap<K, Slot<V>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[tokio::test]
    async fn test_second_lookup_is_a_hit() {
        let cache: SingleFlightCache<&str, String> = SingleFlightCache::new(10);

        let first = cache
            .get_or_try_init("P12345", || async { Ok::<_, ()>("MEEPQ".to_string()) })
            .await
            .unwrap();
        let second = cache
            .get_or_try_init("P12345", || async { Ok::<_, ()>("recomputed".to_string()) })
            .await
            .unwrap();

        assert_eq!(first, second);
        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.size, 1);
        assert!((stats.hit_rate() - 50.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_failed_init_is_retried() {
        let cache: SingleFlightCache<&str, u32> = SingleFlightCache::new(10);

        let err = cache
            .get_or_try_init("Q9Y6K9", || async { Err::<u32, _>("boom") })
            .await;
        assert_eq!(err, Err("boom"));
        assert_eq!(cache.get(&"Q9Y6K9"), None);

        let ok = cache
            .get_or_try_init("Q9Y6K9", || async { Ok::<_, &str>(7) })
            .await;
        assert_eq!(ok, Ok(7));
    }

    #[tokio::test]
    async fn test_least_recently_used_key_is_evicted() {
        let cache: SingleFlightCache<u32, u32> = SingleFlightCache::new(2);

        for key in [1, 2] {
            cache
                .get_or_try_init(key, || async move { Ok::<_, ()>(key * 10) })
                .await
                .unwrap();
        }
        // Touch 1 so that 2 becomes the oldest.
        cache
            .get_or_try_init(1, || async { Ok::<_, ()>(0) })
            .await
            .unwrap();
        cache
            .get_or_try_init(3, || async { Ok::<_, ()>(30) })
            .await
            .unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&1), Some(10));
        assert_eq!(cache.get(&2), None);
        assert_eq!(cache.get(&3), Some(30));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_share_one_computation() {
        let cache = Arc::new(SingleFlightCache::<String, usize>::new(16));
        let runs = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let cache = Arc::clone(&cache);
            let runs = Arc::clone(&runs);
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_try_init("O15551".to_string(), || async move {
                        runs.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok::<_, ()>(42)
                    })
                    .await
                    .unwrap()
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), 42);
        }
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats().misses, 1);
        assert_eq!(cache.stats().hits, 15);
    }

    #[tokio::test]
    async fn test_in_flight_key_survives_eviction() {
        let cache = Arc::new(SingleFlightCache::<String, String>::new(1));
        let runs = Arc::new(AtomicUsize::new(0));
        let (release, released) = tokio::sync::oneshot::channel::<()>();

        let pending = {
            let cache = Arc::clone(&cache);
            let runs = Arc::clone(&runs);
            tokio::spawn(async move {
                cache
                    .get_or_try_init("P12345".to_string(), || async move {
                        runs.fetch_add(1, Ordering::SeqCst);
                        let _ = released.await;
                        Ok::<_, ()>("MEEPQ".to_string())
                    })
                    .await
            })
        };
        while cache.is_empty() {
            tokio::task::yield_now().await;
        }

        // A full cache holding only an in-flight key still admits a new one.
        cache
            .get_or_try_init("Q9Y6K9".to_string(), || async { Ok::<_, ()>("MSDP".to_string()) })
            .await
            .unwrap();
        assert_eq!(cache.stats().evictions, 0);

        let joined = {
            let cache = Arc::clone(&cache);
            let runs = Arc::clone(&runs);
            tokio::spawn(async move {
                cache
                    .get_or_try_init("P12345".to_string(), || async move {
                        runs.fetch_add(1, Ordering::SeqCst);
                        Ok::<_, ()>("duplicate".to_string())
                    })
                    .await
            })
        };
        tokio::task::yield_now().await;
        release.send(()).unwrap();

        assert_eq!(pending.await.unwrap().unwrap(), "MEEPQ");
        assert_eq!(joined.await.unwrap().unwrap(), "MEEPQ");
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let cache: SingleFlightCache<u8, u8> = SingleFlightCache::new(0);
        assert_eq!(cache.capacity(), 1);
        assert!(cache.is_empty());
    }
}
