//! Request-scoped container pools and bounded lookup caches.
//!
//! Dispatching reuses [`ParamMap`] containers between requests instead of
//! allocating fresh ones. Two rules keep the pool safe:
//!
//! - A container is only accepted back if it is empty. Non-empty containers
//!   are dropped, so stale keys can never leak into an unrelated request.
//! - The pool never grows past its capacity; extra releases are dropped.
//!
//! [`BoundedCache`] backs the route-match and path-normalization caches. It
//! stops accepting new keys once full instead of evicting.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde::Serialize;

use crate::params::ParamMap;

/// Default number of containers kept per pool.
pub const DEFAULT_POOL_CAPACITY: usize = 50;

/// Default capacity of the route-match cache.
pub const DEFAULT_MATCH_CACHE_CAPACITY: usize = 500;

/// Default capacity of the path-normalization cache.
pub const DEFAULT_NORMALIZE_CACHE_CAPACITY: usize = 200;

/// Counters for a [`ContainerPool`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Maximum number of idle containers kept.
    pub capacity: usize,
    /// Idle containers currently held.
    pub available: usize,
    /// Containers allocated because the pool was empty.
    pub allocated: u64,
    /// Containers handed out from the pool.
    pub reused: u64,
    /// Releases dropped (non-empty container or full pool).
    pub discarded: u64,
}

/// A bounded pool of reusable [`ParamMap`] containers.
///
/// # Example
///
/// ```rust
/// use switchyard_router::ContainerPool;
///
/// let pool = ContainerPool::new(2);
///
/// let map = pool.acquire();
/// assert!(map.is_empty());
/// assert!(pool.release(map));
/// assert_eq!(pool.available(), 1);
///
/// let mut dirty = pool.acquire();
/// dirty.insert("id".to_string(), "42".to_string());
/// assert!(!pool.release(dirty));
/// assert_eq!(pool.available(), 0);
/// ```
#[derive(Debug)]
pub struct ContainerPool {
    free: Mutex<Vec<ParamMap>>,
    capacity: usize,
    allocated: AtomicU64,
    reused: AtomicU64,
    discarded: AtomicU64,
}

impl Default for ContainerPool {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_CAPACITY)
    }
}

impl ContainerPool {
    /// Creates a pool that keeps at most `capacity` idle containers.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            free: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
            allocated: AtomicU64::new(0),
            reused: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
        }
    }

    /// Returns an empty container, recycled if one is available.
    pub fn acquire(&self) -> ParamMap {
        if let Some(map) = self.free.lock().pop() {
            debug_assert!(map.is_empty(), "pooled container holds residual entries");
            self.reused.fetch_add(1, Ordering::Relaxed);
            return map;
        }
        self.allocated.fetch_add(1, Ordering::Relaxed);
        ParamMap::new()
    }

    /// Returns a container to the pool.
    ///
    /// Returns `false` and drops the container if it still holds entries or
    /// the pool is full.
    pub fn release(&self, map: ParamMap) -> bool {
        if !map.is_empty() {
            self.discarded.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        let mut free = self.free.lock();
        if free.len() >= self.capacity {
            self.discarded.fetch_add(1, Ordering::Relaxed);
            return false;
        }
        free.push(map);
        true
    }

    /// Clears a container the caller is done with and releases it.
    pub fn recycle(&self, mut map: ParamMap) -> bool {
        map.clear();
        self.release(map)
    }

    /// Returns the number of idle containers.
    #[must_use]
    pub fn available(&self) -> usize {
        self.free.lock().len()
    }

    /// Returns the maximum number of idle containers kept.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops all idle containers and zeroes the counters.
    pub fn clear(&self) {
        self.free.lock().clear();
        self.allocated.store(0, Ordering::Relaxed);
        self.reused.store(0, Ordering::Relaxed);
        self.discarded.store(0, Ordering::Relaxed);
    }

    /// Returns a snapshot of the pool counters.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            capacity: self.capacity,
            available: self.available(),
            allocated: self.allocated.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }
}

/// Counters for both pools of a [`ResourcePool`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResourcePoolStats {
    /// Path parameter containers.
    pub params: PoolStats,
    /// Query value containers.
    pub query: PoolStats,
}

/// Pools for the per-request containers the dispatcher fills.
#[derive(Debug, Default)]
pub struct ResourcePool {
    params: ContainerPool,
    query: ContainerPool,
}

impl ResourcePool {
    /// Creates pools that each keep at most `capacity` idle containers.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            params: ContainerPool::new(capacity),
            query: ContainerPool::new(capacity),
        }
    }

    /// Acquires an empty path parameter container.
    pub fn acquire_params(&self) -> ParamMap {
        self.params.acquire()
    }

    /// Releases a path parameter container (dropped unless empty).
    pub fn release_params(&self, map: ParamMap) -> bool {
        self.params.release(map)
    }

    /// Acquires an empty query container.
    pub fn acquire_query(&self) -> ParamMap {
        self.query.acquire()
    }

    /// Releases a query container (dropped unless empty).
    pub fn release_query(&self, map: ParamMap) -> bool {
        self.query.release(map)
    }

    /// Clears and releases both containers of a finished request.
    pub fn recycle(&self, params: ParamMap, query: ParamMap) {
        self.params.recycle(params);
        self.query.recycle(query);
    }

    /// Drops all idle containers and zeroes the counters.
    pub fn clear(&self) {
        self.params.clear();
        self.query.clear();
    }

    /// Returns a snapshot of both pools.
    #[must_use]
    pub fn stats(&self) -> ResourcePoolStats {
        ResourcePoolStats {
            params: self.params.stats(),
            query: self.query.stats(),
        }
    }
}

/// Counters for a [`BoundedCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Maximum number of entries.
    pub capacity: usize,
    /// Entries currently held.
    pub len: usize,
    /// Lookups that found an entry.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
}

/// A fixed-capacity memo table.
///
/// Once `capacity` keys are stored, new keys are rejected; existing keys can
/// still be overwritten. There is no eviction.
///
/// # Example
///
/// ```rust
/// use switchyard_router::BoundedCache;
///
/// let cache = BoundedCache::new(1);
/// assert!(cache.insert("a".to_string(), 1));
/// assert!(!cache.insert("b".to_string(), 2));
/// assert_eq!(cache.get("a"), Some(1));
/// assert_eq!(cache.get("b"), None);
/// ```
#[derive(Debug)]
pub struct BoundedCache<K, V> {
    entries: Mutex<HashMap<K, V>>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K, V> BoundedCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Creates an empty cache holding at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::with_capacity(capacity)),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns a copy of the cached value.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let value = self.entries.lock().get(key).cloned();
        let counter = if value.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        value
    }

    /// Stores a value. Returns `false` if the key is new and the cache is full.
    pub fn insert(&self, key: K, value: V) -> bool {
        let mut entries = self.entries.lock();
        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            return false;
        }
        entries.insert(key, value);
        true
    }

    /// Returns the number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Returns true if no new keys will be accepted.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }

    /// Returns the maximum number of entries.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Removes all entries and zeroes the counters.
    pub fn clear(&self) {
        self.entries.lock().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    /// Returns a snapshot of the cache counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            capacity: self.capacity,
            len: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_fresh_container() {
        let pool = ContainerPool::new(4);
        let map = pool.acquire();
        assert!(map.is_empty());
        assert_eq!(pool.stats().allocated, 1);
    }

    #[test]
    fn test_release_then_reuse() {
        let pool = ContainerPool::new(4);
        let map = pool.acquire();
        assert!(pool.release(map));

        let again = pool.acquire();
        assert!(again.is_empty());

        let stats = pool.stats();
        assert_eq!(stats.allocated, 1);
        assert_eq!(stats.reused, 1);
        assert_eq!(stats.available, 0);
    }

    #[test]
    fn test_non_empty_release_is_dropped() {
        let pool = ContainerPool::new(4);
        let mut map = pool.acquire();
        map.insert("stale".to_string(), "value".to_string());

        assert!(!pool.release(map));
        assert_eq!(pool.available(), 0);
        assert_eq!(pool.stats().discarded, 1);

        // The next request never sees the stale key
        let next = pool.acquire();
        assert!(next.get("stale").is_none());
        assert!(next.is_empty());
    }

    #[test]
    fn test_recycle_clears_before_release() {
        let pool = ContainerPool::new(4);
        let mut map = pool.acquire();
        map.insert("id".to_string(), "1".to_string());

        assert!(pool.recycle(map));
        assert!(pool.acquire().is_empty());
    }

    #[test]
    fn test_pool_capacity_bound() {
        let pool = ContainerPool::new(2);
        assert!(pool.release(ParamMap::new()));
        assert!(pool.release(ParamMap::new()));
        assert!(!pool.release(ParamMap::new()));
        assert_eq!(pool.available(), 2);
        assert_eq!(pool.stats().discarded, 1);
    }

    #[test]
    fn test_zero_capacity_pool_never_stores() {
        let pool = ContainerPool::new(0);
        assert!(!pool.release(ParamMap::new()));
        assert_eq!(pool.available(), 0);
    }

    #[test]
    fn test_pool_clear() {
        let pool = ContainerPool::new(2);
        pool.release(pool.acquire());
        pool.clear();
        assert_eq!(pool.stats(), PoolStats { capacity: 2, ..PoolStats::default() });
    }

    #[test]
    fn test_resource_pool_keeps_pools_separate() {
        let pool = ResourcePool::new(8);
        pool.release_params(ParamMap::new());

        let stats = pool.stats();
        assert_eq!(stats.params.available, 1);
        assert_eq!(stats.query.available, 0);

        let mut params = pool.acquire_params();
        let mut query = pool.acquire_query();
        params.insert("id".to_string(), "1".to_string());
        query.insert("page".to_string(), "2".to_string());
        pool.recycle(params, query);

        let stats = pool.stats();
        assert_eq!(stats.params.available, 1);
        assert_eq!(stats.query.available, 1);
    }

    #[test]
    fn test_cache_stops_inserting_when_full() {
        let cache: BoundedCache<String, u32> = BoundedCache::new(2);
        assert!(cache.insert("a".to_string(), 1));
        assert!(cache.insert("b".to_string(), 2));
        assert!(cache.is_full());
        assert!(!cache.insert("c".to_string(), 3));

        // Existing keys are never evicted
        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.get("b"), Some(2));
        assert_eq!(cache.get("c"), None);
    }

    #[test]
    fn test_cache_overwrites_existing_key_when_full() {
        let cache: BoundedCache<String, u32> = BoundedCache::new(1);
        cache.insert("a".to_string(), 1);
        assert!(cache.insert("a".to_string(), 5));
        assert_eq!(cache.get("a"), Some(5));
    }

    #[test]
    fn test_cache_counts_hits_and_misses() {
        let cache: BoundedCache<String, Option<usize>> = BoundedCache::new(4);
        cache.insert("GET:/missing".to_string(), None);

        assert_eq!(cache.get("GET:/missing"), Some(None));
        assert_eq!(cache.get("GET:/other"), None);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.len, 1);
    }

    #[test]
    fn test_cache_clear() {
        let cache: BoundedCache<String, u32> = BoundedCache::new(1);
        cache.insert("a".to_string(), 1);
        let _ = cache.get("a");
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats().hits, 0);
        assert!(cache.insert("b".to_string(), 2));
    }
}
