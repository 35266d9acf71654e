//! Dispatch counters and introspection snapshots.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use switchyard_router::{CacheStats, ResourcePoolStats};

use crate::table::Tier;

/// Per-tier hit counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierStats {
    /// Requests resolved by the fast-path list.
    pub fast_path: u64,
    /// Requests resolved by the static table.
    pub static_match: u64,
    /// Requests resolved by a dynamic bucket.
    pub dynamic: u64,
    /// Requests no route matched.
    pub misses: u64,
}

impl TierStats {
    /// Returns the number of requests a route handled.
    #[must_use]
    pub const fn handled(&self) -> u64 {
        self.fast_path + self.static_match + self.dynamic
    }
}

/// A point-in-time view of the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchStats {
    /// Registered routes.
    pub routes: usize,
    /// Routes in the static table.
    pub static_routes: usize,
    /// Routes in dynamic buckets.
    pub dynamic_routes: usize,
    /// Routes in the fast-path list.
    pub fast_path_routes: usize,
    /// Dynamic bucket sizes keyed by segment count.
    pub buckets: BTreeMap<usize, usize>,
    /// Lookup outcomes.
    pub tiers: TierStats,
    /// Static match cache.
    pub match_cache: CacheStats,
    /// Path normalization cache.
    pub normalize_cache: CacheStats,
    /// Parameter and query container pools.
    pub pool: ResourcePoolStats,
}

#[derive(Debug, Default)]
pub(crate) struct DispatchCounters {
    fast_path: AtomicU64,
    static_match: AtomicU64,
    dynamic: AtomicU64,
    misses: AtomicU64,
}

impl DispatchCounters {
    pub(crate) fn hit(&self, tier: Tier) {
        let counter = match tier {
            Tier::FastPath => &self.fast_path,
            Tier::Static => &self.static_match,
            Tier::Dynamic => &self.dynamic,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> TierStats {
        TierStats {
            fast_path: self.fast_path.load(Ordering::Relaxed),
            static_match: self.static_match.load(Ordering::Relaxed),
            dynamic: self.dynamic.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn reset(&self) {
        for counter in [&self.fast_path, &self.static_match, &self.dynamic, &self.misses] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let counters = DispatchCounters::default();
        counters.hit(Tier::FastPath);
        counters.hit(Tier::Dynamic);
        counters.hit(Tier::Dynamic);
        counters.miss();

        let stats = counters.snapshot();
        assert_eq!(stats.fast_path, 1);
        assert_eq!(stats.dynamic, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.handled(), 3);

        counters.reset();
        assert_eq!(counters.snapshot(), TierStats::default());
    }

    #[test]
    fn test_tier_stats_serialize() {
        let json = serde_json::to_value(TierStats {
            static_match: 4,
            ..TierStats::default()
        })
        .unwrap();
        assert_eq!(json["static_match"], 4);
        assert_eq!(json["fast_path"], 0);
    }
}
