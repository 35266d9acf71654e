//! Route table and tiered lookup.
//!
//! Routes are stored in three structures, each serving one lookup tier:
//!
//! | Tier | Structure | Match |
//! |------|-----------|-------|
//! | 0 | fast-path list | routes without features, in registration order |
//! | 1 | static table keyed `"METHOD:path"` | one hash lookup, memoized in a bounded cache |
//! | 2 | dynamic buckets keyed by segment count | first match in registration order |
//!
//! Fast-path routes are also stored in the static table or a dynamic bucket.
//!
//! Dynamic routes resolve ties by registration order, not specificity: with
//! `GET /a/:x/c` registered before `GET /a/:y/:z`, a request for `/a/1/c`
//! matches the first. This holds across tiers; a fast-path dynamic route is
//! skipped in tier 0 when an earlier route in its bucket also matches.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use http::Method;
use serde::Serialize;
use switchyard_core::RegistrationError;
use switchyard_router::{
    count_segments, is_normalized, normalize, BoundedCache, CacheStats, Captures,
    DEFAULT_MATCH_CACHE_CAPACITY, DEFAULT_NORMALIZE_CACHE_CAPACITY,
};

use crate::route::{route_key, CompiledRoute};
use crate::schema::RouteSchema;

/// The lookup tier that resolved a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Tier 0: feature-free route, handler runs in the dispatch call.
    FastPath,
    /// Tier 1: exact static match.
    Static,
    /// Tier 2: segment-count bucket scan.
    Dynamic,
}

impl Tier {
    /// Returns the metric label for this tier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FastPath => "fast_path",
            Self::Static => "static",
            Self::Dynamic => "dynamic",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A successful lookup.
///
/// `captures` borrows the request path; copy them out before mutating the
/// request.
#[derive(Debug)]
pub struct RouteMatch<'t, 'p> {
    /// The matched route.
    pub route: &'t CompiledRoute,
    /// The tier that found it.
    pub tier: Tier,
    /// Captured parameter values in declaration order.
    pub captures: Captures<'p>,
}

/// Compiled routes and their lookup structures.
pub struct RouteTable {
    routes: Vec<CompiledRoute>,
    statics: HashMap<String, usize>,
    dynamic: HashMap<usize, Vec<usize>>,
    fast_path: Vec<usize>,
    /// `"METHOD:raw path"` to static route index, or `None` for a known miss.
    match_cache: BoundedCache<String, Option<usize>>,
    normalize_cache: BoundedCache<String, String>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteTable {
    /// Creates an empty table with default cache sizes.
    #[must_use]
    pub fn new() -> Self {
        Self::with_cache_capacities(DEFAULT_MATCH_CACHE_CAPACITY, DEFAULT_NORMALIZE_CACHE_CAPACITY)
    }

    /// Creates an empty table with the given cache sizes.
    #[must_use]
    pub fn with_cache_capacities(match_cache: usize, normalize_cache: usize) -> Self {
        Self {
            routes: Vec::new(),
            statics: HashMap::new(),
            dynamic: HashMap::new(),
            fast_path: Vec::new(),
            match_cache: BoundedCache::new(match_cache),
            normalize_cache: BoundedCache::new(normalize_cache),
        }
    }

    /// Compiles, classifies and stores a route.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::InvalidPattern`] for a malformed path and
    /// [`RegistrationError::DuplicateRoute`] if a route with the same method
    /// and the same path shape is already registered.
    pub fn register(&mut self, schema: RouteSchema) -> Result<&CompiledRoute, RegistrationError> {
        let route = CompiledRoute::compile(schema)?;
        let index = self.routes.len();

        if let Some(key) = route.static_key() {
            if self.statics.contains_key(&key) {
                return Err(duplicate(&route));
            }
            self.statics.insert(key, index);
        } else {
            let bucket = self.dynamic.entry(route.path().segment_count()).or_default();
            let taken = bucket.iter().any(|&other| {
                let other = &self.routes[other];
                other.method() == route.method() && other.path().same_shape(route.path())
            });
            if taken {
                return Err(duplicate(&route));
            }
            bucket.push(index);
        }

        if route.is_fast_path() {
            self.fast_path.push(index);
        }

        // Known misses may now resolve
        self.match_cache.clear();
        self.routes.push(route);
        Ok(&self.routes[index])
    }

    /// Finds the route for a request.
    ///
    /// Tier 0 scans the fast-path list, tier 1 probes the static table and
    /// tier 2 scans the dynamic bucket for the path's segment count.
    pub fn lookup<'p>(&self, method: &Method, path: &'p str) -> Option<RouteMatch<'_, 'p>> {
        let mut normalized: Option<Cow<'p, str>> = None;

        for &index in &self.fast_path {
            let route = &self.routes[index];
            if route.method() != method {
                continue;
            }
            let captures = match route.path().literal() {
                Some(literal) => {
                    let path = normalized.get_or_insert_with(|| self.normalize(path));
                    (literal == path.as_ref()).then(Captures::new)
                }
                None => match route.path().captures(path) {
                    Some(_) if self.shadowed(index, method, path) => continue,
                    captures => captures,
                },
            };
            if let Some(captures) = captures {
                return Some(RouteMatch {
                    route,
                    tier: Tier::FastPath,
                    captures,
                });
            }
        }

        let key = route_key(method, path);
        let hit = match self.match_cache.get(&key) {
            Some(hit) => hit,
            None => {
                let path = normalized.get_or_insert_with(|| self.normalize(path));
                let hit = self.statics.get(&route_key(method, path)).copied();
                self.match_cache.insert(key, hit);
                hit
            }
        };
        if let Some(index) = hit {
            return Some(RouteMatch {
                route: &self.routes[index],
                tier: Tier::Static,
                captures: Captures::new(),
            });
        }

        let bucket = self.dynamic.get(&count_segments(path))?;
        bucket.iter().find_map(|&index| {
            let route = &self.routes[index];
            if route.method() != method {
                return None;
            }
            route.path().captures(path).map(|captures| RouteMatch {
                route,
                tier: Tier::Dynamic,
                captures,
            })
        })
    }

    /// Returns all routes in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &CompiledRoute> {
        self.routes.iter()
    }

    /// Returns the number of routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if no route is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Returns the number of static routes.
    #[must_use]
    pub fn static_count(&self) -> usize {
        self.statics.len()
    }

    /// Returns the number of dynamic routes.
    #[must_use]
    pub fn dynamic_count(&self) -> usize {
        self.dynamic.values().map(Vec::len).sum()
    }

    /// Returns the number of fast-path routes.
    #[must_use]
    pub fn fast_path_count(&self) -> usize {
        self.fast_path.len()
    }

    /// Returns dynamic bucket sizes keyed by segment count.
    #[must_use]
    pub fn buckets(&self) -> BTreeMap<usize, usize> {
        self.dynamic
            .iter()
            .map(|(segments, bucket)| (*segments, bucket.len()))
            .collect()
    }

    /// Returns the match cache counters.
    #[must_use]
    pub fn match_cache_stats(&self) -> CacheStats {
        self.match_cache.stats()
    }

    /// Returns the normalization cache counters.
    #[must_use]
    pub fn normalize_cache_stats(&self) -> CacheStats {
        self.normalize_cache.stats()
    }

    /// Removes every route and empties both caches.
    pub fn clear(&mut self) {
        self.routes.clear();
        self.statics.clear();
        self.dynamic.clear();
        self.fast_path.clear();
        self.match_cache.clear();
        self.normalize_cache.clear();
    }

    /// Returns `true` if a dynamic route registered before `index` in the same
    /// bucket matches `method` and `path`.
    fn shadowed(&self, index: usize, method: &Method, path: &str) -> bool {
        let segments = self.routes[index].path().segment_count();
        self.dynamic.get(&segments).is_some_and(|bucket| {
            bucket
                .iter()
                .take_while(|&&earlier| earlier < index)
                .any(|&earlier| {
                    let route = &self.routes[earlier];
                    route.method() == method && route.path().captures(path).is_some()
                })
        })
    }

    fn normalize<'p>(&self, path: &'p str) -> Cow<'p, str> {
        if is_normalized(path) {
            return Cow::Borrowed(path);
        }
        if let Some(cached) = self.normalize_cache.get(path) {
            return Cow::Owned(cached);
        }
        let normalized = normalize(path).into_owned();
        self.normalize_cache.insert(path.to_string(), normalized.clone());
        Cow::Owned(normalized)
    }
}

impl fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteTable")
            .field("routes", &self.routes.len())
            .field("static", &self.statics.len())
            .field("dynamic", &self.dynamic_count())
            .field("fast_path", &self.fast_path.len())
            .finish_non_exhaustive()
    }
}

fn duplicate(route: &CompiledRoute) -> RegistrationError {
    RegistrationError::DuplicateRoute {
        method: route.method().clone(),
        path: route.pattern().to_string(),
    }
}
