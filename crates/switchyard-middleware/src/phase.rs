//! Fixed-order execution phases.
//!
//! Every route's pipeline is a subsequence of the same eight phases, always
//! in this order:
//!
//! 1. **before** - custom hooks
//! 2. **rate_limit** - rate-limit policy
//! 3. **auth** - authentication / authorization policy
//! 4. **validation** - request validation policy
//! 5. **transform** - custom hooks
//! 6. **cache** - response cache policy
//! 7. **after** - custom hooks
//! 8. **legacy** - flat middleware list
//!
//! The handler runs after the last phase. An [`ExecutionPlan`] is computed
//! once per route at registration and contains only the phases that have
//! work to do.

use std::fmt;

use switchyard_core::{AuthConfig, CacheConfig, RateLimitConfig, ValidationConfig};

use crate::middleware::BoxedMiddleware;

/// Phase identifier, ordered by execution precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum PhaseKind {
    /// Custom hooks before any policy.
    Before = 1,
    /// Rate-limit policy.
    RateLimit = 2,
    /// Auth policy.
    Auth = 3,
    /// Validation policy.
    Validation = 4,
    /// Custom hooks after validation.
    Transform = 5,
    /// Cache policy.
    Cache = 6,
    /// Custom hooks after the cache lookup.
    After = 7,
    /// Legacy flat middleware list.
    Legacy = 8,
}

impl PhaseKind {
    /// Returns the phase name used in logs, metrics and introspection.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::RateLimit => "rate_limit",
            Self::Auth => "auth",
            Self::Validation => "validation",
            Self::Transform => "transform",
            Self::Cache => "cache",
            Self::After => "after",
            Self::Legacy => "legacy",
        }
    }

    /// Returns all phases in execution order.
    #[must_use]
    pub const fn all() -> [Self; 8] {
        [
            Self::Before,
            Self::RateLimit,
            Self::Auth,
            Self::Validation,
            Self::Transform,
            Self::Cache,
            Self::After,
            Self::Legacy,
        ]
    }

    /// Returns `true` for phases served by a policy collaborator.
    #[must_use]
    pub const fn is_policy(self) -> bool {
        matches!(self, Self::RateLimit | Self::Auth | Self::Validation | Self::Cache)
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The cross-cutting features a route declares.
///
/// A route with no features is eligible for the fast path.
#[derive(Clone, Default)]
pub struct RouteFeatures {
    /// Hooks run first.
    pub before: Vec<BoxedMiddleware>,
    /// Rate-limit settings.
    pub rate_limit: Option<RateLimitConfig>,
    /// Auth settings.
    pub auth: Option<AuthConfig>,
    /// Validation schemas.
    pub validation: Option<ValidationConfig>,
    /// Hooks run after validation.
    pub transform: Vec<BoxedMiddleware>,
    /// Cache settings.
    pub cache: Option<CacheConfig>,
    /// Hooks run after the cache phase.
    pub after: Vec<BoxedMiddleware>,
    /// Flat middleware list, run last.
    pub legacy: Vec<BoxedMiddleware>,
}

impl RouteFeatures {
    /// Returns `true` if nothing is declared.
    ///
    /// An empty [`ValidationConfig`] counts as no validation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declared().next().is_none()
    }

    /// Returns the phases with configured work, in execution order.
    pub fn declared(&self) -> impl Iterator<Item = PhaseKind> + '_ {
        PhaseKind::all().into_iter().filter(|kind| self.has(*kind))
    }

    fn has(&self, kind: PhaseKind) -> bool {
        match kind {
            PhaseKind::Before => !self.before.is_empty(),
            PhaseKind::RateLimit => self.rate_limit.is_some(),
            PhaseKind::Auth => self.auth.is_some(),
            PhaseKind::Validation => self.validation.as_ref().is_some_and(|v| !v.is_empty()),
            PhaseKind::Transform => !self.transform.is_empty(),
            PhaseKind::Cache => self.cache.is_some(),
            PhaseKind::After => !self.after.is_empty(),
            PhaseKind::Legacy => !self.legacy.is_empty(),
        }
    }
}

impl fmt::Debug for RouteFeatures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteFeatures")
            .field("before", &self.before.len())
            .field("rate_limit", &self.rate_limit)
            .field("auth", &self.auth)
            .field("validation", &self.validation)
            .field("transform", &self.transform.len())
            .field("cache", &self.cache)
            .field("after", &self.after.len())
            .field("legacy", &self.legacy.len())
            .finish()
    }
}

/// A phase together with the work it carries.
#[derive(Clone)]
pub enum Phase {
    /// Custom hooks before any policy.
    Before(Vec<BoxedMiddleware>),
    /// Rate-limit policy call.
    RateLimit(RateLimitConfig),
    /// Auth policy call.
    Auth(AuthConfig),
    /// Validation policy call.
    Validation(ValidationConfig),
    /// Custom hooks after validation.
    Transform(Vec<BoxedMiddleware>),
    /// Cache policy call.
    Cache(CacheConfig),
    /// Custom hooks after the cache phase.
    After(Vec<BoxedMiddleware>),
    /// Legacy flat middleware list.
    Legacy(Vec<BoxedMiddleware>),
}

impl Phase {
    /// Returns the identifier of this phase.
    #[must_use]
    pub const fn kind(&self) -> PhaseKind {
        match self {
            Self::Before(_) => PhaseKind::Before,
            Self::RateLimit(_) => PhaseKind::RateLimit,
            Self::Auth(_) => PhaseKind::Auth,
            Self::Validation(_) => PhaseKind::Validation,
            Self::Transform(_) => PhaseKind::Transform,
            Self::Cache(_) => PhaseKind::Cache,
            Self::After(_) => PhaseKind::After,
            Self::Legacy(_) => PhaseKind::Legacy,
        }
    }
}

impl fmt::Debug for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind().name())
    }
}

/// The ordered phases a route runs before its handler.
#[derive(Debug, Clone, Default)]
pub struct ExecutionPlan {
    phases: Vec<Phase>,
}

impl ExecutionPlan {
    /// Builds the plan for a route's features.
    ///
    /// # Example
    ///
    /// ```rust
    /// use switchyard_core::{AuthConfig, RateLimitConfig};
    /// use switchyard_middleware::{ExecutionPlan, PhaseKind, RouteFeatures};
    ///
    /// let features = RouteFeatures {
    ///     auth: Some(AuthConfig::required()),
    ///     rate_limit: Some(RateLimitConfig::per_millis(5, 60_000)),
    ///     ..RouteFeatures::default()
    /// };
    ///
    /// let plan = ExecutionPlan::from_features(&features);
    /// assert_eq!(plan.kinds().collect::<Vec<_>>(), vec![PhaseKind::RateLimit, PhaseKind::Auth]);
    /// ```
    #[must_use]
    pub fn from_features(features: &RouteFeatures) -> Self {
        let phases = features
            .declared()
            .filter_map(|kind| match kind {
                PhaseKind::Before => Some(Phase::Before(features.before.clone())),
                PhaseKind::RateLimit => features.rate_limit.clone().map(Phase::RateLimit),
                PhaseKind::Auth => features.auth.clone().map(Phase::Auth),
                PhaseKind::Validation => features.validation.clone().map(Phase::Validation),
                PhaseKind::Transform => Some(Phase::Transform(features.transform.clone())),
                PhaseKind::Cache => features.cache.clone().map(Phase::Cache),
                PhaseKind::After => Some(Phase::After(features.after.clone())),
                PhaseKind::Legacy => Some(Phase::Legacy(features.legacy.clone())),
            })
            .collect();
        Self { phases }
    }

    /// Returns the phases in execution order.
    #[must_use]
    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    /// Returns the phase identifiers in execution order.
    pub fn kinds(&self) -> impl Iterator<Item = PhaseKind> + '_ {
        self.phases.iter().map(Phase::kind)
    }

    /// Returns the phase names in execution order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.kinds().map(PhaseKind::name).collect()
    }

    /// Returns `true` if no phase has work.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// Returns the number of phases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.phases.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::from_fn;
    use proptest::prelude::*;
    use std::time::Duration;

    fn noop(name: &'static str) -> BoxedMiddleware {
        from_fn(name, |_req, _res, next| {
            next.proceed();
            Ok(())
        })
    }

    #[test]
    fn test_phase_ordering() {
        assert!(PhaseKind::Before < PhaseKind::RateLimit);
        assert!(PhaseKind::RateLimit < PhaseKind::Auth);
        assert!(PhaseKind::Auth < PhaseKind::Validation);
        assert!(PhaseKind::Validation < PhaseKind::Transform);
        assert!(PhaseKind::Transform < PhaseKind::Cache);
        assert!(PhaseKind::Cache < PhaseKind::After);
        assert!(PhaseKind::After < PhaseKind::Legacy);
    }

    #[test]
    fn test_phase_names() {
        let names: Vec<_> = PhaseKind::all().iter().map(|k| k.name()).collect();
        assert_eq!(
            names,
            vec!["before", "rate_limit", "auth", "validation", "transform", "cache", "after", "legacy"]
        );
        assert!(PhaseKind::Cache.is_policy());
        assert!(!PhaseKind::Before.is_policy());
    }

    #[test]
    fn test_empty_features() {
        let features = RouteFeatures::default();
        assert!(features.is_empty());
        assert!(ExecutionPlan::from_features(&features).is_empty());
    }

    #[test]
    fn test_empty_validation_is_not_declared() {
        let features = RouteFeatures {
            validation: Some(ValidationConfig::default()),
            ..RouteFeatures::default()
        };
        assert!(features.is_empty());
    }

    #[test]
    fn test_full_plan_order() {
        let features = RouteFeatures {
            before: vec![noop("b")],
            rate_limit: Some(RateLimitConfig::per_millis(10, 1000)),
            auth: Some(AuthConfig::required()),
            validation: Some(ValidationConfig {
                body: Some(serde_json::json!({"type": "object"})),
                ..ValidationConfig::default()
            }),
            transform: vec![noop("t")],
            cache: Some(CacheConfig::ttl(Duration::from_secs(30))),
            after: vec![noop("a")],
            legacy: vec![noop("l1"), noop("l2")],
        };

        let plan = ExecutionPlan::from_features(&features);
        assert_eq!(plan.len(), 8);
        assert_eq!(plan.kinds().collect::<Vec<_>>(), PhaseKind::all().to_vec());
    }

    #[test]
    fn test_hooks_only_plan() {
        let features = RouteFeatures {
            after: vec![noop("a")],
            before: vec![noop("b")],
            ..RouteFeatures::default()
        };
        assert!(!features.is_empty());
        assert_eq!(ExecutionPlan::from_features(&features).names(), vec!["before", "after"]);
    }

    fn arb_features() -> impl Strategy<Value = RouteFeatures> {
        (
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
        )
            .prop_map(|(b, r, a, v, t, c, af, l)| RouteFeatures {
                before: if b { vec![noop("b")] } else { Vec::new() },
                rate_limit: r.then(|| RateLimitConfig::per_millis(1, 1)),
                auth: a.then(AuthConfig::required),
                validation: v.then(|| ValidationConfig {
                    query: Some(serde_json::json!({})),
                    ..ValidationConfig::default()
                }),
                transform: if t { vec![noop("t")] } else { Vec::new() },
                cache: c.then(|| CacheConfig::ttl(Duration::from_secs(1))),
                after: if af { vec![noop("a")] } else { Vec::new() },
                legacy: if l { vec![noop("l")] } else { Vec::new() },
            })
    }

    proptest! {
        #[test]
        fn plan_is_strictly_ordered(features in arb_features()) {
            let kinds: Vec<_> = ExecutionPlan::from_features(&features).kinds().collect();
            prop_assert!(kinds.windows(2).all(|w| w[0] < w[1]));
        }

        #[test]
        fn plan_matches_declared_features(features in arb_features()) {
            let plan = ExecutionPlan::from_features(&features);
            prop_assert_eq!(plan.is_empty(), features.is_empty());
            prop_assert_eq!(plan.kinds().any(|k| k == PhaseKind::RateLimit), features.rate_limit.is_some());
            prop_assert_eq!(plan.kinds().any(|k| k == PhaseKind::Cache), features.cache.is_some());
        }

        #[test]
        fn policy_precedence_holds(features in arb_features()) {
            let kinds: Vec<_> = ExecutionPlan::from_features(&features).kinds().collect();
            let pos = |k: PhaseKind| kinds.iter().position(|x| *x == k);
            if let (Some(r), Some(a)) = (pos(PhaseKind::RateLimit), pos(PhaseKind::Auth)) {
                prop_assert!(r < a);
            }
            if let (Some(a), Some(v)) = (pos(PhaseKind::Auth), pos(PhaseKind::Validation)) {
                prop_assert!(a < v);
            }
            if let (Some(v), Some(c)) = (pos(PhaseKind::Validation), pos(PhaseKind::Cache)) {
                prop_assert!(v < c);
            }
        }
    }
}
