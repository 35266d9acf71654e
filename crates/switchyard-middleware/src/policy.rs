//! Policy collaborator contract.
//!
//! Rate limiting, auth, validation and caching are implemented outside the
//! dispatch core. Each is reached through [`Policy`], which sees the request,
//! the response and the route's feature config, and answers
//! [`PolicyOutcome::Continue`] or [`PolicyOutcome::Halt`]. A halting policy is
//! expected to have finalized the response (rejection, cache hit, ...).

use std::fmt;
use std::sync::Arc;

use switchyard_core::{
    AuthConfig, BoxFuture, CacheConfig, RateLimitConfig, Request, Response, ValidationConfig,
};

use crate::phase::{PhaseKind, RouteFeatures};

/// The answer of a policy call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyOutcome {
    /// Run the next phase.
    Continue,
    /// Stop; the response is (or should be) finalized.
    Halt,
}

/// A policy collaborator for feature config `C`.
pub trait Policy<C>: Send + Sync + 'static {
    /// Applies the policy to a request.
    fn apply<'a>(
        &'a self,
        req: &'a mut Request,
        res: &'a mut Response,
        config: &'a C,
    ) -> BoxFuture<'a, anyhow::Result<PolicyOutcome>>;
}

/// A policy built from a synchronous closure.
pub struct FnPolicy<F> {
    func: F,
}

impl<C, F> Policy<C> for FnPolicy<F>
where
    C: Sync + 'static,
    F: Fn(&mut Request, &mut Response, &C) -> anyhow::Result<PolicyOutcome> + Send + Sync + 'static,
{
    fn apply<'a>(
        &'a self,
        req: &'a mut Request,
        res: &'a mut Response,
        config: &'a C,
    ) -> BoxFuture<'a, anyhow::Result<PolicyOutcome>> {
        Box::pin(std::future::ready((self.func)(req, res, config)))
    }
}

/// Creates a policy from a synchronous closure.
///
/// # Example
///
/// ```rust
/// use switchyard_core::{AuthConfig, ErrorCategory};
/// use switchyard_middleware::{policy, PolicyOutcome, PolicySet};
///
/// let policies = PolicySet::new().with_auth(policy::from_fn(
///     |req, res, _cfg: &AuthConfig| {
///         if req.header("authorization").is_some() {
///             Ok(PolicyOutcome::Continue)
///         } else {
///             res.reject(ErrorCategory::Authentication, "missing credentials")?;
///             Ok(PolicyOutcome::Halt)
///         }
///     },
/// ));
/// assert!(policies.has(switchyard_middleware::PhaseKind::Auth));
/// ```
pub fn from_fn<C, F>(func: F) -> FnPolicy<F>
where
    F: Fn(&mut Request, &mut Response, &C) -> anyhow::Result<PolicyOutcome> + Send + Sync + 'static,
{
    FnPolicy { func }
}

impl<F> fmt::Debug for FnPolicy<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnPolicy").finish_non_exhaustive()
    }
}

/// The installed policy collaborators.
#[derive(Clone, Default)]
pub struct PolicySet {
    rate_limit: Option<Arc<dyn Policy<RateLimitConfig>>>,
    auth: Option<Arc<dyn Policy<AuthConfig>>>,
    validation: Option<Arc<dyn Policy<ValidationConfig>>>,
    cache: Option<Arc<dyn Policy<CacheConfig>>>,
}

impl PolicySet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the rate-limit policy.
    #[must_use]
    pub fn with_rate_limit(mut self, policy: impl Policy<RateLimitConfig>) -> Self {
        self.rate_limit = Some(Arc::new(policy));
        self
    }

    /// Installs the auth policy.
    #[must_use]
    pub fn with_auth(mut self, policy: impl Policy<AuthConfig>) -> Self {
        self.auth = Some(Arc::new(policy));
        self
    }

    /// Installs the validation policy.
    #[must_use]
    pub fn with_validation(mut self, policy: impl Policy<ValidationConfig>) -> Self {
        self.validation = Some(Arc::new(policy));
        self
    }

    /// Installs the cache policy.
    #[must_use]
    pub fn with_cache(mut self, policy: impl Policy<CacheConfig>) -> Self {
        self.cache = Some(Arc::new(policy));
        self
    }

    /// Returns the rate-limit policy.
    #[must_use]
    pub fn rate_limit(&self) -> Option<&dyn Policy<RateLimitConfig>> {
        self.rate_limit.as_deref()
    }

    /// Returns the auth policy.
    #[must_use]
    pub fn auth(&self) -> Option<&dyn Policy<AuthConfig>> {
        self.auth.as_deref()
    }

    /// Returns the validation policy.
    #[must_use]
    pub fn validation(&self) -> Option<&dyn Policy<ValidationConfig>> {
        self.validation.as_deref()
    }

    /// Returns the cache policy.
    #[must_use]
    pub fn cache(&self) -> Option<&dyn Policy<CacheConfig>> {
        self.cache.as_deref()
    }

    /// Returns `true` if the collaborator for a policy phase is installed.
    /// Hook phases need no collaborator and always return `true`.
    #[must_use]
    pub fn has(&self, kind: PhaseKind) -> bool {
        match kind {
            PhaseKind::RateLimit => self.rate_limit.is_some(),
            PhaseKind::Auth => self.auth.is_some(),
            PhaseKind::Validation => self.validation.is_some(),
            PhaseKind::Cache => self.cache.is_some(),
            PhaseKind::Before | PhaseKind::Transform | PhaseKind::After | PhaseKind::Legacy => true,
        }
    }

    /// Returns the first declared phase whose collaborator is missing.
    #[must_use]
    pub fn missing_for(&self, features: &RouteFeatures) -> Option<PhaseKind> {
        features.declared().find(|kind| !self.has(*kind))
    }
}

impl fmt::Debug for PolicySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicySet")
            .field("rate_limit", &self.rate_limit.is_some())
            .field("auth", &self.auth.is_some())
            .field("validation", &self.validation.is_some())
            .field("cache", &self.cache.is_some())
            .finish()
    }
}
