//! The dispatch entry point.
//!
//! [`Dispatcher`] owns the route table, the phase executor and the
//! request-scoped pools. It is constructed explicitly and passed to whatever
//! serves traffic; registration takes `&mut self` and must finish before
//! requests are dispatched through a shared reference.
//!
//! # Example
//!
//! ```rust
//! use http::Method;
//! use switchyard::{Body, Dispatcher, Handler, Request, Response};
//!
//! let mut dispatcher = Dispatcher::new();
//! dispatcher
//!     .get("/health")
//!     .handler(Handler::sync(|_req, _res| Ok(Body::from("ok"))))
//!     .unwrap();
//!
//! let mut req = Request::new(Method::GET, "/health");
//! let mut res = Response::new();
//!
//! // Fast-path routes with synchronous handlers complete in the call
//! let handled = dispatcher.handle_request(&mut req, &mut res);
//! assert_eq!(handled.into_immediate(), Some(true));
//! assert_eq!(res.text(), "ok");
//! ```

use http::Method;
use switchyard_config::DispatchConfig;
use switchyard_core::{Completion, Handler, RegistrationError, Request, Response};
use switchyard_middleware::{executor, BoxedMiddleware, PhaseExecutor, PolicySet, RouteFeatures};
use switchyard_router::{ResourcePool, DEFAULT_POOL_CAPACITY};
use switchyard_telemetry::metrics;

use crate::route::RouteInfo;
use crate::schema::{RouteSchema, RouteSchemaBuilder};
use crate::stats::{DispatchCounters, DispatchStats};
use crate::table::{RouteMatch, RouteTable};

/// Routes requests to handlers through the tiered table and phase engine.
#[derive(Debug)]
pub struct Dispatcher {
    table: RouteTable,
    executor: PhaseExecutor,
    pool: ResourcePool,
    counters: DispatchCounters,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    /// Creates a dispatcher with default pool and cache sizes and no policies.
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: RouteTable::new(),
            executor: PhaseExecutor::default(),
            pool: ResourcePool::new(DEFAULT_POOL_CAPACITY),
            counters: DispatchCounters::default(),
        }
    }

    /// Creates a dispatcher sized from configuration.
    #[must_use]
    pub fn from_config(config: &DispatchConfig) -> Self {
        Self {
            table: RouteTable::with_cache_capacities(
                config.match_cache_capacity,
                config.normalize_cache_capacity,
            ),
            executor: PhaseExecutor::default(),
            pool: ResourcePool::new(config.pool_capacity),
            counters: DispatchCounters::default(),
        }
    }

    /// Installs the policy collaborators.
    #[must_use]
    pub fn with_policies(mut self, policies: PolicySet) -> Self {
        self.executor.set_policies(policies);
        self
    }

    /// Replaces the policy collaborators.
    ///
    /// Routes already registered are not re-checked.
    pub fn set_policies(&mut self, policies: PolicySet) {
        self.executor.set_policies(policies);
    }

    /// Returns the installed policy collaborators.
    pub fn policies(&self) -> &PolicySet {
        self.executor.policies()
    }

    /// Returns the route table.
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Returns the container pools.
    ///
    /// Transports fill request query maps from [`ResourcePool::acquire_query`]
    /// and hand them back through [`finish`](Self::finish).
    pub fn pool(&self) -> &ResourcePool {
        &self.pool
    }

    /// Registers a route.
    ///
    /// # Errors
    ///
    /// - [`RegistrationError::MissingPolicy`] if the route declares a policy
    ///   phase with no installed collaborator
    /// - [`RegistrationError::InvalidPattern`] for a malformed path
    /// - [`RegistrationError::DuplicateRoute`] for a repeated method and path
    pub fn register_route(&mut self, schema: RouteSchema) -> Result<(), RegistrationError> {
        if let Some(kind) = self.executor.policies().missing_for(schema.features()) {
            return Err(RegistrationError::MissingPolicy {
                method: schema.method().clone(),
                path: schema.path().to_string(),
                phase: kind.name(),
            });
        }

        let route = self.table.register(schema)?;
        tracing::debug!(
            http.method = %route.method(),
            route = route.pattern(),
            fast_path = route.is_fast_path(),
            phases = ?route.plan().names(),
            "route registered"
        );

        metrics::set_routes_registered(self.table.len());
        Ok(())
    }

    /// Registers a route whose only features are a flat middleware list.
    ///
    /// # Errors
    ///
    /// See [`register_route`](Self::register_route).
    pub fn add_route(
        &mut self,
        method: Method,
        path: impl Into<String>,
        handler: Handler,
        middleware: Vec<BoxedMiddleware>,
    ) -> Result<(), RegistrationError> {
        let features = RouteFeatures {
            legacy: middleware,
            ..RouteFeatures::default()
        };
        self.register_route(RouteSchema::new(method, path, handler).with_features(features))
    }

    /// Starts a route builder for any method.
    pub fn route(&mut self, method: Method, path: impl Into<String>) -> RouteSchemaBuilder<'_> {
        RouteSchemaBuilder::new(self, method, path.into())
    }

    /// Starts a `GET` route.
    pub fn get(&mut self, path: impl Into<String>) -> RouteSchemaBuilder<'_> {
        self.route(Method::GET, path)
    }

    /// Starts a `POST` route.
    pub fn post(&mut self, path: impl Into<String>) -> RouteSchemaBuilder<'_> {
        self.route(Method::POST, path)
    }

    /// Starts a `PUT` route.
    pub fn put(&mut self, path: impl Into<String>) -> RouteSchemaBuilder<'_> {
        self.route(Method::PUT, path)
    }

    /// Starts a `PATCH` route.
    pub fn patch(&mut self, path: impl Into<String>) -> RouteSchemaBuilder<'_> {
        self.route(Method::PATCH, path)
    }

    /// Starts a `DELETE` route.
    pub fn delete(&mut self, path: impl Into<String>) -> RouteSchemaBuilder<'_> {
        self.route(Method::DELETE, path)
    }

    /// Starts a `HEAD` route.
    pub fn head(&mut self, path: impl Into<String>) -> RouteSchemaBuilder<'_> {
        self.route(Method::HEAD, path)
    }

    /// Starts an `OPTIONS` route.
    pub fn options(&mut self, path: impl Into<String>) -> RouteSchemaBuilder<'_> {
        self.route(Method::OPTIONS, path)
    }

    /// Dispatches a request.
    ///
    /// Resolves to `true` if a route handled the request, including requests
    /// answered by a phase or with an error response, and `false` if no route
    /// matched. A miss writes nothing to the response.
    ///
    /// The result is [`Completion::Immediate`] for misses and for fast-path
    /// routes with a synchronous handler, which run entirely inside this
    /// call. Every other route yields [`Completion::Deferred`].
    pub fn handle_request<'a>(
        &'a self,
        req: &'a mut Request,
        res: &'a mut Response,
    ) -> Completion<'a, bool> {
        let Some(RouteMatch {
            route,
            tier,
            captures,
        }) = self.table.lookup(req.method(), req.path())
        else {
            self.counters.miss();
            metrics::record_miss();
            tracing::trace!(
                http.method = %req.method(),
                http.path = req.path(),
                "no route matched"
            );
            return Completion::Immediate(false);
        };

        let params = (route.extractor().arity() > 0).then(|| {
            let mut params = self.pool.acquire_params();
            route.extractor().extract_into(&captures, &mut params);
            params
        });
        drop(captures);
        if let Some(params) = params {
            // The replaced container is unallocated
            req.set_params(params);
        }

        self.counters.hit(tier);
        metrics::record_dispatch(tier.as_str());
        tracing::trace!(tier = tier.as_str(), route = route.pattern(), "route matched");

        if route.is_fast_path() {
            if let Handler::Immediate(handler) = route.handler() {
                executor::invoke_sync(handler.as_ref(), req, res);
                return Completion::Immediate(true);
            }
        }

        Completion::Deferred(Box::pin(async move {
            if route.is_fast_path() {
                executor::invoke(route.handler(), req, res).await;
            } else {
                self.executor
                    .execute(route.plan(), route.handler(), req, res)
                    .await;
            }
            true
        }))
    }

    /// Returns a handled request's parameter and query containers to the pool.
    pub fn finish(&self, req: &mut Request) {
        let params = req.take_params();
        let query = req.take_query();
        self.pool.recycle(params, query);
    }

    /// Describes every route in registration order.
    pub fn all_routes(&self) -> Vec<RouteInfo> {
        self.table.routes().map(|route| route.info()).collect()
    }

    /// Returns the number of registered routes.
    pub fn route_count(&self) -> usize {
        self.table.len()
    }

    /// Returns a snapshot of table shape, caches, pools and tier counters.
    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            routes: self.table.len(),
            static_routes: self.table.static_count(),
            dynamic_routes: self.table.dynamic_count(),
            fast_path_routes: self.table.fast_path_count(),
            buckets: self.table.buckets(),
            tiers: self.counters.snapshot(),
            match_cache: self.table.match_cache_stats(),
            normalize_cache: self.table.normalize_cache_stats(),
            pool: self.pool.stats(),
        }
    }

    /// Clears routes, caches, pools and counters. Policies are kept.
    pub fn reset(&mut self) {
        self.table.clear();
        self.pool.clear();
        self.counters.reset();
        metrics::set_routes_registered(0);
        tracing::debug!("dispatcher reset");
    }
}
