//! Route schemas and the fluent route builder.
//!
//! A [`RouteSchema`] is the declared form of a route: method, path pattern,
//! handler and feature set. It is immutable once built. Schemas are usually
//! assembled through a [`RouteSchemaBuilder`] obtained from
//! [`Dispatcher::get`](crate::Dispatcher::get) and friends, which registers
//! the finished schema in its terminal call.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//!
//! use switchyard::{policy, Body, CacheConfig, Dispatcher, Handler, PolicyOutcome, PolicySet};
//!
//! let policies = PolicySet::new().with_cache(policy::from_fn(
//!     |_req, _res, _cfg: &CacheConfig| Ok(PolicyOutcome::Continue),
//! ));
//! let mut dispatcher = Dispatcher::new().with_policies(policies);
//!
//! dispatcher
//!     .get("/reports/:id")
//!     .cache(CacheConfig::ttl(Duration::from_secs(60)))
//!     .handler(Handler::sync(|req, _res| {
//!         Ok(Body::from(format!("report {}", req.param("id").unwrap_or_default())))
//!     }))
//!     .unwrap();
//!
//! assert_eq!(dispatcher.route_count(), 1);
//! ```

use std::fmt;

use http::Method;
use serde_json::Value;
use switchyard_core::{
    AuthConfig, CacheConfig, Handler, RateLimitConfig, RegistrationError, ValidationConfig,
};
use switchyard_middleware::{BoxedMiddleware, RouteFeatures};

use crate::dispatcher::Dispatcher;

/// The declared form of a route.
#[derive(Clone)]
pub struct RouteSchema {
    method: Method,
    path: String,
    handler: Handler,
    features: RouteFeatures,
}

impl RouteSchema {
    /// Creates a schema with no features.
    pub fn new(method: Method, path: impl Into<String>, handler: Handler) -> Self {
        Self {
            method,
            path: path.into(),
            handler,
            features: RouteFeatures::default(),
        }
    }

    /// Attaches a feature set.
    #[must_use]
    pub fn with_features(mut self, features: RouteFeatures) -> Self {
        self.features = features;
        self
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the path pattern as declared.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the endpoint.
    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    /// Returns the declared features.
    pub fn features(&self) -> &RouteFeatures {
        &self.features
    }
}

impl fmt::Debug for RouteSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteSchema")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("handler", &self.handler)
            .field("features", &self.features)
            .finish()
    }
}

/// Fluent, single-use construction of a [`RouteSchema`].
///
/// Feature calls accumulate; the terminal [`handler`](Self::handler) or
/// [`register`](Self::register) call registers the route with the
/// dispatcher the builder came from.
#[must_use = "a route builder does nothing until `handler` or `register` is called"]
pub struct RouteSchemaBuilder<'d> {
    dispatcher: &'d mut Dispatcher,
    method: Method,
    path: String,
    handler: Option<Handler>,
    features: RouteFeatures,
}

impl<'d> RouteSchemaBuilder<'d> {
    pub(crate) fn new(dispatcher: &'d mut Dispatcher, method: Method, path: String) -> Self {
        Self {
            dispatcher,
            method,
            path,
            handler: None,
            features: RouteFeatures::default(),
        }
    }

    /// Validates the request body against a schema.
    pub fn validate_body(mut self, schema: Value) -> Self {
        self.validation().body = Some(schema);
        self
    }

    /// Validates the query string against a schema.
    pub fn validate_query(mut self, schema: Value) -> Self {
        self.validation().query = Some(schema);
        self
    }

    /// Validates the path parameters against a schema.
    pub fn validate_params(mut self, schema: Value) -> Self {
        self.validation().params = Some(schema);
        self
    }

    /// Validates the request headers against a schema.
    pub fn validate_headers(mut self, schema: Value) -> Self {
        self.validation().headers = Some(schema);
        self
    }

    /// Requires authentication.
    pub fn auth(mut self, config: AuthConfig) -> Self {
        self.features.auth = Some(config);
        self
    }

    /// Applies a rate limit.
    pub fn rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.features.rate_limit = Some(config);
        self
    }

    /// Caches responses.
    pub fn cache(mut self, config: CacheConfig) -> Self {
        self.features.cache = Some(config);
        self
    }

    /// Adds a hook to the `before` phase.
    pub fn before(mut self, middleware: BoxedMiddleware) -> Self {
        self.features.before.push(middleware);
        self
    }

    /// Adds a hook to the `transform` phase.
    pub fn transform(mut self, middleware: BoxedMiddleware) -> Self {
        self.features.transform.push(middleware);
        self
    }

    /// Adds a hook to the `after` phase.
    pub fn after(mut self, middleware: BoxedMiddleware) -> Self {
        self.features.after.push(middleware);
        self
    }

    /// Adds a middleware to the legacy flat list, run last.
    pub fn middleware(mut self, middleware: BoxedMiddleware) -> Self {
        self.features.legacy.push(middleware);
        self
    }

    /// Sets the endpoint without registering.
    pub fn with_handler(mut self, handler: Handler) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Registers the route.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::MissingHandler`] if no handler was set,
    /// or any error raised by [`Dispatcher::register_route`].
    pub fn register(self) -> Result<(), RegistrationError> {
        let Some(handler) = self.handler else {
            return Err(RegistrationError::MissingHandler {
                method: self.method,
                path: self.path,
            });
        };
        let schema = RouteSchema::new(self.method, self.path, handler).with_features(self.features);
        self.dispatcher.register_route(schema)
    }

    /// Sets the endpoint and registers the route.
    pub fn handler(self, handler: Handler) -> Result<(), RegistrationError> {
        self.with_handler(handler).register()
    }

    fn validation(&mut self) -> &mut ValidationConfig {
        self.features.validation.get_or_insert_with(ValidationConfig::default)
    }
}

impl fmt::Debug for RouteSchemaBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteSchemaBuilder")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("has_handler", &self.handler.is_some())
            .field("features", &self.features)
            .finish_non_exhaustive()
    }
}
