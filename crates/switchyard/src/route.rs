//! Compiled routes.

use http::Method;
use serde::Serialize;
use switchyard_core::{Handler, RegistrationError};
use switchyard_middleware::{ExecutionPlan, RouteFeatures};
use switchyard_router::{CompiledPath, ParamExtractor};

use crate::schema::RouteSchema;

/// A route ready for matching.
///
/// Built exactly once, at registration, and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct CompiledRoute {
    schema: RouteSchema,
    path: CompiledPath,
    fast_path: bool,
    plan: ExecutionPlan,
    extractor: ParamExtractor,
}

impl CompiledRoute {
    /// Compiles a schema.
    ///
    /// A route is fast-path iff it declares no features at all.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::InvalidPattern`] if the path does not
    /// compile.
    pub fn compile(schema: RouteSchema) -> Result<Self, RegistrationError> {
        let path = CompiledPath::compile(schema.path())?;
        let fast_path = schema.features().is_empty();
        let plan = ExecutionPlan::from_features(schema.features());
        let extractor = ParamExtractor::for_names(path.param_names());

        Ok(Self {
            schema,
            path,
            fast_path,
            plan,
            extractor,
        })
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> &Method {
        self.schema.method()
    }

    /// Returns the compiled path.
    pub fn path(&self) -> &CompiledPath {
        &self.path
    }

    /// Returns the pattern as declared.
    pub fn pattern(&self) -> &str {
        self.schema.path()
    }

    /// Returns the endpoint.
    pub fn handler(&self) -> &Handler {
        self.schema.handler()
    }

    /// Returns the declared features.
    pub fn features(&self) -> &RouteFeatures {
        self.schema.features()
    }

    /// Returns `true` if the route bypasses the phase engine.
    pub fn is_fast_path(&self) -> bool {
        self.fast_path
    }

    /// Returns the precomputed phase order.
    pub fn plan(&self) -> &ExecutionPlan {
        &self.plan
    }

    /// Returns the parameter extractor sized for this route.
    pub fn extractor(&self) -> &ParamExtractor {
        &self.extractor
    }

    /// Returns the static lookup key (`"METHOD:path"`), if the route is static.
    pub fn static_key(&self) -> Option<String> {
        self.path.literal().map(|literal| route_key(self.method(), literal))
    }

    /// Describes the route for introspection.
    pub fn info(&self) -> RouteInfo {
        RouteInfo {
            method: self.method().to_string(),
            path: self.pattern().to_string(),
            is_static: self.path.is_static(),
            fast_path: self.fast_path,
            phases: self.plan.names(),
            params: self.path.param_names().to_vec(),
        }
    }
}

/// A registered route, as reported by
/// [`Dispatcher::all_routes`](crate::Dispatcher::all_routes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteInfo {
    /// HTTP method.
    pub method: String,
    /// Pattern as declared.
    pub path: String,
    /// `true` for routes without parameter markers.
    pub is_static: bool,
    /// `true` for routes that bypass the phase engine.
    pub fast_path: bool,
    /// Phase names in execution order.
    pub phases: Vec<&'static str>,
    /// Parameter names in declaration order.
    pub params: Vec<String>,
}

/// Builds the `"METHOD:path"` key used by the static table.
pub(crate) fn route_key(method: &Method, path: &str) -> String {
    let method = method.as_str();
    let mut key = String::with_capacity(method.len() + 1 + path.len());
    key.push_str(method);
    key.push(':');
    key.push_str(path);
    key
}
