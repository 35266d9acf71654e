//! # Switchyard
//!
//! **Request-dispatch core: tiered route lookup and a fixed-order phase engine**
//!
//! Switchyard decides, for every inbound request, which registered route
//! handles it, which cross-cutting policies run and in what order, and how
//! the response is finalized:
//!
//! - **Tiered lookup**: feature-free fast-path routes first, then an O(1)
//!   static table, then dynamic routes bucketed by segment count
//! - **Fixed phase order**: before → rate limit → auth → validation →
//!   transform → cache → after → legacy middleware → handler
//! - **Immediate or deferred**: fast-path routes with synchronous handlers
//!   complete inside the dispatch call
//! - **Pooled scratch**: parameter and query containers are recycled
//!
//! ## Quick Start
//!
//! ```rust
//! use http::Method;
//! use switchyard::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut dispatcher = Dispatcher::new();
//!
//! dispatcher
//!     .get("/users/:id/posts/:postId")
//!     .handler(Handler::deferred(|req, _res| {
//!         let id = req.param("id").unwrap_or_default().to_string();
//!         let post = req.param("postId").unwrap_or_default().to_string();
//!         async move { Ok(Body::from(format!("{id}/{post}"))) }
//!     }))?;
//!
//! let mut req = Request::new(Method::GET, "/users/42/posts/7");
//! let mut res = Response::new();
//! assert!(dispatcher.handle_request(&mut req, &mut res).await);
//! assert_eq!(res.text(), "42/7");
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! handle_request ─► Tier 0 fast path ──hit──► handler (same call stack)
//!                      │ miss
//!                      ▼
//!                   Tier 1 "METHOD:path" ──hit──┐
//!                      │ miss                   ▼
//!                      ▼                  PhaseExecutor ─► handler
//!                   Tier 2 bucket[segments] ─hit┘
//!                      │ miss
//!                      ▼
//!                   not handled
//! ```

#![doc(html_root_url = "https://docs.rs/switchyard/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod dispatcher;
mod route;
mod schema;
mod stats;
mod table;

pub use dispatcher::Dispatcher;
pub use route::{CompiledRoute, RouteInfo};
pub use schema::{RouteSchema, RouteSchemaBuilder};
pub use stats::{DispatchStats, TierStats};
pub use table::{RouteMatch, RouteTable, Tier};

// Re-export the building blocks
pub use switchyard_config as config;
pub use switchyard_core as core;
pub use switchyard_middleware as middleware;
pub use switchyard_router as router;
pub use switchyard_telemetry as telemetry;

pub use switchyard_core::{
    AsyncHandler, AuthConfig, Body, CacheConfig, Completion, ErrorCategory, Handler,
    HandlerResult, RateLimitConfig, RegistrationError, Request, Response, SyncHandler,
    ValidationConfig,
};
pub use switchyard_middleware::{
    from_fn, policy, BoxedMiddleware, Middleware, Next, PhaseKind, Policy, PolicyOutcome,
    PolicySet,
};

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use switchyard::prelude::*;
///
/// let dispatcher = Dispatcher::new();
/// assert_eq!(dispatcher.route_count(), 0);
/// ```
pub mod prelude {
    pub use crate::{Dispatcher, RouteSchema, Tier};

    pub use switchyard_core::{
        AuthConfig, Body, CacheConfig, Completion, ErrorCategory, Handler, HandlerResult,
        RateLimitConfig, Request, Response, ValidationConfig,
    };

    pub use switchyard_middleware::{from_fn, policy, Next, PolicyOutcome, PolicySet};
}
