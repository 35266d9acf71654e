//! Middleware trait and continuation token.
//!
//! A [`Middleware`] runs inside one of the hook phases (`before`,
//! `transform`, `after`, legacy). It receives the request, the response and
//! a [`Next`] token. Calling [`Next::proceed`] lets the pipeline continue;
//! finalizing the response stops it. Doing neither leaves the request
//! pending.
//!
//! # Example
//!
//! ```rust
//! use switchyard_middleware::{BoxFuture, Middleware, Next};
//! use switchyard_core::{Request, Response};
//!
//! struct RequireJson;
//!
//! impl Middleware for RequireJson {
//!     fn name(&self) -> &'static str {
//!         "require-json"
//!     }
//!
//!     fn call<'a>(
//!         &'a self,
//!         req: &'a mut Request,
//!         res: &'a mut Response,
//!         next: Next,
//!     ) -> BoxFuture<'a, anyhow::Result<()>> {
//!         Box::pin(async move {
//!             if req.header("content-type") == Some("application/json") {
//!                 next.proceed();
//!             } else {
//!                 res.set_status(http::StatusCode::UNSUPPORTED_MEDIA_TYPE);
//!                 res.end()?;
//!             }
//!             Ok(())
//!         })
//!     }
//! }
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use switchyard_core::{Request, Response};

pub use switchyard_core::BoxFuture;

/// A type-erased middleware that can be stored in phase lists.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// The middleware trait.
///
/// # Invariants
///
/// - Call [`Next::proceed`] to continue, or finalize the response to stop
/// - Calling `proceed` more than once has no further effect
/// - Returning an error stops the pipeline; the executor writes a server
///   error unless the response is already finalized
pub trait Middleware: Send + Sync + 'static {
    /// Returns the name used in logs.
    fn name(&self) -> &'static str;

    /// Runs the middleware.
    fn call<'a>(
        &'a self,
        req: &'a mut Request,
        res: &'a mut Response,
        next: Next,
    ) -> BoxFuture<'a, anyhow::Result<()>>;
}

/// One-shot, idempotent continuation handed to each middleware.
///
/// Clones share state, so a middleware may stash a clone and proceed later
/// within its own future.
#[derive(Clone, Default)]
pub struct Next {
    called: Arc<AtomicBool>,
}

impl Next {
    /// Creates an unused token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals that the pipeline may continue.
    ///
    /// Returns `true` on the first call and `false` afterwards.
    pub fn proceed(&self) -> bool {
        !self.called.swap(true, Ordering::AcqRel)
    }

    /// Returns `true` once [`Next::proceed`] has been called.
    #[must_use]
    pub fn is_called(&self) -> bool {
        self.called.load(Ordering::Acquire)
    }
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next").field("called", &self.is_called()).finish()
    }
}

/// A middleware built from a synchronous closure.
///
/// # Example
///
/// ```rust
/// use switchyard_middleware::from_fn;
///
/// let tag = from_fn("tag", |_req, res, next| {
///     res.set_header("x-served-by", "switchyard")?;
///     next.proceed();
///     Ok(())
/// });
/// # let _ = tag;
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F> {
    /// Creates a new function-based middleware.
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: Fn(&mut Request, &mut Response, &Next) -> anyhow::Result<()> + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn call<'a>(
        &'a self,
        req: &'a mut Request,
        res: &'a mut Response,
        next: Next,
    ) -> BoxFuture<'a, anyhow::Result<()>> {
        let result = (self.func)(req, res, &next);
        Box::pin(std::future::ready(result))
    }
}

impl<F> fmt::Debug for FnMiddleware<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnMiddleware").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Creates a boxed middleware from a synchronous closure.
pub fn from_fn<F>(name: &'static str, func: F) -> BoxedMiddleware
where
    F: Fn(&mut Request, &mut Response, &Next) -> anyhow::Result<()> + Send + Sync + 'static,
{
    Arc::new(FnMiddleware::new(name, func))
}
