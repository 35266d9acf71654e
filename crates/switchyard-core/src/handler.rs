//! Handler contract for route endpoints.
//!
//! Whether a handler's result is available right away or must be awaited is
//! part of its declared contract, not something inspected at runtime:
//!
//! - [`SyncHandler`] endpoints return their result directly. On fast-path
//!   routes they run entirely inside the dispatch call, without allocating
//!   a future.
//! - [`AsyncHandler`] endpoints return a future.
//!
//! [`Handler`] erases both behind one cloneable value stored in the route
//! table. [`Completion`] carries either kind of result.

use std::fmt;
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{Body, Response};

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What a handler produces: a body to write, or an error for the executor.
///
/// A handler that already finalized the response may return any body; it is
/// ignored.
pub type HandlerResult = anyhow::Result<Body>;

/// A value that is either ready now or produced by a future.
pub enum Completion<'a, T> {
    /// The value is ready.
    Immediate(T),
    /// The value is produced by awaiting the future.
    Deferred(BoxFuture<'a, T>),
}

impl<'a, T> Completion<'a, T> {
    /// Wraps a future.
    pub fn deferred(fut: impl Future<Output = T> + Send + 'a) -> Self {
        Self::Deferred(Box::pin(fut))
    }

    /// Returns `true` for [`Completion::Immediate`].
    #[must_use]
    pub const fn is_immediate(&self) -> bool {
        matches!(self, Self::Immediate(_))
    }

    /// Returns the value if it is immediate.
    pub fn into_immediate(self) -> Option<T> {
        match self {
            Self::Immediate(value) => Some(value),
            Self::Deferred(_) => None,
        }
    }

    /// Maps the eventual value, keeping immediacy.
    pub fn map<U, F>(self, f: F) -> Completion<'a, U>
    where
        T: Send + 'a,
        U: 'a,
        F: FnOnce(T) -> U + Send + 'a,
    {
        match self {
            Self::Immediate(value) => Completion::Immediate(f(value)),
            Self::Deferred(fut) => Completion::Deferred(Box::pin(async move { f(fut.await) })),
        }
    }

    /// Awaits the value regardless of variant.
    pub async fn resolve(self) -> T {
        match self {
            Self::Immediate(value) => value,
            Self::Deferred(fut) => fut.await,
        }
    }
}

impl<'a, T: Send + 'a> IntoFuture for Completion<'a, T> {
    type Output = T;
    type IntoFuture = BoxFuture<'a, T>;

    fn into_future(self) -> Self::IntoFuture {
        match self {
            Self::Immediate(value) => Box::pin(std::future::ready(value)),
            Self::Deferred(fut) => fut,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Completion<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Immediate(value) => f.debug_tuple("Immediate").field(value).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// An endpoint whose result is available when `call` returns.
///
/// # Example
///
/// ```rust
/// use switchyard_core::{Body, Handler, HandlerResult, Request, Response, SyncHandler};
///
/// struct Health;
///
/// impl SyncHandler for Health {
///     fn call(&self, _req: &mut Request, _res: &mut Response) -> HandlerResult {
///         Ok(Body::from("ok"))
///     }
/// }
///
/// let handler = Handler::from_sync(Health);
/// assert!(handler.is_immediate());
/// ```
pub trait SyncHandler: Send + Sync + 'static {
    /// Handles a matched request.
    fn call(&self, req: &mut Request, res: &mut Response) -> HandlerResult;
}

/// An endpoint whose result is produced by a future.
///
/// The future may borrow the request and response for its whole run.
pub trait AsyncHandler: Send + Sync + 'static {
    /// Handles a matched request.
    fn call<'a>(
        &'a self,
        req: &'a mut Request,
        res: &'a mut Response,
    ) -> BoxFuture<'a, HandlerResult>;
}

/// A route endpoint with its declared completion mode.
#[derive(Clone)]
pub enum Handler {
    /// Synchronous endpoint.
    Immediate(Arc<dyn SyncHandler>),
    /// Asynchronous endpoint.
    Deferred(Arc<dyn AsyncHandler>),
}

impl Handler {
    /// Creates an immediate handler from a closure.
    ///
    /// ```rust
    /// use switchyard_core::{Body, Handler};
    ///
    /// let h = Handler::sync(|req, _res| Ok(Body::from(format!("hi {}", req.path()))));
    /// assert!(h.is_immediate());
    /// ```
    pub fn sync<F>(func: F) -> Self
    where
        F: Fn(&mut Request, &mut Response) -> HandlerResult + Send + Sync + 'static,
    {
        Self::Immediate(Arc::new(SyncFn { func }))
    }

    /// Creates a deferred handler from a closure returning a future.
    ///
    /// The closure sees the request before the future is created; the
    /// future owns whatever it needs. Implement [`AsyncHandler`] directly
    /// for futures that borrow the request.
    ///
    /// ```rust
    /// use switchyard_core::{Body, Handler};
    ///
    /// let h = Handler::deferred(|req, _res| {
    ///     let id = req.param("id").unwrap_or_default().to_string();
    ///     async move { Ok(Body::from(id)) }
    /// });
    /// assert!(!h.is_immediate());
    /// ```
    pub fn deferred<F, Fut>(func: F) -> Self
    where
        F: Fn(&mut Request, &mut Response) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Self::Deferred(Arc::new(DeferredFn { func }))
    }

    /// Wraps a [`SyncHandler`].
    pub fn from_sync(handler: impl SyncHandler) -> Self {
        Self::Immediate(Arc::new(handler))
    }

    /// Wraps an [`AsyncHandler`].
    pub fn from_async(handler: impl AsyncHandler) -> Self {
        Self::Deferred(Arc::new(handler))
    }

    /// Returns `true` for synchronous endpoints.
    #[must_use]
    pub const fn is_immediate(&self) -> bool {
        matches!(self, Self::Immediate(_))
    }

    /// Invokes the endpoint.
    pub fn call<'a>(
        &'a self,
        req: &'a mut Request,
        res: &'a mut Response,
    ) -> Completion<'a, HandlerResult> {
        match self {
            Self::Immediate(h) => Completion::Immediate(h.call(req, res)),
            Self::Deferred(h) => Completion::Deferred(h.call(req, res)),
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Immediate(_) => f.write_str("Handler::Immediate"),
            Self::Deferred(_) => f.write_str("Handler::Deferred"),
        }
    }
}

struct SyncFn<F> {
    func: F,
}

impl<F> SyncHandler for SyncFn<F>
where
    F: Fn(&mut Request, &mut Response) -> HandlerResult + Send + Sync + 'static,
{
    fn call(&self, req: &mut Request, res: &mut Response) -> HandlerResult {
        (self.func)(req, res)
    }
}

struct DeferredFn<F> {
    func: F,
}

impl<F, Fut> AsyncHandler for DeferredFn<F>
where
    F: Fn(&mut Request, &mut Response) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call<'a>(
        &'a self,
        req: &'a mut Request,
        res: &'a mut Response,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin((self.func)(req, res))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    #[test]
    fn test_sync_handler_is_immediate() {
        let h = Handler::sync(|req, _res| Ok(Body::from(format!("path={}", req.path()))));
        let mut req = Request::new(Method::GET, "/health");
        let mut res = Response::new();

        let completion = h.call(&mut req, &mut res);
        assert!(completion.is_immediate());
        let body = completion.into_immediate().unwrap().unwrap();
        assert_eq!(body, Body::Text("path=/health".to_string()));
    }

    #[tokio::test]
    async fn test_deferred_handler() {
        let h = Handler::deferred(|req, _res| {
            let id = req.param("id").unwrap_or("none").to_string();
            async move { Ok(Body::from(id)) }
        });
        let mut req = Request::new(Method::GET, "/users/1");
        let mut res = Response::new();

        let completion = h.call(&mut req, &mut res);
        assert!(!completion.is_immediate());
        let body = completion.await.unwrap();
        assert_eq!(body, Body::Text("none".to_string()));
    }

    #[tokio::test]
    async fn test_async_handler_borrows_request() {
        struct Echo;

        impl AsyncHandler for Echo {
            fn call<'a>(
                &'a self,
                req: &'a mut Request,
                res: &'a mut Response,
            ) -> BoxFuture<'a, HandlerResult> {
                Box::pin(async move {
                    tokio::task::yield_now().await;
                    res.send(req.body().clone())?;
                    Ok(Body::Empty)
                })
            }
        }

        let h = Handler::from_async(Echo);
        let mut req = Request::new(Method::POST, "/echo").with_body("ping");
        let mut res = Response::new();

        h.call(&mut req, &mut res).resolve().await.unwrap();
        assert_eq!(res.text(), "ping");
    }

    #[tokio::test]
    async fn test_completion_map() {
        let immediate: Completion<'_, i32> = Completion::Immediate(2);
        let mapped = immediate.map(|v| v * 10);
        assert_eq!(mapped.into_immediate(), Some(20));

        let deferred: Completion<'_, i32> = Completion::deferred(async { 4 });
        let mapped = deferred.map(|v| v + 1);
        assert!(!mapped.is_immediate());
        assert_eq!(mapped.await, 5);
    }
}
