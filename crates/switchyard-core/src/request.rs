//! Inbound request model.
//!
//! The transport layer parses wire bytes into a [`Request`]; the dispatch
//! core only reads method, path, headers and body, and fills the path
//! parameter map after a route matches.

use bytes::Bytes;
use http::{header::HeaderName, HeaderMap, HeaderValue, Method};
use serde::de::DeserializeOwned;
use switchyard_router::ParamMap;

/// An inbound request as seen by routes, middleware and policies.
///
/// # Example
///
/// ```rust
/// use http::Method;
/// use switchyard_core::Request;
///
/// let req = Request::new(Method::POST, "/orders")
///     .with_header("x-api-key", "k1")
///     .with_query("page", "2")
///     .with_body(r#"{"sku":"A-1"}"#);
///
/// assert_eq!(req.header("x-api-key"), Some("k1"));
/// assert_eq!(req.query().get("page").map(String::as_str), Some("2"));
/// ```
#[derive(Debug, Default)]
pub struct Request {
    method: Method,
    path: String,
    query: ParamMap,
    params: ParamMap,
    headers: HeaderMap,
    body: Bytes,
    extensions: http::Extensions,
}

impl Request {
    /// Creates a request with an empty body, query and header set.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            ..Self::default()
        }
    }

    /// Adds a header. Invalid names or values are skipped.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    /// Adds a query value.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Replaces the query container, typically with one taken from a pool.
    #[must_use]
    pub fn with_query_map(mut self, query: ParamMap) -> Self {
        self.query = query;
        self
    }

    /// Returns the request method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request path as received.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the parsed query values.
    #[must_use]
    pub fn query(&self) -> &ParamMap {
        &self.query
    }

    /// Returns a mutable reference to the query values.
    pub fn query_mut(&mut self) -> &mut ParamMap {
        &mut self.query
    }

    /// Returns the path parameters filled in by the dispatcher.
    #[must_use]
    pub fn params(&self) -> &ParamMap {
        &self.params
    }

    /// Returns a single path parameter.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Installs the path parameter container and returns the previous one.
    pub fn set_params(&mut self, params: ParamMap) -> ParamMap {
        std::mem::replace(&mut self.params, params)
    }

    /// Takes the path parameter container, leaving an unallocated one.
    pub fn take_params(&mut self) -> ParamMap {
        std::mem::take(&mut self.params)
    }

    /// Takes the query container, leaving an unallocated one.
    pub fn take_query(&mut self) -> ParamMap {
        std::mem::take(&mut self.query)
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a mutable reference to the headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Returns a header value if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the raw body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Returns the request extensions, used by middleware to pass typed data along.
    #[must_use]
    pub fn extensions(&self) -> &http::Extensions {
        &self.extensions
    }

    /// Returns a mutable reference to the request extensions.
    pub fn extensions_mut(&mut self) -> &mut http::Extensions {
        &mut self.extensions
    }
}
