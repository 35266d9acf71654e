//! Test request building.

use bytes::Bytes;
use http::{header, HeaderName, HeaderValue, Method};
use serde::Serialize;
use switchyard::router::ResourcePool;
use switchyard::Request;

use crate::error::TestError;

/// Builder for constructing dispatcher requests.
///
/// Header and body problems are recorded and reported by [`build`](Self::build)
/// so the fluent chain never panics.
#[must_use]
#[derive(Debug)]
pub struct TestRequestBuilder {
    method: Method,
    path: String,
    headers: Vec<(HeaderName, HeaderValue)>,
    query: Vec<(String, String)>,
    body: Bytes,
    error: Option<TestError>,
}

impl TestRequestBuilder {
    /// Creates a new request builder.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            query: Vec::new(),
            body: Bytes::new(),
            error: None,
        }
    }

    /// Creates a GET request builder.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Creates a POST request builder.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Returns the request method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Adds a header to the request.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        let name = name.as_ref();
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value.as_ref()),
        ) {
            (Ok(name), Ok(value)) => self.headers.push((name, value)),
            _ => self.fail(TestError::InvalidHeader(name.to_string())),
        }
        self
    }

    /// Sets the Content-Type header.
    pub fn content_type(self, content_type: impl AsRef<str>) -> Self {
        self.header(header::CONTENT_TYPE.as_str(), content_type)
    }

    /// Sets the Authorization header with a Bearer token.
    pub fn bearer_token(self, token: impl AsRef<str>) -> Self {
        self.header(
            header::AUTHORIZATION.as_str(),
            format!("Bearer {}", token.as_ref()),
        )
    }

    /// Adds a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Sets the raw request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets the request body as JSON and the `Content-Type` to
    /// `application/json`.
    pub fn json<T: Serialize>(mut self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.body = Bytes::from(bytes),
            Err(e) => self.fail(TestError::Json(e)),
        }
        self.content_type("application/json")
    }

    /// Builds the request. The query container is taken from `pool`.
    ///
    /// # Errors
    ///
    /// Returns the first header or JSON error recorded by the builder.
    pub fn build(self, pool: &ResourcePool) -> Result<Request, TestError> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let mut query = pool.acquire_query();
        query.extend(self.query);

        let mut request = Request::new(self.method, self.path)
            .with_query_map(query)
            .with_body(self.body);
        let headers = request.headers_mut();
        for (name, value) in self.headers {
            headers.append(name, value);
        }
        Ok(request)
    }

    fn fail(&mut self, error: TestError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }
}
