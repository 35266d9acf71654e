//! Test client for in-process dispatch.

use std::sync::Arc;

use bytes::Bytes;
use http::Method;
use serde::Serialize;
use switchyard::{Dispatcher, Response};

use crate::error::TestError;
use crate::request::TestRequestBuilder;
use crate::response::TestResponse;

/// A test client that drives a [`Dispatcher`] without any transport.
///
/// Each request runs `handle_request` to completion, returns its pooled
/// containers through `finish`, and captures the response.
///
/// # Example
///
/// ```
/// use switchyard::{Body, Dispatcher, Handler};
/// use switchyard_test::TestClient;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let mut dispatcher = Dispatcher::new();
/// dispatcher
///     .get("/health")
///     .handler(Handler::sync(|_req, _res| Ok(Body::from("ok"))))
///     .unwrap();
///
/// let client = TestClient::new(dispatcher);
/// let response = client.get("/health").send().await;
/// response.assert_handled().assert_body_eq("ok");
/// # }
/// ```
#[must_use]
#[derive(Clone)]
pub struct TestClient {
    dispatcher: Arc<Dispatcher>,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// Creates a test client that owns `dispatcher`.
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self::from_arc(Arc::new(dispatcher))
    }

    /// Creates a test client over a shared dispatcher.
    pub fn from_arc(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            default_headers: Vec::new(),
        }
    }

    /// Adds a default header that will be included in all requests.
    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Returns the dispatcher under test.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Creates a GET request builder.
    pub fn get(&self, path: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::GET, path)
    }

    /// Creates a POST request builder.
    pub fn post(&self, path: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::POST, path)
    }

    /// Creates a PUT request builder.
    pub fn put(&self, path: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::PUT, path)
    }

    /// Creates a PATCH request builder.
    pub fn patch(&self, path: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::PATCH, path)
    }

    /// Creates a DELETE request builder.
    pub fn delete(&self, path: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::DELETE, path)
    }

    /// Creates a request builder with a custom method.
    pub fn request(&self, method: Method, path: impl Into<String>) -> TestClientRequest<'_> {
        let mut builder = TestRequestBuilder::new(method, path);
        for (name, value) in &self.default_headers {
            builder = builder.header(name, value);
        }
        TestClientRequest {
            client: self,
            builder,
        }
    }

    async fn send_internal(&self, builder: TestRequestBuilder) -> Result<TestResponse, TestError> {
        let mut req = builder.build(self.dispatcher.pool())?;
        let mut res = Response::new();

        let handled = self.dispatcher.handle_request(&mut req, &mut res).await;
        self.dispatcher.finish(&mut req);

        Ok(TestResponse::from_response(handled, &res))
    }
}

/// A request builder bound to a test client.
#[must_use]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    builder: TestRequestBuilder,
}

impl TestClientRequest<'_> {
    /// Sets a header on the request.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    /// Sets the Authorization header with a Bearer token.
    pub fn bearer_token(mut self, token: impl AsRef<str>) -> Self {
        self.builder = self.builder.bearer_token(token);
        self
    }

    /// Adds a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.builder = self.builder.query(key, value);
        self
    }

    /// Sets the raw request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Sets the request body as JSON.
    pub fn json<T: Serialize>(mut self, value: &T) -> Self {
        self.builder = self.builder.json(value);
        self
    }

    /// Sends the request and returns the response.
    ///
    /// # Panics
    ///
    /// Panics if the request could not be built; use
    /// [`try_send`](Self::try_send) to handle that case.
    pub async fn send(self) -> TestResponse {
        match self.try_send().await {
            Ok(response) => response,
            Err(e) => panic!("test request failed: {e}"),
        }
    }

    /// Sends the request and returns a Result.
    ///
    /// # Errors
    ///
    /// Returns an error if a header or JSON body was invalid.
    pub async fn try_send(self) -> Result<TestResponse, TestError> {
        self.client.send_internal(self.builder).await
    }
}
