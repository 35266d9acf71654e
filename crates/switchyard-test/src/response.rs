//! Test response wrapper.

use bytes::Bytes;
use http::{header, HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use switchyard::Response;

use crate::error::TestError;

/// The outcome of one dispatch, with helper methods for assertions.
#[derive(Debug, Clone)]
pub struct TestResponse {
    handled: bool,
    finalized: bool,
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    /// Captures the state of `response` after dispatch.
    #[must_use]
    pub fn from_response(handled: bool, response: &Response) -> Self {
        Self {
            handled,
            finalized: response.is_finalized(),
            status: response.status(),
            headers: response.headers().clone(),
            body: response.body().clone(),
        }
    }

    /// Returns whether a route matched.
    #[must_use]
    pub fn handled(&self) -> bool {
        self.handled
    }

    /// Returns whether the response was finalized.
    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the status code as a u16.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Returns a reference to the headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Gets a header value as a string.
    #[must_use]
    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        self.headers
            .get(name.as_ref())
            .and_then(|v| v.to_str().ok())
    }

    /// Returns the Content-Type header value.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header(header::CONTENT_TYPE.as_str())
    }

    /// Returns the raw body bytes.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the body as a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid UTF-8.
    pub fn text(&self) -> Result<String, TestError> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| TestError::BodyRead(format!("Invalid UTF-8: {e}")))
    }

    /// Deserializes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TestError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Returns the `error.code` of a rejection envelope, if present.
    #[must_use]
    pub fn error_code(&self) -> Option<String> {
        let value: serde_json::Value = serde_json::from_slice(&self.body).ok()?;
        value["error"]["code"].as_str().map(str::to_string)
    }

    // Assertion methods

    /// Asserts that a route matched.
    ///
    /// # Panics
    ///
    /// Panics if no route matched.
    pub fn assert_handled(&self) -> &Self {
        assert!(self.handled, "Expected a route to match, none did");
        self
    }

    /// Asserts that no route matched.
    ///
    /// # Panics
    ///
    /// Panics if a route matched.
    pub fn assert_not_handled(&self) -> &Self {
        assert!(!self.handled, "Expected no route to match");
        self
    }

    /// Asserts that the status code equals the expected value.
    ///
    /// # Panics
    ///
    /// Panics if the status code doesn't match.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status, expected,
            "Expected status {}, got {}",
            expected, self.status
        );
        self
    }

    /// Asserts that a header exists with the expected value.
    ///
    /// # Panics
    ///
    /// Panics if the header doesn't exist or doesn't match.
    pub fn assert_header(&self, name: impl AsRef<str>, expected: impl AsRef<str>) -> &Self {
        let name = name.as_ref();
        let expected = expected.as_ref();
        match self.header(name) {
            Some(actual) => assert_eq!(
                actual, expected,
                "Header '{name}' expected '{expected}', got '{actual}'"
            ),
            None => panic!("Header '{name}' not found"),
        }
        self
    }

    /// Asserts that the body equals the expected string.
    ///
    /// # Panics
    ///
    /// Panics if the body doesn't match.
    pub fn assert_body_eq(&self, expected: impl AsRef<str>) -> &Self {
        let body = String::from_utf8_lossy(&self.body);
        assert_eq!(body, expected.as_ref(), "Body mismatch");
        self
    }

    /// Asserts the `error.code` of a rejection envelope.
    ///
    /// # Panics
    ///
    /// Panics if the body is not an error envelope with that code.
    pub fn assert_error_code(&self, expected: &str) -> &Self {
        assert_eq!(
            self.error_code().as_deref(),
            Some(expected),
            "Expected error code {expected}, body was {}",
            String::from_utf8_lossy(&self.body)
        );
        self
    }

    /// Asserts that a JSON field at `pointer` equals the expected value.
    ///
    /// # Panics
    ///
    /// Panics if the body is not JSON or the field doesn't match.
    pub fn assert_json_field(&self, pointer: &str, expected: &serde_json::Value) -> &Self {
        let value: serde_json::Value = match serde_json::from_slice(&self.body) {
            Ok(value) => value,
            Err(e) => panic!("Body is not JSON: {e}"),
        };
        assert_eq!(
            value.pointer(pointer),
            Some(expected),
            "JSON field {pointer} mismatch"
        );
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use switchyard::ErrorCategory;

    #[test]
    fn test_from_response() {
        let mut res = Response::new();
        res.set_status(StatusCode::CREATED);
        res.set_header("x-trace", "t-1").unwrap();
        res.json(&json!({"id": 7})).unwrap();

        let response = TestResponse::from_response(true, &res);
        response
            .assert_handled()
            .assert_status(StatusCode::CREATED)
            .assert_header("x-trace", "t-1")
            .assert_json_field("/id", &json!(7));
        assert!(response.is_finalized());
        assert_eq!(response.status_code(), 201);
    }

    #[test]
    fn test_unhandled_response_is_not_finalized() {
        let response = TestResponse::from_response(false, &Response::new());
        response.assert_not_handled();
        assert!(!response.is_finalized());
        assert!(response.body().is_empty());
    }

    #[test]
    fn test_error_code() {
        let mut res = Response::new();
        res.reject(ErrorCategory::NotFound, "no such user").unwrap();

        let response = TestResponse::from_response(true, &res);
        response
            .assert_status(StatusCode::NOT_FOUND)
            .assert_error_code("NOT_FOUND");
    }

    #[test]
    #[should_panic(expected = "Expected status")]
    fn test_assert_status_panics() {
        TestResponse::from_response(true, &Response::new()).assert_status(StatusCode::CREATED);
    }
}
