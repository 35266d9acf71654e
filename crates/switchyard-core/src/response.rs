//! Outbound response model.
//!
//! A [`Response`] is written at most once. The first call to one of the
//! finalizing methods ([`Response::send`], [`Response::json`],
//! [`Response::end`], [`Response::reject`]) fixes the body; the executor
//! polls [`Response::is_finalized`] between phases to short-circuit.

use bytes::Bytes;
use http::{header, header::HeaderName, HeaderMap, HeaderValue, StatusCode};
use serde::Serialize;

use crate::error::{ErrorCategory, ErrorEnvelope, ResponseError};

/// A value a handler hands back to be written as the response body.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Body {
    /// Nothing to write; the response is finalized empty.
    #[default]
    Empty,
    /// A UTF-8 text body.
    Text(String),
    /// A JSON body.
    Json(serde_json::Value),
    /// Raw bytes.
    Bytes(Bytes),
}

impl Body {
    /// Returns `true` for [`Body::Empty`].
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Serializes any value into a JSON body.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, ResponseError> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }
}

impl From<()> for Body {
    fn from((): ()) -> Self {
        Self::Empty
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&'static str> for Body {
    fn from(s: &'static str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<serde_json::Value> for Body {
    fn from(v: serde_json::Value) -> Self {
        Self::Json(v)
    }
}

impl From<Bytes> for Body {
    fn from(b: Bytes) -> Self {
        Self::Bytes(b)
    }
}

impl From<Vec<u8>> for Body {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(b))
    }
}

/// A response under construction.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    finalized: bool,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    /// Creates an unfinalized `200 OK` response.
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            finalized: false,
        }
    }

    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Sets the status code. Ignored after finalization.
    pub fn set_status(&mut self, status: StatusCode) -> &mut Self {
        if self.finalized {
            tracing::trace!(status = %status, "status change after finalization ignored");
        } else {
            self.status = status;
        }
        self
    }

    /// Sets a header, replacing any previous value.
    pub fn set_header(&mut self, name: &str, value: &str) -> Result<&mut Self, ResponseError> {
        self.ensure_open("set_header")?;
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| ResponseError::InvalidHeader {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| ResponseError::InvalidHeader {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    /// Returns the headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a mutable reference to the headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Returns `true` once a body has been written.
    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Alias of [`Response::is_finalized`] in transport terms.
    #[must_use]
    pub fn headers_sent(&self) -> bool {
        self.finalized
    }

    /// Writes the body and finalizes the response.
    ///
    /// Text bodies default to `text/plain`, JSON bodies to `application/json`
    /// unless a content type was already set.
    pub fn send(&mut self, body: impl Into<Body>) -> Result<(), ResponseError> {
        self.ensure_open("send")?;
        match body.into() {
            Body::Empty => {}
            Body::Text(text) => {
                self.default_content_type("text/plain; charset=utf-8");
                self.body = Bytes::from(text);
            }
            Body::Json(value) => {
                self.default_content_type("application/json");
                self.body = Bytes::from(serde_json::to_vec(&value)?);
            }
            Body::Bytes(bytes) => self.body = bytes,
        }
        self.finalized = true;
        Ok(())
    }

    /// Serializes `value` as JSON and finalizes the response.
    pub fn json<T: Serialize>(&mut self, value: &T) -> Result<(), ResponseError> {
        self.ensure_open("json")?;
        let bytes = serde_json::to_vec(value)?;
        self.default_content_type("application/json");
        self.body = Bytes::from(bytes);
        self.finalized = true;
        Ok(())
    }

    /// Finalizes the response with an empty body.
    pub fn end(&mut self) -> Result<(), ResponseError> {
        self.send(Body::Empty)
    }

    /// Finalizes the response with the category's status and an error envelope.
    pub fn reject(
        &mut self,
        category: ErrorCategory,
        message: impl Into<String>,
    ) -> Result<(), ResponseError> {
        self.ensure_open("reject")?;
        self.status = category.default_status_code();
        self.json(&ErrorEnvelope::new(category, message))
    }

    /// Returns the written body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the body as UTF-8 text, lossily.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    fn ensure_open(&self, operation: &'static str) -> Result<(), ResponseError> {
        if self.finalized {
            tracing::debug!(
                operation,
                http.status_code = self.status.as_u16(),
                "write rejected: response already finalized"
            );
            return Err(ResponseError::AlreadyFinalized);
        }
        Ok(())
    }

    fn default_content_type(&mut self, value: &'static str) {
        self.headers
            .entry(header::CONTENT_TYPE)
            .or_insert(HeaderValue::from_static(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_finalizes_once() {
        let mut res = Response::new();
        assert!(!res.is_finalized());

        res.send("hello").unwrap();
        assert!(res.is_finalized());
        assert!(res.headers_sent());
        assert_eq!(res.text(), "hello");

        let err = res.send("again").unwrap_err();
        assert!(matches!(err, ResponseError::AlreadyFinalized));
        assert_eq!(res.text(), "hello");
    }

    #[test]
    fn test_json_sets_content_type() {
        let mut res = Response::new();
        res.json(&serde_json::json!({"ok": true})).unwrap();

        assert_eq!(
            res.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(res.text(), r#"{"ok":true}"#);
    }

    #[test]
    fn test_explicit_content_type_is_kept() {
        let mut res = Response::new();
        res.set_header("content-type", "text/html").unwrap();
        res.send("<p>hi</p>").unwrap();
        assert_eq!(res.headers().get(header::CONTENT_TYPE).unwrap(), "text/html");
    }

    #[test]
    fn test_end_is_empty() {
        let mut res = Response::new();
        res.set_status(StatusCode::NO_CONTENT);
        res.end().unwrap();

        assert!(res.is_finalized());
        assert!(res.body().is_empty());
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    #[test]
    fn test_reject_writes_envelope() {
        let mut res = Response::new();
        res.reject(ErrorCategory::Authentication, "missing token").unwrap();

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let json: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(json["error"]["code"], "AUTHENTICATION_ERROR");
        assert_eq!(json["error"]["message"], "missing token");
    }

    #[test]
    fn test_status_frozen_after_finalize() {
        let mut res = Response::new();
        res.end().unwrap();
        res.set_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.set_header("x-late", "1").is_err());
    }

    #[test]
    fn test_every_write_rejected_after_finalize() {
        let mut res = Response::new();
        res.set_status(StatusCode::ACCEPTED);
        res.send("first").unwrap();

        assert!(matches!(res.send("second"), Err(ResponseError::AlreadyFinalized)));
        assert!(matches!(
            res.json(&serde_json::json!({"n": 1})),
            Err(ResponseError::AlreadyFinalized)
        ));
        assert!(matches!(res.end(), Err(ResponseError::AlreadyFinalized)));
        assert!(matches!(
            res.reject(ErrorCategory::Internal, "late"),
            Err(ResponseError::AlreadyFinalized)
        ));
        assert!(matches!(
            res.set_header("x-late", "1"),
            Err(ResponseError::AlreadyFinalized)
        ));

        assert_eq!(res.status(), StatusCode::ACCEPTED);
        assert_eq!(res.text(), "first");
        assert!(res.headers().get("x-late").is_none());
    }

    #[test]
    fn test_invalid_header() {
        let mut res = Response::new();
        let err = res.set_header("bad header", "x").unwrap_err();
        assert!(matches!(err, ResponseError::InvalidHeader { .. }));
    }

    #[test]
    fn test_body_conversions() {
        assert_eq!(Body::from(()), Body::Empty);
        assert_eq!(Body::from("x"), Body::Text("x".to_string()));
        assert!(Body::default().is_empty());
        assert!(matches!(Body::json(&[1, 2]).unwrap(), Body::Json(_)));
    }
}
