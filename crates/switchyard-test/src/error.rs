//! Test error types.

use thiserror::Error;

/// Errors that can occur while building or inspecting a test exchange.
#[derive(Debug, Error)]
pub enum TestError {
    /// Header name or value is invalid
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Response body is not valid UTF-8
    #[error("Body read error: {0}")]
    BodyRead(String),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_json_error_has_source() {
        let err: TestError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(err.to_string().starts_with("JSON error:"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_invalid_header_display() {
        let err = TestError::InvalidHeader("bad name".to_string());
        assert_eq!(err.to_string(), "Invalid header: bad name");
    }
}
