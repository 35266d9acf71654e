//! Error types for Switchyard.
//!
//! Errors fall into three groups:
//!
//! | Group | Type | When |
//! |-------|------|------|
//! | Registration | [`RegistrationError`] | startup, thrown synchronously |
//! | Response writes | [`ResponseError`] | writing to an already finalized response, bad headers |
//! | Execution | `anyhow::Error` | handler / middleware / policy failures, caught by the executor |
//!
//! A route miss is not an error; dispatch reports it as "not handled".
//!
//! Error responses written by the framework use the JSON [`ErrorEnvelope`]:
//!
//! ```json
//! {"error": {"code": "INTERNAL_ERROR", "message": "...", "category": "internal"}}
//! ```

use http::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use switchyard_router::PatternError;
use thiserror::Error;

/// Categories of framework-generated error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Request validation errors (invalid input, schema mismatch).
    Validation,
    /// Authentication errors (invalid/missing credentials).
    Authentication,
    /// Authorization errors (permission denied).
    Authorization,
    /// Resource not found.
    NotFound,
    /// Rate limiting.
    RateLimited,
    /// Internal server errors.
    Internal,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this error category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Authentication => StatusCode::UNAUTHORIZED,
            Self::Authorization => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the machine-readable error code used in envelopes.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::Authentication => "AUTHENTICATION_ERROR",
            Self::Authorization => "AUTHORIZATION_DENIED",
            Self::NotFound => "NOT_FOUND",
            Self::RateLimited => "RATE_LIMITED",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}

/// Serializable error envelope for framework-generated responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error details.
    pub error: ErrorDetail,
}

/// Error detail within an envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Error category.
    pub category: ErrorCategory,
}

impl ErrorEnvelope {
    /// Creates an envelope for a category and message.
    #[must_use]
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: category.code().to_string(),
                message: message.into(),
                category,
            },
        }
    }
}

/// Errors raised while registering a route.
///
/// These are startup failures: registration code should propagate them and
/// refuse to serve traffic.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// The route builder was finished without a handler.
    #[error("route {method} {path} was registered without a handler")]
    MissingHandler {
        /// Declared method.
        method: Method,
        /// Declared path pattern.
        path: String,
    },

    /// The path pattern could not be compiled.
    #[error("invalid route pattern: {0}")]
    InvalidPattern(#[from] PatternError),

    /// The same method and pattern were registered twice.
    #[error("route {method} {path} is already registered")]
    DuplicateRoute {
        /// Declared method.
        method: Method,
        /// Declared path pattern.
        path: String,
    },

    /// The route declares a feature whose policy collaborator is not installed.
    #[error("route {method} {path} declares {phase} but no {phase} policy is installed")]
    MissingPolicy {
        /// Declared method.
        method: Method,
        /// Declared path pattern.
        path: String,
        /// Name of the phase missing a collaborator.
        phase: &'static str,
    },
}

/// Errors raised while writing a response.
#[derive(Debug, Error)]
pub enum ResponseError {
    /// The response was already finalized; the write was ignored.
    #[error("response has already been finalized")]
    AlreadyFinalized,

    /// The body could not be serialized.
    #[error("failed to serialize response body: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A header name or value was rejected.
    #[error("invalid header {name}: {reason}")]
    InvalidHeader {
        /// Header name as given.
        name: String,
        /// Why it was rejected.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_status_codes() {
        assert_eq!(ErrorCategory::Validation.default_status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCategory::Authentication.default_status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ErrorCategory::RateLimited.default_status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ErrorCategory::Internal.default_status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_envelope_serialization() {
        let envelope = ErrorEnvelope::new(ErrorCategory::RateLimited, "slow down");
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["error"]["code"], "RATE_LIMITED");
        assert_eq!(json["error"]["message"], "slow down");
        assert_eq!(json["error"]["category"], "rate_limited");
    }

    #[test]
    fn test_registration_error_display() {
        let err = RegistrationError::MissingHandler {
            method: Method::GET,
            path: "/users".to_string(),
        };
        assert_eq!(err.to_string(), "route GET /users was registered without a handler");

        let err = RegistrationError::MissingPolicy {
            method: Method::POST,
            path: "/orders".to_string(),
            phase: "rate_limit",
        };
        assert_eq!(
            err.to_string(),
            "route POST /orders declares rate_limit but no rate_limit policy is installed"
        );
    }

    #[test]
    fn test_pattern_error_converts() {
        let err: RegistrationError = switchyard_router::compile("users").unwrap_err().into();
        assert!(matches!(err, RegistrationError::InvalidPattern(_)));
    }
}
