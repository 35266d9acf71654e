//! Per-route feature configuration.
//!
//! These are plain data handed to the policy collaborators; the dispatch
//! core only decides when each one runs.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Rate-limit settings: at most `requests` per `window`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests allowed per window.
    pub requests: u32,
    /// Window length.
    #[serde(with = "duration_ms")]
    pub window: Duration,
    /// Optional header naming the caller key; policies choose a default when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_header: Option<String>,
}

impl RateLimitConfig {
    /// Creates a limit of `requests` per `window_ms` milliseconds.
    #[must_use]
    pub fn per_millis(requests: u32, window_ms: u64) -> Self {
        Self {
            requests,
            window: Duration::from_millis(window_ms),
            key_header: None,
        }
    }

    /// Sets the header used to key callers.
    #[must_use]
    pub fn keyed_by(mut self, header: impl Into<String>) -> Self {
        self.key_header = Some(header.into());
        self
    }
}

/// Authentication and authorization settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Whether an authenticated caller is required.
    #[serde(default = "default_true")]
    pub required: bool,
    /// Roles any one of which grants access. Empty means any authenticated caller.
    #[serde(default)]
    pub roles: Vec<String>,
    /// Authentication scheme name (e.g. `bearer`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
}

impl AuthConfig {
    /// Requires an authenticated caller.
    #[must_use]
    pub fn required() -> Self {
        Self {
            required: true,
            ..Self::default()
        }
    }

    /// Requires one of the given roles.
    #[must_use]
    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the scheme.
    #[must_use]
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }
}

const fn default_true() -> bool {
    true
}

/// Validation schemas for each request part.
///
/// A route is considered to declare validation when at least one part has a
/// schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Body schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Query schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Value>,
    /// Path parameter schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    /// Header schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Value>,
}

impl ValidationConfig {
    /// Returns `true` if no part carries a schema.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_none() && self.query.is_none() && self.params.is_none() && self.headers.is_none()
    }
}

/// Response cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Entry lifetime.
    #[serde(with = "duration_ms")]
    pub ttl: Duration,
    /// Optional explicit cache key; policies derive one from the request when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl CacheConfig {
    /// Caches for `ttl`.
    #[must_use]
    pub const fn ttl(ttl: Duration) -> Self {
        Self { ttl, key: None }
    }

    /// Sets an explicit key.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

/// Durations as integer milliseconds.
mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
