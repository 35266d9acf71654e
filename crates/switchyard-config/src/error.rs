//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating a [`SwitchyardConfig`](crate::SwitchyardConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("configuration file not found: {}", path.display())]
    Missing {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The configuration file exists but could not be read.
    #[error("cannot read {}", path.display())]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Malformed TOML, or a key the schema does not know.
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// Malformed JSON, or a key the schema does not know.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Neither TOML nor JSON.
    #[error("unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    /// A value parsed but is not usable.
    #[error("{field}: {reason}")]
    Invalid {
        /// Dotted field path, e.g. `metrics.listen_addr`.
        field: &'static str,
        /// What is wrong with the value.
        reason: String,
    },

    /// An environment override could not be applied.
    #[error("environment override {var}: {reason}")]
    Override {
        /// Variable name including the prefix.
        var: String,
        /// What is wrong with the value.
        reason: &'static str,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn bad_override(var: &str, reason: &'static str) -> Self {
        Self::Override {
            var: var.to_string(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_names_path() {
        let err = ConfigError::Missing {
            path: PathBuf::from("/etc/switchyard/config.toml"),
        };
        assert_eq!(
            err.to_string(),
            "configuration file not found: /etc/switchyard/config.toml"
        );
    }

    #[test]
    fn test_invalid_names_field() {
        let err = ConfigError::invalid("metrics.listen_addr", "not a socket address");
        assert_eq!(err.to_string(), "metrics.listen_addr: not a socket address");
    }

    #[test]
    fn test_override_names_variable() {
        let err = ConfigError::bad_override("SWITCHYARD__DISPATCH__POOL_CAPACITY", "expected integer");
        assert_eq!(
            err.to_string(),
            "environment override SWITCHYARD__DISPATCH__POOL_CAPACITY: expected integer"
        );
    }
}
