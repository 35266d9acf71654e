//! Telemetry error types.

use thiserror::Error;

/// Errors that can occur while installing telemetry.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The metrics recorder could not be installed.
    #[error("Failed to initialize metrics: {0}")]
    MetricsInit(String),

    /// The log subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// The metrics listen address did not parse.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}
