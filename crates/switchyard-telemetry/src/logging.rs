//! Structured logging bootstrap.
//!
//! Switchyard crates log through `tracing` macros using the field names in
//! [`fields`]. Applications install a subscriber once at startup with
//! [`init_logging`]; without one, the macros are no-ops.
//!
//! # Example
//!
//! ```rust,ignore
//! use switchyard_telemetry::logging::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development())?;
//! tracing::debug!(route = "/users/:id", tier = "dynamic", "route matched");
//! ```

use serde::{Deserialize, Serialize};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::error::TelemetryError;
use crate::TelemetryResult;

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Multi-line human readable output.
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Whether to install a subscriber at all.
    pub enabled: bool,

    /// Filter directive, e.g. `info` or `switchyard=debug,warn`.
    pub level: String,

    /// Output format.
    pub format: LogFormat,

    /// Include the module path of each event.
    pub include_target: bool,

    /// Include source file and line.
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            format: LogFormat::Json,
            include_target: true,
            include_location: false,
        }
    }
}

impl LogConfig {
    /// Pretty output at `debug`, with source locations.
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            format: LogFormat::Pretty,
            include_location: true,
            ..Self::default()
        }
    }

    /// JSON output at `info`.
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns [`TelemetryError::LoggingInit`] if the filter does not parse or a
/// global subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = create_env_filter(&config.level)?;

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_target(config.include_target)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(config.include_target)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .try_init()
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}

/// Parses a filter directive.
///
/// # Errors
///
/// Returns an error if the directive is invalid.
pub fn create_env_filter(filter: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(filter)
        .map_err(|e| TelemetryError::LoggingInit(format!("Invalid log level: {e}")))
}

/// Field names used by dispatch log events.
pub mod fields {
    /// HTTP method.
    pub const HTTP_METHOD: &str = "http.method";

    /// Request path as received.
    pub const HTTP_PATH: &str = "http.path";

    /// Matched route pattern.
    pub const ROUTE: &str = "route";

    /// Lookup tier that matched (`fast`, `static`, `dynamic`).
    pub const TIER: &str = "tier";

    /// Phase name.
    pub const PHASE: &str = "phase";

    /// Middleware name.
    pub const MIDDLEWARE: &str = "middleware";

    /// Error description.
    pub const ERROR: &str = "error";
}
