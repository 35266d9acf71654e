//! Observability for Switchyard.
//!
//! - **Logging**: `tracing-subscriber` bootstrap with JSON or pretty output
//! - **Metrics**: dispatch counters through the `metrics` facade, exported
//!   with Prometheus
//!
//! Both are optional. The dispatch crates emit events and counters
//! unconditionally; nothing is printed or exported until [`init_telemetry`]
//! (or the individual initializers) run.
//!
//! # Example
//!
//! ```rust,ignore
//! use switchyard_telemetry::{init_telemetry, TelemetryConfig};
//!
//! init_telemetry(&TelemetryConfig::default())?;
//! ```

#![doc(html_root_url = "https://docs.rs/switchyard-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;
pub mod metrics;

use serde::{Deserialize, Serialize};

pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig, LogFormat};
pub use metrics::{init_metrics, render_metrics, MetricsConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Combined telemetry settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Logging settings.
    pub logging: LogConfig,
    /// Metrics settings.
    pub metrics: MetricsConfig,
}

/// Installs logging, then metrics.
///
/// # Errors
///
/// Returns the first initialization failure.
pub fn init_telemetry(config: &TelemetryConfig) -> TelemetryResult<()> {
    init_logging(&config.logging)?;
    init_metrics(&config.metrics)?;
    Ok(())
}
