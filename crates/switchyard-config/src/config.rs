//! Main configuration types.
//!
//! This module provides the top-level [`SwitchyardConfig`] struct and its builder.

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};
use switchyard_telemetry::logging::create_env_filter;
use switchyard_telemetry::{LogConfig, MetricsConfig, TelemetryConfig};

use crate::{ConfigError, DispatchConfig};

/// Complete Switchyard configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use switchyard_config::SwitchyardConfig;
///
/// let config = SwitchyardConfig::default();
/// assert_eq!(config.dispatch.pool_capacity, 50);
/// assert!(!config.metrics.enabled);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct SwitchyardConfig {
    /// Dispatch core sizing.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LogConfig,

    /// Metrics configuration.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl SwitchyardConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> SwitchyardConfigBuilder {
        SwitchyardConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - The log level is not a valid filter directive
    /// - Metrics are enabled with an unparsable listen address
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.logging.enabled {
            create_env_filter(&self.logging.level).map_err(|e| {
                ConfigError::invalid("logging.level", e.to_string())
            })?;
        }

        if self.metrics.enabled {
            if let Some(addr) = &self.metrics.listen_addr {
                if addr.parse::<SocketAddr>().is_err() {
                    return Err(ConfigError::invalid(
                        "metrics.listen_addr",
                        format!("invalid socket address: {addr}"),
                    ));
                }
            }
        }

        Ok(())
    }

    /// Development preset: pretty `debug` logs, no metrics.
    ///
    /// # Example
    ///
    /// ```
    /// use switchyard_config::SwitchyardConfig;
    ///
    /// let config = SwitchyardConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        Self {
            logging: LogConfig::development(),
            ..Self::default()
        }
    }

    /// Production preset: JSON `info` logs, Prometheus recorder installed.
    #[must_use]
    pub fn production() -> Self {
        Self {
            logging: LogConfig::production(),
            metrics: MetricsConfig {
                enabled: true,
                listen_addr: None,
            },
            ..Self::default()
        }
    }

    /// Returns the sections consumed by `switchyard_telemetry::init_telemetry`.
    #[must_use]
    pub fn telemetry(&self) -> TelemetryConfig {
        TelemetryConfig {
            logging: self.logging.clone(),
            metrics: self.metrics.clone(),
        }
    }
}

/// Builder for [`SwitchyardConfig`].
#[derive(Debug, Default)]
pub struct SwitchyardConfigBuilder {
    dispatch: Option<DispatchConfig>,
    logging: Option<LogConfig>,
    metrics: Option<MetricsConfig>,
}

impl SwitchyardConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the dispatch configuration.
    #[must_use]
    pub fn dispatch(mut self, dispatch: DispatchConfig) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    /// Set the logging configuration.
    #[must_use]
    pub fn logging(mut self, logging: LogConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Set the metrics configuration.
    #[must_use]
    pub fn metrics(mut self, metrics: MetricsConfig) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Build the configuration. Unset sections use their defaults.
    #[must_use]
    pub fn build(self) -> SwitchyardConfig {
        SwitchyardConfig {
            dispatch: self.dispatch.unwrap_or_default(),
            logging: self.logging.unwrap_or_default(),
            metrics: self.metrics.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<SwitchyardConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}
