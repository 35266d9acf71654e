//! Typed configuration for Switchyard.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! The root type is [`SwitchyardConfig`]:
//!
//! - [`DispatchConfig`] - pool and cache sizing for the dispatcher
//! - [`LogConfig`] - structured logging
//! - [`MetricsConfig`] - Prometheus metrics
//!
//! # Example
//!
//! ```no_run
//! use switchyard_config::ConfigLoader;
//!
//! # fn main() -> Result<(), switchyard_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_dotenv()?
//!     .with_optional_file("switchyard.toml")?
//!     .with_env_prefix("SWITCHYARD")
//!     .load()?;
//!
//! println!("match cache holds {} entries", config.dispatch.match_cache_capacity);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [dispatch]
//! pool_capacity = 50
//! match_cache_capacity = 500
//! normalize_cache_capacity = 200
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//!
//! [metrics]
//! enabled = true
//! listen_addr = "0.0.0.0:9090"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values can be overridden with `PREFIX__SECTION__KEY` variables:
//!
//! - `SWITCHYARD__DISPATCH__POOL_CAPACITY=100`
//! - `SWITCHYARD__LOGGING__LEVEL=debug`
//! - `SWITCHYARD__METRICS__ENABLED=false`

#![doc(html_root_url = "https://docs.rs/switchyard-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{SwitchyardConfig, SwitchyardConfigBuilder};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::DispatchConfig;
pub use switchyard_telemetry::{LogConfig, LogFormat, MetricsConfig};
