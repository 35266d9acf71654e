//! Dispatch metrics.
//!
//! Recording goes through the `metrics` facade, so every `record_*` call is a
//! no-op until a recorder is installed. [`init_metrics`] installs the
//! Prometheus recorder.
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `switchyard_dispatch_total` | Counter | `tier` | Requests matched, by lookup tier |
//! | `switchyard_dispatch_miss_total` | Counter | - | Requests no route matched |
//! | `switchyard_phase_short_circuit_total` | Counter | `phase` | Phases that finalized the response |
//! | `switchyard_execution_errors_total` | Counter | `source` | Handler, middleware and policy failures |
//! | `switchyard_routes_registered` | Gauge | - | Routes in the table |

use std::net::SocketAddr;
use std::sync::OnceLock;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::{Deserialize, Serialize};

use crate::error::TelemetryError;
use crate::TelemetryResult;

/// Requests matched, by tier.
pub const DISPATCH_TOTAL: &str = "switchyard_dispatch_total";
/// Requests not matched.
pub const DISPATCH_MISS_TOTAL: &str = "switchyard_dispatch_miss_total";
/// Phases that finalized the response.
pub const PHASE_SHORT_CIRCUIT_TOTAL: &str = "switchyard_phase_short_circuit_total";
/// Caught execution failures.
pub const EXECUTION_ERRORS_TOTAL: &str = "switchyard_execution_errors_total";
/// Registered routes.
pub const ROUTES_REGISTERED: &str = "switchyard_routes_registered";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Whether to install the Prometheus recorder.
    pub enabled: bool,

    /// Address for the scrape listener. `None` installs the recorder only;
    /// use [`render_metrics`] to expose the text yourself.
    pub listen_addr: Option<String>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: None,
        }
    }
}

/// Installs the Prometheus recorder.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidAddress`] for an unparsable listen address
/// and [`TelemetryError::MetricsInit`] if a recorder is already installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let mut builder = PrometheusBuilder::new();
    if let Some(addr) = &config.listen_addr {
        let addr: SocketAddr = addr
            .parse()
            .map_err(|e| TelemetryError::InvalidAddress(format!("{addr}: {e}")))?;
        builder = builder.with_http_listener(addr);
    }

    let handle = builder
        .install_recorder()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    let _ = METRICS_HANDLE.set(handle);

    describe_metrics();
    Ok(())
}

/// Renders the current metrics in Prometheus text format.
///
/// Returns `None` if [`init_metrics`] has not installed a recorder.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

fn describe_metrics() {
    describe_counter!(DISPATCH_TOTAL, "Requests matched to a route, by lookup tier");
    describe_counter!(DISPATCH_MISS_TOTAL, "Requests that matched no route");
    describe_counter!(
        PHASE_SHORT_CIRCUIT_TOTAL,
        "Phases that finalized the response before the handler ran"
    );
    describe_counter!(
        EXECUTION_ERRORS_TOTAL,
        "Handler, middleware and policy failures caught during execution"
    );
    describe_gauge!(ROUTES_REGISTERED, "Routes currently registered");
}

/// Records a matched request.
pub fn record_dispatch(tier: &'static str) {
    counter!(DISPATCH_TOTAL, "tier" => tier).increment(1);
}

/// Records a request with no matching route.
pub fn record_miss() {
    counter!(DISPATCH_MISS_TOTAL).increment(1);
}

/// Records a phase that finalized the response.
pub fn record_short_circuit(phase: &'static str) {
    counter!(PHASE_SHORT_CIRCUIT_TOTAL, "phase" => phase).increment(1);
}

/// Records a caught failure. `source` is `handler`, `middleware` or a policy phase name.
pub fn record_execution_error(source: &'static str) {
    counter!(EXECUTION_ERRORS_TOTAL, "source" => source).increment(1);
}

/// Sets the registered route gauge.
pub fn set_routes_registered(count: usize) {
    gauge!(ROUTES_REGISTERED).set(count as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_disabled() {
        let config = MetricsConfig::default();
        assert!(!config.enabled);
        assert!(config.listen_addr.is_none());
        assert!(init_metrics(&config).is_ok());
    }

    #[test]
    fn test_invalid_address() {
        let config = MetricsConfig {
            enabled: true,
            listen_addr: Some("not-an-address".to_string()),
        };
        let err = init_metrics(&config).unwrap_err();
        assert!(matches!(err, TelemetryError::InvalidAddress(_)));
    }

    #[test]
    fn test_record_functions_without_recorder() {
        record_dispatch("fast");
        record_miss();
        record_short_circuit("rate_limit");
        record_execution_error("handler");
        set_routes_registered(3);
    }
}
