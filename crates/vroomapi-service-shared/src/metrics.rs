//! Prometheus metrics for the route service.
//!
//! HTTP-level series are recorded by [`crate::MetricsLayer`]. The helpers at
//! the bottom of this module record optimizer-level series:
//!
//! - `vroomapi_optimizations_total{mode}`
//! - `vroomapi_optimizations_failed_total{reason,mode}`
//! - `vroomapi_optimizer_duration_seconds{mode}`
//! - `vroomapi_jobs_per_request`
//!
//! ```no_run
//! use axum::{routing::get, Router};
//! use vroomapi_service_shared::metrics::{init_metrics, metrics_handler, MetricsConfig};
//!
//! if let Err(e) = init_metrics(&MetricsConfig::from_env()) {
//!     eprintln!("metrics disabled: {e}");
//! }
//! let app: Router = Router::new().route("/metrics", get(metrics_handler));
//! ```

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::config::parse_bool;

static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Exposition is always served at `/metrics`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl MetricsConfig {
    /// Read `METRICS_ENABLED` (default true).
    pub fn from_env() -> Self {
        let enabled = std::env::var("METRICS_ENABLED")
            .ok()
            .and_then(|v| parse_bool(&v))
            .unwrap_or(true);

        Self { enabled }
    }
}

/// Install the global Prometheus recorder.
///
/// # Errors
///
/// Fails when metrics are disabled, when a recorder is already installed, or
/// when the exporter cannot be built.
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    if !config.enabled {
        return Err(MetricsError::Disabled);
    }
    if PROMETHEUS_HANDLE.get().is_some() {
        return Err(MetricsError::AlreadyInitialized);
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| MetricsError::InstallFailed(e.to_string()))?;

    PROMETHEUS_HANDLE
        .set(handle)
        .map_err(|_| MetricsError::AlreadyInitialized)
}

pub fn prometheus_handle() -> Option<&'static PrometheusHandle> {
    PROMETHEUS_HANDLE.get()
}

/// Render the Prometheus exposition text.
pub async fn metrics_handler() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(|h| h.render())
        .unwrap_or_else(|| "# Metrics not initialized\n".to_string())
}

#[derive(Debug, Clone)]
pub enum MetricsError {
    Disabled,
    AlreadyInitialized,
    InstallFailed(String),
}

impl std::fmt::Display for MetricsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricsError::Disabled => write!(f, "metrics are disabled"),
            MetricsError::AlreadyInitialized => write!(f, "metrics recorder already initialized"),
            MetricsError::InstallFailed(e) => write!(f, "failed to install metrics recorder: {e}"),
        }
    }
}

impl std::error::Error for MetricsError {}

// =============================================================================
// Optimizer metrics
// =============================================================================

/// Count a run that produced a solution.
pub fn record_optimization_completed(mode: &'static str) {
    metrics::counter!("vroomapi_optimizations_total", "mode" => mode).increment(1);
}

/// Count a failed query.
///
/// `reason` comes from `vroomapi_lib::Error::reason`, so validation failures
/// that never reach the binary are counted here as well.
pub fn record_optimization_failed(reason: &'static str, mode: &'static str) {
    metrics::counter!(
        "vroomapi_optimizations_failed_total",
        "reason" => reason,
        "mode" => mode
    )
    .increment(1);
}

/// Wall time spent in the optimizer process.
pub fn record_optimizer_duration(seconds: f64, mode: &'static str) {
    metrics::histogram!("vroomapi_optimizer_duration_seconds", "mode" => mode).record(seconds);
}

pub fn record_jobs_per_request(count: usize) {
    metrics::histogram!("vroomapi_jobs_per_request").record(count as f64);
}
