//! Shared infrastructure for the vroomapi HTTP microservice.
//!
//! - [`AppState`]: the configured optimizer shared by all handlers
//! - [`ServiceConfig`]: environment-driven settings
//! - [`RequestError`]: the `{"error": "..."}` body used for every failure
//! - [`OptimizerResponse`]: the optimizer's JSON, passed through untouched
//! - [`route_query_from_params`]: query-string decoding for `/route`
//! - [`health`], [`metrics`], [`logging`], [`middleware`]: operational glue
//!
//! Handlers stay thin; everything about coordinates, request building and
//! process handling lives in `vroomapi-lib`:
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │  axum handler                              │
//! │  - decode query pairs                      │
//! │  - Optimizer::solve (vroomapi-lib)         │
//! │  - OptimizerResponse or RequestError       │
//! └────────────────────────────────────────────┘
//! ```
//!
//! With the `test-utils` feature, [`test_utils`] provides fake optimizer
//! scripts for handler tests.

mod config;
mod error;
mod health;
pub mod logging;
pub mod metrics;
pub mod middleware;
mod request;
mod response;
mod state;

#[cfg(all(unix, any(test, feature = "test-utils")))]
pub mod test_utils;

pub use config::{parse_bool, ServiceConfig, DEFAULT_PORT};
pub use error::{from_lib_error, RequestError, BAD_REQUEST_MESSAGE};
pub use health::{health_live, health_ready, HealthStatus};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use metrics::{
    init_metrics, metrics_handler, record_jobs_per_request, record_optimization_completed,
    record_optimization_failed, record_optimizer_duration, MetricsConfig, MetricsError,
};
pub use middleware::{extract_or_generate_request_id, MetricsLayer, RequestId, REQUEST_ID_HEADER};
pub use request::{
    route_query_from_params, PARAM_END, PARAM_INCLUDE_GEOMETRY, PARAM_LOC, PARAM_START,
};
pub use response::OptimizerResponse;
pub use state::AppState;
