//! Router and handlers for the route service.
//!
//! # Endpoints
//!
//! - `/route?loc=lon,lat&...&start=lon,lat[&end=lon,lat][&includeGeometry=true]`:
//!   run the optimizer and return its JSON unchanged
//! - `/error`: always `400 {"error":"Bad request"}`
//! - `GET /metrics`: Prometheus exposition
//! - `GET /health/live`, `GET /health/ready`: probes
//!
//! Any other path is answered like `/error`.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::{any, get},
    Extension, Router,
};
use tracing::{info, warn};

use vroomapi_lib::Error as LibError;
use vroomapi_service_shared::{
    health_live, health_ready, metrics_handler, record_jobs_per_request,
    record_optimization_completed, record_optimization_failed, record_optimizer_duration,
    route_query_from_params, AppState, MetricsLayer, OptimizerResponse, RequestError, RequestId,
    BAD_REQUEST_MESSAGE,
};

/// Build the service router around shared state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/route", any(route_handler))
        .route("/error", any(bad_request))
        .route("/metrics", get(metrics_handler))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .fallback(bad_request)
        .layer(MetricsLayer)
        .with_state(state)
}

/// Handle `/route`, whatever the method.
async fn route_handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<OptimizerResponse, RequestError> {
    let mode = state.optimizer().mode().as_str();

    let Query(params) = query.map_err(|rejection| {
        warn!(request_id = %request_id, error = %rejection, "undecodable query string");
        record_optimization_failed("invalid_parameter", mode);
        RequestError::bad_request(rejection.body_text())
    })?;

    let route_query = route_query_from_params(&params).map_err(|e| failed(&request_id, mode, e))?;

    info!(
        request_id = %request_id,
        locations = route_query.locations.len(),
        start = %route_query.start,
        end = route_query.end.as_deref().unwrap_or("-"),
        include_geometry = route_query.include_geometry,
        "handling route request"
    );

    let solution = state
        .optimizer()
        .solve(&route_query)
        .await
        .map_err(|e| failed(&request_id, mode, e))?;

    record_optimization_completed(mode);
    record_optimizer_duration(solution.elapsed.as_secs_f64(), mode);
    record_jobs_per_request(route_query.locations.len());

    info!(
        request_id = %request_id,
        run_id = solution.run_id,
        bytes = solution.body.len(),
        "route computed"
    );

    Ok(OptimizerResponse::from(solution))
}

fn failed(request_id: &RequestId, mode: &'static str, error: LibError) -> RequestError {
    if error.is_validation() {
        info!(request_id = %request_id, error = %error, "rejected route request");
    } else {
        warn!(request_id = %request_id, error = %error, "route request failed");
    }
    record_optimization_failed(error.reason(), mode);
    RequestError::from(error)
}

/// Fixed 400 for `/error` and unknown paths.
async fn bad_request() -> RequestError {
    RequestError::bad_request(BAD_REQUEST_MESSAGE)
}
