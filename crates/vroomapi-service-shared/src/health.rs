//! Liveness and readiness probes.
//!
//! Readiness depends on the optimizer binary: it must exist and be
//! executable, otherwise every `/route` request would fail.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// `ok`, or `not_ready: <reason>`.
    pub status: String,
    pub service: String,
    pub version: String,
    pub checked_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub binary: Option<String>,
}

impl HealthStatus {
    pub fn alive(service: &str, version: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            checked_at: Utc::now(),
            mode: None,
            binary: None,
        }
    }

    /// Attach the optimizer settings being probed.
    pub fn with_optimizer(mut self, state: &AppState) -> Self {
        self.mode = Some(state.optimizer().mode().to_string());
        self.binary = Some(state.optimizer().binary_path().display().to_string());
        self
    }

    pub fn not_ready(service: &str, version: &str, reason: &str) -> Self {
        Self {
            status: format!("not_ready: {reason}"),
            ..Self::alive(service, version)
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// `GET /health/live`: 200 while the process is serving.
pub async fn health_live() -> impl IntoResponse {
    let status = HealthStatus::alive(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    (StatusCode::OK, Json(status))
}

/// `GET /health/ready`: 200 when the binary is usable, 503 otherwise.
///
/// ```text
/// {"status":"ok","service":"vroomapi-service-shared","version":"0.1.0",
///  "checked_at":"2026-01-05T09:12:44Z","mode":"file","binary":"/usr/local/bin/vroom"}
/// ```
pub async fn health_ready(State(state): State<AppState>) -> Response {
    let service = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");

    match state.optimizer().check_binary() {
        Ok(()) => {
            let status = HealthStatus::alive(service, version).with_optimizer(&state);
            (StatusCode::OK, Json(status)).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            let status =
                HealthStatus::not_ready(service, version, &e.to_string()).with_optimizer(&state);
            (StatusCode::SERVICE_UNAVAILABLE, Json(status)).into_response()
        }
    }
}
