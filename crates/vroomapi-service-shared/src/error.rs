//! JSON error bodies returned to HTTP callers.
//!
//! Every failure, whatever its cause, is rendered as `{"error": "<message>"}`.
//! Callers tell validation failures apart from optimizer failures by the
//! status code alone.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use vroomapi_lib::{Error as LibError, ErrorKind};

/// Message returned by the `/error` route and for unknown paths.
pub const BAD_REQUEST_MESSAGE: &str = "Bad request";

/// The single error shape of the HTTP API.
///
/// # Example
///
/// ```
/// use vroomapi_service_shared::RequestError;
///
/// let error = RequestError::bad_request("Invalid coord: bad");
/// assert_eq!(error.status.as_u16(), 400);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestError {
    /// Human-readable description of what went wrong.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// HTTP status used when rendering; not part of the body.
    #[serde(skip, default = "default_status")]
    pub status: StatusCode,
}

fn default_status() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

impl RequestError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            status,
        }
    }

    /// 400 Bad Request for invalid input.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 500 Internal Server Error.
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// 502 Bad Gateway, for failures reported by the optimizer itself.
    pub fn optimizer_failed(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    /// 504 Gateway Timeout, for runs killed by the configured timeout.
    pub fn timed_out(message: impl Into<String>) -> Self {
        Self::new(StatusCode::GATEWAY_TIMEOUT, message)
    }
}

impl std::fmt::Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.status,
            self.error.as_deref().unwrap_or("")
        )
    }
}

impl std::error::Error for RequestError {}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let status = self.status;
        let mut response = Json(&self).into_response();
        *response.status_mut() = status;
        response
    }
}

/// Convert library errors to a [`RequestError`] with a matching status.
pub fn from_lib_error(error: &LibError) -> RequestError {
    let message = error.to_string();
    match error.kind() {
        ErrorKind::Validation => RequestError::bad_request(message),
        ErrorKind::Configuration => RequestError::internal_error(message),
        ErrorKind::Invocation => match error {
            LibError::Timeout { .. } => RequestError::timed_out(message),
            _ => RequestError::internal_error(message),
        },
        ErrorKind::Optimizer => RequestError::optimizer_failed(message),
    }
}

impl From<LibError> for RequestError {
    fn from(error: LibError) -> Self {
        from_lib_error(&error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;
    use vroomapi_lib::CoordinateRole;

    #[test]
    fn test_body_contains_only_error_field() {
        let json = serde_json::to_string(&RequestError::bad_request("Invalid coord: bad")).unwrap();
        assert_eq!(json, r#"{"error":"Invalid coord: bad"}"#);
    }

    #[test]
    fn test_absent_message_is_omitted() {
        let error = RequestError {
            error: None,
            status: StatusCode::BAD_REQUEST,
        };
        assert_eq!(serde_json::to_string(&error).unwrap(), "{}");
    }

    #[test]
    fn test_into_response_uses_status() {
        let response = RequestError::optimizer_failed("boom").into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            response.headers().get(axum::http::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn test_from_lib_error_validation() {
        let error = LibError::InvalidCoordinateFormat {
            role: CoordinateRole::Location,
            input: "bad".to_string(),
        };
        let request_error = from_lib_error(&error);

        assert_eq!(request_error.status, StatusCode::BAD_REQUEST);
        assert!(request_error.error.as_deref().unwrap().contains("bad"));
    }

    #[test]
    fn test_from_lib_error_configuration() {
        let error = LibError::BinaryUnavailable {
            path: PathBuf::from("/opt/vroom"),
        };
        assert_eq!(
            from_lib_error(&error).status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_from_lib_error_optimizer_and_timeout() {
        let reported = LibError::OptimizerReported {
            message: "no solution found".to_string(),
        };
        let request_error = from_lib_error(&reported);
        assert_eq!(request_error.status, StatusCode::BAD_GATEWAY);
        assert!(request_error
            .error
            .as_deref()
            .unwrap()
            .contains("no solution found"));

        let timeout = LibError::Timeout {
            timeout: Duration::from_secs(10),
        };
        assert_eq!(from_lib_error(&timeout).status, StatusCode::GATEWAY_TIMEOUT);
    }
}
