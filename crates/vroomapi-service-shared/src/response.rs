//! Successful `/route` responses.

use axum::response::{IntoResponse, Response};
use http::{header, HeaderValue, StatusCode};

use vroomapi_lib::Solution;

const APPLICATION_JSON: &str = "application/json";

/// The optimizer's JSON document, passed through unchanged.
///
/// The body is not re-serialized: in file mode it is the first line VROOM
/// wrote, byte for byte.
///
/// ```
/// use axum::response::IntoResponse;
/// use vroomapi_service_shared::OptimizerResponse;
///
/// let response = OptimizerResponse::new(r#"{"code":0}"#).into_response();
/// assert_eq!(response.status().as_u16(), 200);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizerResponse {
    pub body: String,
}

impl OptimizerResponse {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

impl From<Solution> for OptimizerResponse {
    fn from(solution: Solution) -> Self {
        Self::new(solution.body)
    }
}

impl IntoResponse for OptimizerResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON))],
            self.body,
        )
            .into_response()
    }
}
