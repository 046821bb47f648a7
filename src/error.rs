//! Failure taxonomy for backend calls and the gateway's error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Classified failure while talking to a backend.
///
/// Non-2xx responses *from* a backend are deliberately not represented
/// here: the gateway relays them verbatim. `UnexpectedStatus` exists only
/// for aggregation calls that assume a 200 catalog response.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("backend unreachable: {0}")]
    Unreachable(String),

    #[error("backend timed out: {0}")]
    Timeout(String),

    #[error("backend returned status {0}")]
    UnexpectedStatus(u16),

    #[error("malformed backend response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            BackendError::Timeout(e.to_string())
        } else if e.is_decode() {
            BackendError::Malformed(e.to_string())
        } else {
            // Connect failures, DNS failures, and any other transport fault
            BackendError::Unreachable(e.to_string())
        }
    }
}

/// Error surface of the gateway's own HTTP handlers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Inbound body unparsable as the required shape; rejected before any
    /// backend call is attempted
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Transport-level failure during a proxying call
    #[error(transparent)]
    Upstream(#[from] BackendError),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request_error"),
            ApiError::Upstream(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let body = json!({
            "error": {
                "message": self.to_string(),
                "type": kind,
            }
        });

        (status, Json(body)).into_response()
    }
}
