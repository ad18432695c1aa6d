//! Mapping of library errors onto HTTP responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use libcrosspost::CrosspostError;
use serde_json::json;
use tracing::error;

#[derive(Debug)]
pub enum ApiError {
    /// No valid session
    Unauthorized,
    /// Malformed request that never reached the services
    BadRequest(String),
    /// Anything the library reported
    Core(CrosspostError),
}

impl From<CrosspostError> for ApiError {
    fn from(err: CrosspostError) -> Self {
        ApiError::Core(err)
    }
}

impl ApiError {
    fn status_and_message(self) -> (StatusCode, String) {
        match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Core(err) if err.is_client_error() => {
                let status = match &err {
                    CrosspostError::Forbidden(_) => StatusCode::FORBIDDEN,
                    CrosspostError::NotFound(_) => StatusCode::NOT_FOUND,
                    _ => StatusCode::BAD_REQUEST,
                };
                (status, err.to_string())
            }
            ApiError::Core(err) => {
                error!(error = %err, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        (status, Json(json!({ "message": message }))).into_response()
    }
}
