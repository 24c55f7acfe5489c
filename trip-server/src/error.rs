use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures surfaced to HTTP callers.
///
/// Upstream and configuration details stay in the logs; the browser only sees
/// a generic message for 5xx responses.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("signature invalid: {0}")]
    SignatureInvalid(String),
    #[error("{0}")]
    NotFound(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) | ApiError::SignatureInvalid(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::UpstreamUnavailable(_) | ApiError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn public_message(&self) -> String {
        match self {
            ApiError::InvalidRequest(hint) => hint.clone(),
            ApiError::NotFound(message) => message.clone(),
            ApiError::SignatureInvalid(_) => "Webhook Error: signature verification failed".to_string(),
            ApiError::UpstreamUnavailable(_) | ApiError::Config(_) => {
                "Something went wrong on our side. Please try again.".to_string()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}
