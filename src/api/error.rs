//! HTTP error responses

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::Error;

/// Generic message for faults whose detail stays in the server log
const INTERNAL_ERROR: &str = "internal server error";

/// API error, rendered as `{"error": "..."}`
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let kind = err.kind();

        let (status, message) = match &err {
            Error::InvalidRequest(reason) => {
                tracing::debug!(kind, reason, "rejected request");
                (StatusCode::BAD_REQUEST, (*reason).to_string())
            }
            Error::ProviderUnconfigured(provider) => {
                tracing::error!(kind, provider, "speech provider not configured");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Text-to-speech is not configured ({provider})"),
                )
            }
            Error::ProviderFailure { provider, status, .. } => {
                tracing::warn!(kind, provider, status, error = %err, "speech provider failed");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            _ => {
                tracing::error!(kind, error = %err, "unhandled failure");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR.to_string())
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
