//! HTTP error type: a status plus a message, rendered as `{"error": "..."}`.

use analytics::AnalyticsError;
use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use inbox_engine::{EngineError, IngestError};
use tracing::error;

#[derive(Debug)]
pub struct ApiError(pub StatusCode, pub String);

impl ApiError {
    pub fn unauthorized() -> Self {
        ApiError(StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError(StatusCode::BAD_REQUEST, msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError(StatusCode::INTERNAL_SERVER_ERROR, msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(serde_json::json!({ "error": self.1 }))).into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Unauthorized => ApiError::unauthorized(),
            EngineError::Forbidden(msg) => ApiError(StatusCode::FORBIDDEN, msg),
            EngineError::Validation(msg) => ApiError::bad_request(msg),
            e @ EngineError::UnsupportedChannel(_) => ApiError::bad_request(e.to_string()),
            EngineError::NotFound(msg) => ApiError(StatusCode::NOT_FOUND, msg),
            EngineError::DispatchFailed { message, source } => {
                error!(message_id = %message.id, error = %source, "Send failed");
                ApiError::internal(format!("Failed to send message: {}", source))
            }
            EngineError::Storage(e) => {
                error!(error = %e, "Storage failure");
                ApiError::internal("Internal server error")
            }
        }
    }
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        error!(error = %err, "Webhook ingestion failed");
        ApiError::internal("Internal server error")
    }
}

impl From<AnalyticsError> for ApiError {
    fn from(err: AnalyticsError) -> Self {
        error!(error = %err, "Analytics failed");
        ApiError::internal("Failed to fetch analytics")
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

/// Unparseable provider callbacks are answered with 500 so the provider retries.
impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        error!(error = %rejection.body_text(), "Webhook payload rejected");
        ApiError::internal("Malformed webhook payload")
    }
}
