use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::ErrorBody;
use models::ModelError;
use service::ServiceError;
use thiserror::Error;
use tracing::error;

/// Handler error rendered as `{"error": "<message>"}` with its status code.
#[derive(Debug, Error)]
#[error("{status}: {message}")]
pub struct JsonApiError {
    pub status: StatusCode,
    pub message: String,
}

impl JsonApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not found")
    }

    pub fn not_a_json() -> Self {
        Self::bad_request("Not a JSON")
    }

    pub fn missing(field: &str) -> Self {
        Self::bad_request(format!("Missing {field}"))
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::NotFound(_) => Self::not_found(),
            ServiceError::Conflict(msg) => Self::new(StatusCode::CONFLICT, msg),
            ServiceError::Model(inner) => inner.into(),
            ServiceError::Persistence(_) | ServiceError::Internal(_) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        }
    }
}

impl From<ModelError> for JsonApiError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::MissingField(_) | ModelError::Validation(_) | ModelError::UnknownField(_) => {
                Self::bad_request(e.to_string())
            }
            ModelError::Decode(_) | ModelError::Hash(_) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, error = %self.message, "request failed");
        }
        (self.status, Json(ErrorBody::new(self.message))).into_response()
    }
}
