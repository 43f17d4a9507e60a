use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::jobs::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    /// A precondition failed before any collaborator was contacted.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The generation engine is overloaded or unavailable; worth retrying later.
    #[error("Generation temporarily unavailable: {0}")]
    TransientGeneration(String),

    #[error("Generation error: {0}")]
    Generation(String),

    /// AI output did not match the expected document shape.
    #[error("Malformed content: {0}")]
    MalformedContent(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Store(_) => "STORE_ERROR",
            AppError::TransientGeneration(_) => "GENERATION_UNAVAILABLE",
            AppError::Generation(_) => "GENERATION_ERROR",
            AppError::MalformedContent(_) => "MALFORMED_CONTENT",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::TransientGeneration(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Generation(_) => StatusCode::BAD_GATEWAY,
            AppError::MalformedContent(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl AppError {
    /// Status and JSON body, with server-side failures logged and masked.
    pub fn into_parts(self) -> (StatusCode, serde_json::Value) {
        let message = match &self {
            AppError::Validation(msg)
            | AppError::TransientGeneration(msg)
            | AppError::Generation(msg)
            | AppError::MalformedContent(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => msg.clone(),
            AppError::Store(e) => {
                tracing::error!("Store error: {e}");
                "A storage error occurred".to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An internal server error occurred".to_string()
            }
        };

        let body = json!({
            "error": {
                "code": self.code(),
                "message": message
            }
        });

        (self.status(), body)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.into_parts();
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_and_permanent_generation_errors_map_to_distinct_statuses() {
        let transient = AppError::TransientGeneration("busy".to_string());
        let permanent = AppError::Generation("bad key".to_string());
        assert_eq!(transient.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(permanent.status(), StatusCode::BAD_GATEWAY);
        assert_ne!(transient.code(), permanent.code());
    }

    #[test]
    fn test_missing_record_is_not_found() {
        let err = AppError::from(StoreError::NotFound(uuid::Uuid::nil()));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
