/// Unified error types for the Global Insight Series API
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the API
#[derive(Error, Debug)]
pub enum ApiError {
    /// Database errors
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Bad or missing request fields, disallowed file types
    #[error("{0}")]
    Validation(String),

    /// Uploads over the size ceiling
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Unknown resource id
    #[error("{0} not found")]
    NotFound(String),

    /// Missing credentials or bearer token
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Invalid or expired token
    #[error("not authorized: {0}")]
    Authorization(String),

    /// Asset store failures
    #[error("asset storage error: {0}")]
    AssetStorage(String),

    /// IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server errors
    #[error("internal error: {0}")]
    Internal(String),
}

/// Uniform JSON error envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Convert ApiError to an HTTP response
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ApiError::Authorization(_) => StatusCode::FORBIDDEN,
            ApiError::Database(_)
            | ApiError::AssetStorage(_)
            | ApiError::Io(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("request failed: {}", self);
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (
                ApiError::PayloadTooLarge("big".into()),
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (ApiError::NotFound("event 1".into()), StatusCode::NOT_FOUND),
            (
                ApiError::Authentication("no header".into()),
                StatusCode::UNAUTHORIZED,
            ),
            (
                ApiError::Authorization("bad token".into()),
                StatusCode::FORBIDDEN,
            ),
            (
                ApiError::Internal("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_not_found_message() {
        let error = ApiError::NotFound("event 42".to_string());
        assert_eq!(error.to_string(), "event 42 not found");
    }
}
