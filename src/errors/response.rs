use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::codes::ErrorCode;

/// Structured error response
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// "fail" for 4xx responses, "error" for 5xx
    pub status: &'static str,
    /// Error details
    pub error: ErrorDetail,
}

/// Error details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Request ID for tracing
    pub request_id: String,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status: code.status_word(),
            error: ErrorDetail {
                code,
                message: message.into(),
                request_id: Uuid::new_v4().to_string(),
            },
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.error.code.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(self)).into_response()
    }
}

/// Helpers for common errors
impl ErrorResponse {
    pub fn not_found(resource: &str) -> Self {
        Self::new(
            ErrorCode::NotFound,
            format!("No {} found with that ID", resource),
        )
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidQuery, message)
    }

    pub fn database_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_serialization() {
        let err = ErrorResponse::new(ErrorCode::InvalidQuery, "Test error");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("INVALID_QUERY"));
        assert!(json.contains("Test error"));
        assert!(json.contains("request_id"));
        assert!(json.contains("\"status\":\"fail\""));
    }

    #[test]
    fn test_helper_methods() {
        let err = ErrorResponse::not_found("tour");
        assert_eq!(err.error.code, ErrorCode::NotFound);
        assert!(err.error.message.contains("tour"));
    }

    #[test]
    fn test_error_code_status_codes() {
        assert_eq!(ErrorCode::NotFound.status_code(), 404);
        assert_eq!(ErrorCode::ValidationError.status_code(), 400);
        assert_eq!(ErrorCode::InvalidQuery.status_code(), 400);
        assert_eq!(ErrorCode::Unauthorized.status_code(), 401);
        assert_eq!(ErrorCode::Forbidden.status_code(), 403);
        assert_eq!(ErrorCode::DatabaseError.status_code(), 503);
        assert_eq!(ErrorCode::InternalError.status_code(), 500);
    }

    #[test]
    fn test_status_word() {
        assert_eq!(ErrorCode::NotFound.status_word(), "fail");
        assert_eq!(ErrorCode::ValidationError.status_word(), "fail");
        assert_eq!(ErrorCode::DatabaseError.status_word(), "error");
        assert_eq!(ErrorCode::InternalError.status_word(), "error");
    }

    #[test]
    fn test_into_response_status_not_found() {
        let error = ErrorResponse::not_found("review");
        let response = error.into_response();
        assert_eq!(response.status(), axum::http::StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_into_response_status_validation_error() {
        let error = ErrorResponse::validation_error("Invalid input");
        let response = error.into_response();
        assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_into_response_status_service_unavailable() {
        let error = ErrorResponse::database_error("Database connection failed");
        let response = error.into_response();
        assert_eq!(
            response.status(),
            axum::http::StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
