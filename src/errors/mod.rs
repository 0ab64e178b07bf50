//! Structured error handling for API responses

pub mod codes;
pub mod response;

pub use codes::ErrorCode;
pub use response::{ErrorDetail, ErrorResponse};

use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::query::QueryError;
use crate::store::StoreError;

/// The single failure signal raised by handlers. Every failure path funnels
/// through this type; its `IntoResponse` impl translates it into an HTTP
/// status and structured body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No {0} found with that ID")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("You are not logged in! Please log in to get access.")]
    Unauthorized,

    #[error("You do not have permission to perform this action")]
    Forbidden,

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::Validation(_) => ErrorCode::ValidationError,
            Self::Unauthorized => ErrorCode::Unauthorized,
            Self::Forbidden => ErrorCode::Forbidden,
            Self::Query(_) => ErrorCode::InvalidQuery,
            Self::Store(err) => match err {
                StoreError::Validation(_) => ErrorCode::ValidationError,
                StoreError::Sqlite(_) | StoreError::Pool(_) => ErrorCode::DatabaseError,
                StoreError::Serialize(_) | StoreError::Join(_) => ErrorCode::InternalError,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.code();
        if code.status_code() >= 500 {
            tracing::error!(code = %code, "Request failed: {}", self);
        }
        ErrorResponse::new(code, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_codes() {
        assert_eq!(ApiError::NotFound("tour").code(), ErrorCode::NotFound);
        assert_eq!(
            ApiError::Validation("bad".into()).code(),
            ErrorCode::ValidationError
        );
        assert_eq!(ApiError::Unauthorized.code(), ErrorCode::Unauthorized);
        assert_eq!(ApiError::Forbidden.code(), ErrorCode::Forbidden);
        assert_eq!(
            ApiError::from(StoreError::Validation("dup".into())).code(),
            ErrorCode::ValidationError
        );
    }

    #[test]
    fn test_not_found_message_names_resource() {
        let err = ApiError::NotFound("review");
        assert_eq!(err.to_string(), "No review found with that ID");
    }
}
