use serde::{Deserialize, Serialize};
use std::fmt;

/// Error codes for structured API responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Identifier has no matching record
    #[serde(rename = "NOT_FOUND")]
    NotFound,

    /// Schema constraint violation on create/update
    #[serde(rename = "VALIDATION_ERROR")]
    ValidationError,

    /// Malformed query-string parameters (bad control values, unknown fields)
    #[serde(rename = "INVALID_QUERY")]
    InvalidQuery,

    /// Authentication required or failed
    #[serde(rename = "UNAUTHORIZED")]
    Unauthorized,

    /// Authenticated but not allowed
    #[serde(rename = "FORBIDDEN")]
    Forbidden,

    /// Database connection or query error
    #[serde(rename = "DATABASE_ERROR")]
    DatabaseError,

    /// Internal server error
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::ValidationError => write!(f, "VALIDATION_ERROR"),
            Self::InvalidQuery => write!(f, "INVALID_QUERY"),
            Self::Unauthorized => write!(f, "UNAUTHORIZED"),
            Self::Forbidden => write!(f, "FORBIDDEN"),
            Self::DatabaseError => write!(f, "DATABASE_ERROR"),
            Self::InternalError => write!(f, "INTERNAL_ERROR"),
        }
    }
}

impl ErrorCode {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::ValidationError => 400,
            Self::InvalidQuery => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::DatabaseError => 503,
            Self::InternalError => 500,
        }
    }

    /// Response status vocabulary: "fail" for client errors, "error" otherwise
    pub fn status_word(&self) -> &'static str {
        if (400..500).contains(&self.status_code()) {
            "fail"
        } else {
            "error"
        }
    }
}
