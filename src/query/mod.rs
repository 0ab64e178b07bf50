//! Query-string feature pipeline: filter, sort, projection, pagination

pub mod features;
pub mod limits;

pub use features::{
    Comparison, Direction, FieldFilter, FilterValue, QueryFeatures, QuerySpec, SortKey,
};
pub use limits::PageLimits;

use thiserror::Error;

/// Rejection raised while translating raw query parameters
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Unknown field in query: {0}")]
    UnknownField(String),

    #[error("Unknown filter operator: {0}")]
    UnknownOperator(String),

    #[error("Invalid value for `{0}`: expected a positive integer")]
    InvalidNumber(&'static str),
}
