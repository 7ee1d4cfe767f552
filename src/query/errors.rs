//! # Query Errors

use thiserror::Error;

/// Result type for query reading
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors raised while reading directives from request parameters
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Malformed directive parameter (`top`, `skip`, `order`, ...)
    #[error("Invalid query parameter: {0}")]
    InvalidParam(String),

    /// Malformed filter expression
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
}
