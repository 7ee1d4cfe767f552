//! # Adapter Errors
//!
//! Error taxonomy of the resource adapter. Local validation failures never
//! reach the store; store failures pass through unchanged.

use thiserror::Error;

use crate::query::errors::QueryError;

use super::store::StoreError;

/// Result type for adapter operations
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Resource adapter errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    // ==================
    // Client Errors
    // ==================
    /// A required value (key, entity, delta, base query) was missing or unusable
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Key lookup found nothing in the scoped base query
    #[error("Not found: {0}")]
    NotFound(String),

    /// The entity was located but deleting it affected nothing
    #[error("No rows affected: {0}")]
    ZeroAffected(String),

    // ==================
    // Server Errors
    // ==================
    /// An entity could not be converted to or from its document form
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Store-originated failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AdapterError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn zero_affected(msg: impl Into<String>) -> Self {
        Self::ZeroAffected(msg.into())
    }

    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Whether the caller, not the server, is at fault
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument(_) | Self::NotFound(_) | Self::ZeroAffected(_)
        )
    }

    /// Get error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::ZeroAffected(_) => "ZERO_AFFECTED",
            Self::Encoding(_) => "ENCODING_ERROR",
            Self::Store(e) => e.code(),
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidArgument(_) | Self::ZeroAffected(_) => 400,
            Self::NotFound(_) => 404,
            Self::Encoding(_) => 500,
            Self::Store(e) => e.status_code(),
        }
    }
}

impl From<QueryError> for AdapterError {
    fn from(e: QueryError) -> Self {
        Self::InvalidArgument(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        assert!(AdapterError::invalid_argument("key").is_client_error());
        assert!(AdapterError::not_found("k1").is_client_error());
        assert!(AdapterError::zero_affected("k1").is_client_error());
        assert!(!AdapterError::encoding("bad").is_client_error());
        assert!(!AdapterError::from(StoreError::timeout("slow")).is_client_error());
    }

    #[test]
    fn test_store_error_is_transparent() {
        let err = AdapterError::from(StoreError::constraint("fk_orders"));
        assert_eq!(err.to_string(), StoreError::constraint("fk_orders").to_string());
        assert_eq!(err.code(), "STORE_CONSTRAINT");
    }

    #[test]
    fn test_query_error_is_invalid_argument() {
        let err = AdapterError::from(QueryError::InvalidParam("top".to_string()));
        assert!(matches!(err, AdapterError::InvalidArgument(_)));
    }
}
