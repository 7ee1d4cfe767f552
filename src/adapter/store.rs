//! Store seam: the store-specific operations the adapter orchestrates.

use async_trait::async_trait;
use thiserror::Error;

use crate::resource::{Queryable, Resource};

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures raised by a store. The core never retries or wraps them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Concurrent modification or duplicate identity
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The store refused the write (referential or check constraint)
    #[error("Constraint violated: {0}")]
    Constraint(String),

    /// The store did not answer in time
    #[error("Store timed out: {0}")]
    Timeout(String),

    /// Any other backend failure
    #[error("Store failure: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn constraint(msg: impl Into<String>) -> Self {
        Self::Constraint(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Conflict(_) => "STORE_CONFLICT",
            Self::Constraint(_) => "STORE_CONSTRAINT",
            Self::Timeout(_) => "STORE_TIMEOUT",
            Self::Backend(_) => "STORE_FAILURE",
        }
    }

    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Conflict(_) | Self::Constraint(_) => 409,
            Self::Timeout(_) => 504,
            Self::Backend(_) => 500,
        }
    }
}

/// Store-specific operations behind a resource adapter.
///
/// Writes are buffered until [`ResourceStore::persist`]; the adapter decides
/// when each operation runs, the store decides how.
#[async_trait]
pub trait ResourceStore<T: Resource>: Send + Sync {
    /// The unrestricted base collection
    async fn queryable(&self) -> StoreResult<Queryable<T>>;

    /// Resolve `key` inside an already scoped base query
    async fn find_by_key(&self, key: &T::Key, query: Queryable<T>) -> StoreResult<Option<T>> {
        query
            .find(key)
            .map_err(|e| StoreError::backend(format!("undecodable entity: {}", e)))
    }

    /// Stage a new entity; returns it with generated members populated
    async fn create(&self, entity: T) -> StoreResult<T>;

    /// Stage a replacement of the stored entity with the same key
    async fn update(&self, entity: T) -> StoreResult<T>;

    /// Stage removal; returns the number of entities affected
    async fn delete(&self, entity: &T) -> StoreResult<usize>;

    /// Make staged writes durable
    async fn persist(&self) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(StoreError::conflict("dup").status_code(), 409);
        assert_eq!(StoreError::timeout("slow").status_code(), 504);
        assert_eq!(StoreError::backend("disk").status_code(), 500);
    }
}
