//! # Endpoint Outcomes
//!
//! Protocol-neutral result categories of one endpoint request.

use serde_json::Value;

use crate::adapter::errors::AdapterError;

/// Outcome of one endpoint request
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Accepted, with a body
    Accepted(Value),

    /// Accepted, no body
    AcceptedEmpty,

    /// Created, with the stored entity
    Created(Value),

    /// Updated, with the stored entity
    Updated(Value),

    /// Client error
    Rejected(Rejection),
}

impl Outcome {
    pub fn body(&self) -> Option<&Value> {
        match self {
            Outcome::Accepted(body) | Outcome::Created(body) | Outcome::Updated(body) => Some(body),
            Outcome::AcceptedEmpty | Outcome::Rejected(_) => None,
        }
    }
}

/// Client-error categories an endpoint reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    InvalidArgument(String),
    NotFound(String),
    ZeroAffected(String),
}

impl Rejection {
    pub fn message(&self) -> &str {
        match self {
            Rejection::InvalidArgument(msg)
            | Rejection::NotFound(msg)
            | Rejection::ZeroAffected(msg) => msg,
        }
    }

    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            Rejection::InvalidArgument(_) | Rejection::ZeroAffected(_) => 400,
            Rejection::NotFound(_) => 404,
        }
    }
}

impl TryFrom<AdapterError> for Rejection {
    /// Server-side errors are handed back unchanged
    type Error = AdapterError;

    fn try_from(err: AdapterError) -> Result<Self, Self::Error> {
        match err {
            AdapterError::InvalidArgument(msg) => Ok(Rejection::InvalidArgument(msg)),
            AdapterError::NotFound(msg) => Ok(Rejection::NotFound(msg)),
            AdapterError::ZeroAffected(msg) => Ok(Rejection::ZeroAffected(msg)),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::store::StoreError;

    #[test]
    fn test_client_errors_become_rejections() {
        let rejection = Rejection::try_from(AdapterError::not_found("k")).unwrap();
        assert_eq!(rejection, Rejection::NotFound("k".to_string()));
        assert_eq!(rejection.status_code(), 404);

        let rejection = Rejection::try_from(AdapterError::zero_affected("k")).unwrap();
        assert_eq!(rejection.status_code(), 400);
    }

    #[test]
    fn test_server_errors_pass_through() {
        let err = AdapterError::from(StoreError::timeout("slow"));
        assert_eq!(Rejection::try_from(err.clone()), Err(err));
    }
}
