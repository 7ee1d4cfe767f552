//! # Resource HTTP Server
//!
//! Axum routes framing a [`ResourceEndpoint`] over HTTP.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use tower_http::trace::TraceLayer;

use crate::adapter::errors::{AdapterError, AdapterResult};
use crate::query::directives::QueryDirectives;
use crate::resource::{Delta, Resource};

use super::endpoint::ResourceEndpoint;
use super::outcome::{Outcome, Rejection};

/// Shared state type
type EndpointState<T> = Arc<ResourceEndpoint<T>>;

/// Build the router serving `endpoint` under `path`
pub fn resource_router<T: Resource>(endpoint: Arc<ResourceEndpoint<T>>, path: &str) -> Router {
    let path = path.trim_end_matches('/');
    let keyed = format!("{}/:key", path);
    let collection = if path.is_empty() { "/" } else { path };

    Router::new()
        .route(collection, get(list_handler::<T>).post(create_handler::<T>))
        .route(
            &keyed,
            get(get_handler::<T>)
                .patch(patch_handler::<T>)
                .put(put_handler::<T>)
                .delete(delete_handler::<T>),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(endpoint)
}

/// An empty query string means no directives at all
fn directives(params: &HashMap<String, String>) -> AdapterResult<Option<QueryDirectives>> {
    if params.is_empty() {
        return Ok(None);
    }
    Ok(Some(QueryDirectives::parse(params)?))
}

/// An empty body is an absent value
fn body_value(body: &Bytes) -> AdapterResult<Option<Value>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| AdapterError::invalid_argument(format!("Invalid request body: {}", e)))
}

fn entity<T: Resource>(body: &Bytes) -> AdapterResult<Option<T>> {
    body_value(body)?
        .map(|value| {
            T::from_document(value)
                .map_err(|e| AdapterError::invalid_argument(format!("Invalid entity: {}", e)))
        })
        .transpose()
}

/// List handler
async fn list_handler<T: Resource>(
    State(endpoint): State<EndpointState<T>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Outcome, AdapterError> {
    endpoint.get_collection(directives(&params)?).await
}

/// Single fetch handler
async fn get_handler<T: Resource>(
    State(endpoint): State<EndpointState<T>>,
    Path(key): Path<T::Key>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Outcome, AdapterError> {
    endpoint.get(Some(key), directives(&params)?).await
}

/// Create handler
async fn create_handler<T: Resource>(
    State(endpoint): State<EndpointState<T>>,
    body: Bytes,
) -> Result<Outcome, AdapterError> {
    endpoint.create(entity(&body)?).await
}

/// Partial update handler
async fn patch_handler<T: Resource>(
    State(endpoint): State<EndpointState<T>>,
    Path(key): Path<T::Key>,
    body: Bytes,
) -> Result<Outcome, AdapterError> {
    let delta = body_value(&body)?.map(Delta::from_value).transpose()?;
    endpoint.patch(Some(key), delta).await
}

/// Replace handler
async fn put_handler<T: Resource>(
    State(endpoint): State<EndpointState<T>>,
    Path(key): Path<T::Key>,
    body: Bytes,
) -> Result<Outcome, AdapterError> {
    endpoint.put(Some(key), entity(&body)?).await
}

/// Delete handler
async fn delete_handler<T: Resource>(
    State(endpoint): State<EndpointState<T>>,
    Path(key): Path<T::Key>,
) -> Result<Outcome, AdapterError> {
    endpoint.delete(Some(key)).await
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

fn error_response(code: u16, error: String) -> Response {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse { error, code })).into_response()
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        match self {
            Outcome::Accepted(body) => (StatusCode::ACCEPTED, Json(body)).into_response(),
            Outcome::AcceptedEmpty => StatusCode::ACCEPTED.into_response(),
            Outcome::Created(body) => (StatusCode::CREATED, Json(body)).into_response(),
            Outcome::Updated(body) => (StatusCode::OK, Json(body)).into_response(),
            Outcome::Rejected(rejection) => rejection.into_response(),
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        let code = self.status_code();
        let error = self.message().to_string();
        error_response(code, error)
    }
}

impl IntoResponse for AdapterError {
    fn into_response(self) -> Response {
        error_response(self.status_code(), self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::store::StoreError;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            Outcome::AcceptedEmpty.into_response().status(),
            StatusCode::ACCEPTED
        );
        assert_eq!(
            Outcome::Created(Value::Null).into_response().status(),
            StatusCode::CREATED
        );
        assert_eq!(
            Outcome::Rejected(Rejection::ZeroAffected("gone".to_string()))
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AdapterError::from(StoreError::conflict("x")).into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AdapterError::from(StoreError::timeout("x")).into_response().status(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn test_empty_query_is_no_directives() {
        assert_eq!(directives(&HashMap::new()).unwrap(), None);

        let params = HashMap::from([("$top".to_string(), "5".to_string())]);
        assert_eq!(directives(&params).unwrap().unwrap().top, Some(5));
    }

    #[test]
    fn test_body_decoding() {
        assert_eq!(body_value(&Bytes::from_static(b"  ")).unwrap(), None);
        assert!(matches!(
            body_value(&Bytes::from_static(b"{oops")),
            Err(AdapterError::InvalidArgument(_))
        ));
    }
}
