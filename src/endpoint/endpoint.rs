//! Resource Endpoint
//!
//! Per-request state machine: delegates each verb to the adapter in a fixed
//! order and turns the result into an [`Outcome`]. Every mutating request
//! persists exactly once, after the mutation succeeds and before the outcome
//! is produced.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::adapter::adapter::ResourceAdapter;
use crate::adapter::errors::{AdapterError, AdapterResult};
use crate::query::directives::{IgnoredCategories, QueryDirectives};
use crate::query::settings::QuerySettings;
use crate::resource::{Delta, Resource};

use super::outcome::{Outcome, Rejection};

/// Result of an endpoint request. Client errors are folded into
/// [`Outcome::Rejected`]; only server-side failures remain as `Err`.
pub type EndpointResult = AdapterResult<Outcome>;

/// Endpoint for one resource type
pub struct ResourceEndpoint<T: Resource> {
    adapter: ResourceAdapter<T>,
    settings: QuerySettings,
    ignored: IgnoredCategories,
}

impl<T: Resource> ResourceEndpoint<T> {
    pub fn new(adapter: ResourceAdapter<T>) -> Self {
        Self {
            adapter,
            settings: QuerySettings::default(),
            ignored: IgnoredCategories::none(),
        }
    }

    pub fn with_settings(mut self, settings: QuerySettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_ignored(mut self, ignored: IgnoredCategories) -> Self {
        self.ignored = ignored;
        self
    }

    /// Collection fetch
    pub async fn get_collection(&self, directives: Option<QueryDirectives>) -> EndpointResult {
        settle("get_collection", self.collection(directives).await)
    }

    /// Single fetch
    pub async fn get(&self, key: Option<T::Key>, directives: Option<QueryDirectives>) -> EndpointResult {
        settle("get", self.single(key, directives).await)
    }

    /// Delete: lookup, remove, persist. A zero-count removal is rejected and
    /// nothing is persisted.
    pub async fn delete(&self, key: Option<T::Key>) -> EndpointResult {
        settle("delete", self.remove(key).await)
    }

    /// Create: insert, persist
    pub async fn create(&self, entity: Option<T>) -> EndpointResult {
        settle("create", self.insert(entity).await)
    }

    /// Partial update: lookup, merge + update, persist
    pub async fn patch(&self, key: Option<T::Key>, delta: Option<Delta<T>>) -> EndpointResult {
        settle("patch", self.merge(key, delta).await)
    }

    /// Full replace: put, persist.
    ///
    /// A body without a key takes the addressed key; a body naming a
    /// different key is rejected.
    pub async fn put(&self, key: Option<T::Key>, entity: Option<T>) -> EndpointResult {
        settle("put", self.replace(key, entity).await)
    }

    async fn collection(&self, directives: Option<QueryDirectives>) -> AdapterResult<Outcome> {
        let page = self
            .adapter
            .get_collection(directives, &self.settings, self.ignored)
            .await?;
        Ok(Outcome::Accepted(to_body(&page)?))
    }

    async fn single(
        &self,
        key: Option<T::Key>,
        directives: Option<QueryDirectives>,
    ) -> AdapterResult<Outcome> {
        let shaped = self
            .adapter
            .get_single(key.as_ref(), directives, &self.settings, self.ignored)
            .await?;
        Ok(Outcome::Accepted(shaped.into_document()?))
    }

    async fn remove(&self, key: Option<T::Key>) -> AdapterResult<Outcome> {
        let entity = self
            .adapter
            .fetch(key.as_ref(), &self.settings, self.ignored)
            .await?;

        let affected = self.adapter.remove(Some(&entity)).await?;
        if affected == 0 {
            return Err(AdapterError::zero_affected(format!(
                "delete of {} affected no rows",
                display_key(&entity)
            )));
        }

        self.adapter.persist().await?;
        info!(key = %display_key(&entity), "entity deleted");
        Ok(Outcome::AcceptedEmpty)
    }

    async fn insert(&self, entity: Option<T>) -> AdapterResult<Outcome> {
        let created = self.adapter.insert(entity).await?;
        self.adapter.persist().await?;
        info!(key = %display_key(&created), "entity created");
        Ok(Outcome::Created(document(&created)?))
    }

    async fn merge(&self, key: Option<T::Key>, delta: Option<Delta<T>>) -> AdapterResult<Outcome> {
        let current = self
            .adapter
            .fetch(key.as_ref(), &self.settings, self.ignored)
            .await?;

        let updated = self.adapter.patch(Some(current), delta.as_ref()).await?;
        self.adapter.persist().await?;
        info!(key = %display_key(&updated), "entity patched");
        Ok(Outcome::Updated(document(&updated)?))
    }

    async fn replace(&self, key: Option<T::Key>, entity: Option<T>) -> AdapterResult<Outcome> {
        let key = key.ok_or_else(|| AdapterError::invalid_argument("key is required"))?;
        let entity = match entity {
            Some(entity) => match entity.key() {
                Some(body_key) if body_key != key => {
                    return Err(AdapterError::invalid_argument(format!(
                        "body key {} does not match addressed key {}",
                        body_key, key
                    )));
                }
                _ => Some(entity.with_key(key)),
            },
            None => None,
        };

        let updated = self.adapter.put(entity).await?;
        self.adapter.persist().await?;
        info!(key = %display_key(&updated), "entity replaced");
        Ok(Outcome::Updated(document(&updated)?))
    }
}

/// Fold client errors into a rejection outcome
fn settle(operation: &'static str, result: AdapterResult<Outcome>) -> EndpointResult {
    match result {
        Ok(outcome) => Ok(outcome),
        Err(err) => match Rejection::try_from(err) {
            Ok(rejection) => {
                debug!(operation, reason = rejection.message(), "request rejected");
                Ok(Outcome::Rejected(rejection))
            }
            Err(err) => {
                warn!(operation, error = %err, "request failed");
                Err(err)
            }
        },
    }
}

fn to_body(value: &impl Serialize) -> AdapterResult<Value> {
    serde_json::to_value(value).map_err(|e| AdapterError::encoding(e.to_string()))
}

fn document<T: Resource>(entity: &T) -> AdapterResult<Value> {
    entity
        .to_document()
        .map_err(|e| AdapterError::encoding(e.to_string()))
}

fn display_key<T: Resource>(entity: &T) -> String {
    entity
        .key()
        .map(|k| k.to_string())
        .unwrap_or_else(|| "<unkeyed>".to_string())
}
