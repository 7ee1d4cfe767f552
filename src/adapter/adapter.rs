//! Resource Adapter
//!
//! Fixed orchestration of query application and CRUD against an injected
//! [`ResourceStore`]. The adapter decides when each store operation runs and
//! what happens with its result; the store decides how it is performed.

use std::sync::Arc;

use tracing::debug;

use crate::query::apply::{apply_to_collection, apply_to_entity, CollectionPage};
use crate::query::directives::{IgnoredCategories, QueryDirectives};
use crate::query::settings::QuerySettings;
use crate::resource::{Delta, Resource, Shaped};

use super::errors::{AdapterError, AdapterResult};
use super::scope::{Prepared, QueryScope, Unscoped};
use super::store::ResourceStore;

/// Mediates between endpoint requests and a store for one entity type
pub struct ResourceAdapter<T: Resource> {
    store: Arc<dyn ResourceStore<T>>,
    scope: Arc<dyn QueryScope<T>>,
}

impl<T: Resource> Clone for ResourceAdapter<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            scope: Arc::clone(&self.scope),
        }
    }
}

impl<T: Resource> ResourceAdapter<T> {
    /// Create an unscoped adapter over `store`
    pub fn new<S: ResourceStore<T> + 'static>(store: Arc<S>) -> Self {
        Self {
            store,
            scope: Arc::new(Unscoped),
        }
    }

    /// Replace the query scope
    pub fn with_scope(mut self, scope: impl QueryScope<T> + 'static) -> Self {
        self.scope = Arc::new(scope);
        self
    }

    /// Fetch the base collection and let the scope restrict it.
    ///
    /// Returns the directives, settings and ignored categories as adjusted by
    /// the scope; those are what the caller must apply.
    pub async fn prepare_query(
        &self,
        directives: Option<QueryDirectives>,
        settings: &QuerySettings,
        ignored: IgnoredCategories,
    ) -> AdapterResult<Prepared<T>> {
        let base = self.store.queryable().await?;

        Ok(self.scope.prepare(Prepared {
            directives,
            settings: settings.clone(),
            ignored,
            query: Some(base),
        }))
    }

    /// Apply a directive set to the scoped collection
    pub async fn get_collection(
        &self,
        directives: Option<QueryDirectives>,
        settings: &QuerySettings,
        ignored: IgnoredCategories,
    ) -> AdapterResult<CollectionPage> {
        let prepared = self.prepare_query(directives, settings, ignored).await?;
        let query = prepared
            .query
            .ok_or_else(|| AdapterError::invalid_argument("base query is absent"))?;

        let rows = query
            .documents()
            .map_err(|e| AdapterError::encoding(e.to_string()))?;
        let scanned = rows.len();

        let page = apply_to_collection(
            rows,
            prepared.directives.as_ref(),
            &prepared.settings,
            prepared.ignored,
            T::KEY_FIELD,
        );

        debug!(
            scanned,
            returned = page.len(),
            page_size = prepared.settings.page_size,
            "collection fetched"
        );
        Ok(page)
    }

    /// Look up one entity by key and shape it with the directive set.
    ///
    /// Only field selection applies to a single entity.
    pub async fn get_single(
        &self,
        key: Option<&T::Key>,
        directives: Option<QueryDirectives>,
        settings: &QuerySettings,
        ignored: IgnoredCategories,
    ) -> AdapterResult<Shaped<T>> {
        let (entity, prepared) = self.lookup(key, directives, settings, ignored).await?;

        match prepared.directives {
            Some(directives) => {
                let document = entity
                    .to_document()
                    .map_err(|e| AdapterError::encoding(e.to_string()))?;
                Ok(Shaped::Projected(apply_to_entity(
                    document,
                    &directives,
                    prepared.ignored,
                    T::KEY_FIELD,
                )))
            }
            None => Ok(Shaped::Entity(entity)),
        }
    }

    /// Directive-less single lookup returning the entity itself
    pub async fn fetch(
        &self,
        key: Option<&T::Key>,
        settings: &QuerySettings,
        ignored: IgnoredCategories,
    ) -> AdapterResult<T> {
        let (entity, _) = self.lookup(key, None, settings, ignored).await?;
        Ok(entity)
    }

    async fn lookup(
        &self,
        key: Option<&T::Key>,
        directives: Option<QueryDirectives>,
        settings: &QuerySettings,
        ignored: IgnoredCategories,
    ) -> AdapterResult<(T, Prepared<T>)> {
        let key = require_key::<T>(key)?;

        let mut prepared = self.prepare_query(directives, settings, ignored).await?;
        let query = prepared
            .query
            .take()
            .ok_or_else(|| AdapterError::invalid_argument("base query is absent"))?;

        match self.store.find_by_key(key, query).await? {
            Some(entity) => Ok((entity, prepared)),
            None => {
                debug!(%key, "lookup found nothing");
                Err(AdapterError::not_found(format!("no entity with key {}", key)))
            }
        }
    }

    /// Remove an entity; returns the number of entities affected
    pub async fn remove(&self, entity: Option<&T>) -> AdapterResult<usize> {
        let entity = entity.ok_or_else(|| AdapterError::invalid_argument("entity is required"))?;
        let affected = self.store.delete(entity).await?;
        debug!(affected, "entity removed");
        Ok(affected)
    }

    /// Insert a new entity; returns it as stored
    pub async fn insert(&self, entity: Option<T>) -> AdapterResult<T> {
        let entity = entity.ok_or_else(|| AdapterError::invalid_argument("entity is required"))?;
        let created = self.store.create(entity).await?;
        Ok(created)
    }

    /// Merge `delta` into `entity`, then update it
    pub async fn patch(&self, entity: Option<T>, delta: Option<&Delta<T>>) -> AdapterResult<T> {
        let entity = entity.ok_or_else(|| AdapterError::invalid_argument("entity is required"))?;
        let delta = delta.ok_or_else(|| AdapterError::invalid_argument("delta is required"))?;

        let merged = delta.apply(entity)?;
        debug!(fields = ?delta.changed_fields().collect::<Vec<_>>(), "delta merged");

        let updated = self.store.update(merged).await?;
        Ok(updated)
    }

    /// Replace an entity wholesale
    pub async fn put(&self, entity: Option<T>) -> AdapterResult<T> {
        let entity = entity.ok_or_else(|| AdapterError::invalid_argument("entity is required"))?;
        let updated = self.store.update(entity).await?;
        Ok(updated)
    }

    /// Make outstanding writes durable
    pub async fn persist(&self) -> AdapterResult<()> {
        self.store.persist().await?;
        Ok(())
    }
}

/// Keys must be present and render non-empty (see [`Resource::Key`])
fn require_key<T: Resource>(key: Option<&T::Key>) -> AdapterResult<&T::Key> {
    match key {
        Some(key) if !key.to_string().is_empty() => Ok(key),
        _ => Err(AdapterError::invalid_argument("key is required")),
    }
}
