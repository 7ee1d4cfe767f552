//! Scoped base collection of a resource.

use serde_json::Value;

use crate::query::filter::{FilterExpr, FilterSet};

use super::Resource;

/// The queryable base collection a store hands to the adapter.
///
/// Restrictions added with [`Queryable::restrict`] are mandatory scoping:
/// every read through this value (collection rows or key lookup) only sees
/// entities matching all of them.
#[derive(Debug, Clone)]
pub struct Queryable<T> {
    source: Vec<T>,
    scope: FilterSet,
}

impl<T: Resource> Queryable<T> {
    pub fn new(source: Vec<T>) -> Self {
        Self {
            source,
            scope: FilterSet::new(),
        }
    }

    /// Add a mandatory restriction
    pub fn restrict(mut self, restriction: FilterExpr) -> Self {
        self.scope.filters.push(restriction);
        self
    }

    /// Document form of every in-scope entity, in source order
    pub fn documents(&self) -> serde_json::Result<Vec<Value>> {
        let mut rows = Vec::with_capacity(self.source.len());
        for entity in &self.source {
            let doc = entity.to_document()?;
            if self.scope.matches(&doc) {
                rows.push(doc);
            }
        }
        Ok(rows)
    }

    /// Find an in-scope entity by key
    pub fn find(&self, key: &T::Key) -> serde_json::Result<Option<T>> {
        for entity in &self.source {
            if entity.key().as_ref() != Some(key) {
                continue;
            }
            let doc = entity.to_document()?;
            if self.scope.matches(&doc) {
                return Ok(Some(entity.clone()));
            }
        }
        Ok(None)
    }
}
