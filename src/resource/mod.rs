//! # Resource Model
//!
//! The capability an entity type needs to be served: an identity, a
//! document (JSON) form the query applier can evaluate, and a merge strategy
//! for patch deltas.

pub mod delta;
pub mod document;
pub mod queryable;

use std::fmt::{Debug, Display};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::adapter::errors::{AdapterError, AdapterResult};

pub use delta::Delta;
pub use document::Document;
pub use queryable::Queryable;

/// An entity type that can be mediated by a resource adapter
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Identity type.
    ///
    /// A key whose `Display` output is empty counts as absent: single
    /// lookups reject it as an invalid argument before the store is asked.
    type Key: Clone
        + Debug
        + Display
        + PartialEq
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static;

    /// Member of the document form that holds the key
    const KEY_FIELD: &'static str;

    /// The key, or `None` before the store has assigned one
    fn key(&self) -> Option<Self::Key>;

    /// Return this entity carrying `key`
    fn with_key(self, key: Self::Key) -> Self;

    fn to_document(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    fn from_document(document: Value) -> serde_json::Result<Self> {
        serde_json::from_value(document)
    }

    /// Merge a delta into this entity.
    ///
    /// The default overwrites every member named by the delta in the document
    /// form and reads the entity back. Resources with non-trivial field
    /// mapping override this.
    fn merge_delta(self, delta: &Delta<Self>) -> AdapterResult<Self> {
        let mut document = self
            .to_document()
            .map_err(|e| AdapterError::encoding(e.to_string()))?;

        let Value::Object(fields) = &mut document else {
            return Err(AdapterError::invalid_argument(
                "entity document is not an object",
            ));
        };
        for (name, value) in delta.changes() {
            fields.insert(name.clone(), value.clone());
        }

        Self::from_document(document).map_err(|e| {
            AdapterError::invalid_argument(format!("delta does not fit entity: {}", e))
        })
    }
}

/// Result of a single-entity fetch
#[derive(Debug, Clone, PartialEq)]
pub enum Shaped<T> {
    /// The entity as stored
    Entity(T),
    /// The entity after field selection
    Projected(Value),
}

impl<T: Resource> Shaped<T> {
    pub fn entity(&self) -> Option<&T> {
        match self {
            Shaped::Entity(entity) => Some(entity),
            Shaped::Projected(_) => None,
        }
    }

    pub fn into_document(self) -> AdapterResult<Value> {
        match self {
            Shaped::Entity(entity) => entity
                .to_document()
                .map_err(|e| AdapterError::encoding(e.to_string())),
            Shaped::Projected(value) => Ok(value),
        }
    }
}
