//! Patch deltas: sparse field-level changes to an existing entity.

use std::fmt;
use std::marker::PhantomData;

use serde_json::{Map, Value};

use crate::adapter::errors::{AdapterError, AdapterResult};

use super::Resource;

/// Sparse set of member changes for a `T`
pub struct Delta<T> {
    changes: Map<String, Value>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Resource> Delta<T> {
    /// Build a delta from a request body, which must be a JSON object
    pub fn from_value(value: Value) -> AdapterResult<Self> {
        match value {
            Value::Object(changes) => Ok(Self::from_changes(changes)),
            other => Err(AdapterError::invalid_argument(format!(
                "patch body must be an object, got {}",
                json_type(&other)
            ))),
        }
    }

    pub fn from_changes(changes: Map<String, Value>) -> Self {
        Self {
            changes,
            _entity: PhantomData,
        }
    }

    pub fn changes(&self) -> &Map<String, Value> {
        &self.changes
    }

    pub fn changed_fields(&self) -> impl Iterator<Item = &str> {
        self.changes.keys().map(String::as_str)
    }

    /// Merge into `entity`. The key member may be restated but never changed.
    pub fn apply(&self, entity: T) -> AdapterResult<T> {
        if let Some(requested) = self.changes.get(T::KEY_FIELD) {
            let current = entity
                .key()
                .map(|k| serde_json::to_value(k))
                .transpose()
                .map_err(|e| AdapterError::encoding(e.to_string()))?;
            if current.as_ref() != Some(requested) {
                return Err(AdapterError::invalid_argument(format!(
                    "{} cannot be changed by a patch",
                    T::KEY_FIELD
                )));
            }
        }

        entity.merge_delta(self)
    }
}

impl<T> Clone for Delta<T> {
    fn clone(&self) -> Self {
        Self {
            changes: self.changes.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Delta<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delta").field("changes", &self.changes).finish()
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
