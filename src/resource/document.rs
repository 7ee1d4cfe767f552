//! Schemaless document resource keyed by a string `id`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Resource;

/// A free-form JSON object with a string identity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Document {
    /// Build a document from a JSON object (non-object bodies yield no fields)
    pub fn new(body: Value) -> Self {
        let fields = match body {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self { id: None, fields }
    }

    pub fn with_id(id: impl Into<String>, body: Value) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::new(body)
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

impl Resource for Document {
    type Key = String;

    const KEY_FIELD: &'static str = "id";

    fn key(&self) -> Option<String> {
        self.id.clone()
    }

    fn with_key(mut self, key: String) -> Self {
        self.id = Some(key);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_form_is_flat() {
        let doc = Document::with_id("d1", json!({"title": "x"}));
        assert_eq!(doc.to_document().unwrap(), json!({"id": "d1", "title": "x"}));
    }

    #[test]
    fn test_document_without_id() {
        let doc: Document = serde_json::from_value(json!({"title": "x"})).unwrap();
        assert!(doc.key().is_none());
        assert_eq!(doc.get("title"), Some(&json!("x")));
    }
}
