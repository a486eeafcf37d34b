//! Document model shared by the store boundary and the facade above it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Reserved id prefix for design documents (indexes, views).
///
/// Documents under this prefix are excluded from normal listings by
/// convention.
pub const DESIGN_DOC_PREFIX: &str = "_design/";

/// A JSON document with the reserved `_id` and `_rev` fields.
///
/// The body is a plain JSON object; `_id` and `_rev` live inside it, as the
/// engine stores them. Accessors keep callers from spelling the reserved
/// field names everywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    body: Map<String, Value>,
}

impl Document {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self { body: Map::new() }
    }

    /// Creates a document from a JSON value.
    ///
    /// Returns `None` when the value is not a JSON object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(body) => Some(Self { body }),
            _ => None,
        }
    }

    /// Returns the document id, if the `_id` field holds a string.
    pub fn id(&self) -> Option<&str> {
        self.body.get("_id").and_then(Value::as_str)
    }

    /// Returns the document revision, if present.
    pub fn rev(&self) -> Option<&str> {
        self.body.get("_rev").and_then(Value::as_str)
    }

    /// Sets the document id.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.body.insert("_id".into(), Value::String(id.into()));
    }

    /// Sets the document revision.
    pub fn set_rev(&mut self, rev: impl Into<String>) {
        self.body.insert("_rev".into(), Value::String(rev.into()));
    }

    /// Returns true when the document carries its own, non-empty id.
    ///
    /// The JSON number `0` is a valid (falsy-but-present) id; only a missing
    /// key, `null`, or the empty string count as absent.
    pub fn has_own_id(&self) -> bool {
        match self.body.get("_id") {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        }
    }

    /// Returns the id as a string, stringifying non-string ids.
    ///
    /// Engines key documents by string; a numeric `_id` addresses the same
    /// document as its decimal rendering.
    pub fn id_string(&self) -> Option<String> {
        match self.body.get("_id") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        }
    }

    /// Returns true when the id marks a design document.
    pub fn is_design_doc(&self) -> bool {
        self.id().is_some_and(|id| id.starts_with(DESIGN_DOC_PREFIX))
    }

    /// Reads a field from the body.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.body.get(key)
    }

    /// Writes a field into the body.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.body.insert(key.into(), value)
    }

    /// Borrows the raw body.
    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    /// Consumes the document, returning the raw body.
    pub fn into_body(self) -> Map<String, Value> {
        self.body
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Map<String, Value>> for Document {
    fn from(body: Map<String, Value>) -> Self {
        Self { body }
    }
}

/// Metadata returned by a successful write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocMeta {
    /// Identifier of the written document.
    pub id: String,
    /// Revision produced by the write.
    pub rev: String,
}

/// A reference to one document in a batched fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocRef {
    /// Identifier of the requested document.
    pub id: String,
    /// Revision to fetch; latest when absent.
    pub rev: Option<String>,
}

impl DocRef {
    /// Creates a reference to the latest revision of `id`.
    pub fn latest(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rev: None,
        }
    }

    /// Creates a reference to a specific revision.
    pub fn at(id: impl Into<String>, rev: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rev: Some(rev.into()),
        }
    }
}

/// One row of an all-documents listing.
#[derive(Debug, Clone, PartialEq)]
pub struct DocRow {
    /// Document identifier.
    pub id: String,
    /// Current revision.
    pub rev: String,
    /// Full body, present when bodies were requested.
    pub doc: Option<Document>,
}

/// Generates a fresh revision token following `prev`.
///
/// Tokens are `<generation>-<suffix>`; the generation increments on each
/// write and the suffix is a fresh UUID.
pub(crate) fn next_rev(prev: Option<&str>) -> String {
    let generation = prev.map(rev_generation).unwrap_or(0) + 1;
    format!("{}-{}", generation, Uuid::new_v4().simple())
}

/// Parses the generation number out of a revision token.
///
/// Malformed tokens parse as generation 0.
pub fn rev_generation(rev: &str) -> u64 {
    rev.split('-')
        .next()
        .and_then(|g| g.parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn own_id_detection() {
        let mut doc = Document::new();
        assert!(!doc.has_own_id());

        doc.insert("_id", Value::Null);
        assert!(!doc.has_own_id());

        doc.set_id("");
        assert!(!doc.has_own_id());

        doc.set_id("doc-1");
        assert!(doc.has_own_id());
    }

    #[test]
    fn zero_is_a_valid_id() {
        let doc = Document::from_value(json!({ "_id": 0, "v": true })).unwrap();
        assert!(doc.has_own_id());
        assert_eq!(doc.id_string().as_deref(), Some("0"));
    }

    #[test]
    fn design_doc_prefix() {
        let doc = Document::from_value(json!({ "_id": "_design/idx-1" })).unwrap();
        assert!(doc.is_design_doc());

        let doc = Document::from_value(json!({ "_id": "regular" })).unwrap();
        assert!(!doc.is_design_doc());
    }

    #[test]
    fn from_value_rejects_non_objects() {
        assert!(Document::from_value(json!([1, 2, 3])).is_none());
        assert!(Document::from_value(json!("text")).is_none());
        assert!(Document::from_value(json!({})).is_some());
    }

    #[test]
    fn rev_tokens_increment_generation() {
        let first = next_rev(None);
        assert_eq!(rev_generation(&first), 1);

        let second = next_rev(Some(&first));
        assert_eq!(rev_generation(&second), 2);
        assert_ne!(first, second);
    }

    #[test]
    fn malformed_rev_parses_as_zero() {
        assert_eq!(rev_generation("not-a-rev"), 0);
        assert_eq!(rev_generation(""), 0);
    }
}
