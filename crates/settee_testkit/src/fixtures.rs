//! Document and store fixtures.

use serde_json::json;
use settee_store::{Document, DocumentStore, MemoryStore};

/// Builds `count` documents with ids `doc-0 .. doc-N` and a `seq` field.
pub fn sample_docs(count: usize) -> Vec<Document> {
    (0..count)
        .map(|i| {
            Document::from_value(json!({
                "_id": format!("doc-{i}"),
                "seq": i,
                "kind": if i % 2 == 0 { "even" } else { "odd" },
            }))
            .unwrap()
        })
        .collect()
}

/// Creates a memory store pre-populated with [`sample_docs`].
pub fn populated_store(name: &str, count: usize) -> MemoryStore {
    let store = MemoryStore::new(name);
    for doc in sample_docs(count) {
        store.put(&doc).unwrap();
    }
    store
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_docs_have_stable_ids() {
        let docs = sample_docs(3);
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0].id(), Some("doc-0"));
        assert_eq!(docs[2].get("kind"), Some(&serde_json::json!("even")));
    }

    #[test]
    fn populated_store_holds_the_fixtures() {
        let store = populated_store("fixtures", 4);
        assert_eq!(store.len(), 4);
        assert!(store.get("doc-3").is_ok());
    }
}
