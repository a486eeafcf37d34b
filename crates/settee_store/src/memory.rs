//! In-memory document store for testing.

use crate::document::{next_rev, DocMeta, DocRef, DocRow, Document, DESIGN_DOC_PREFIX};
use crate::error::{StoreError, StoreResult};
use crate::events::{ReplicationEmitter, ReplicationEvent};
use crate::replication::{ReplicationHandle, ReplicationMode, ReplicationOptions};
use crate::store::{AllDocsOptions, DocumentStore, FindRequest, IndexInfo};
use parking_lot::RwLock;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// An in-memory document store.
///
/// Suitable for unit tests, integration tests, and ephemeral databases.
/// Documents live in a `BTreeMap` keyed by id; revision tokens are enforced
/// the way a real engine enforces them (stale or missing revisions
/// conflict). Indexes materialize as `_design/` documents so listings see
/// the same shape a real engine produces.
///
/// # Thread Safety
///
/// The store is thread-safe and can be shared across threads.
pub struct MemoryStore {
    name: String,
    docs: RwLock<BTreeMap<String, Document>>,
    indexes: RwLock<Vec<IndexDef>>,
    destroyed: AtomicBool,
}

struct IndexDef {
    id: String,
    fields: Vec<String>,
}

impl MemoryStore {
    /// Creates an empty store with the given database name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            docs: RwLock::new(BTreeMap::new()),
            indexes: RwLock::new(Vec::new()),
            destroyed: AtomicBool::new(false),
        }
    }

    /// Returns the number of documents, design documents included.
    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    /// Returns true when the store holds no documents.
    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    fn guard(&self) -> StoreResult<()> {
        if self.destroyed.load(Ordering::SeqCst) {
            return Err(StoreError::Destroyed);
        }
        Ok(())
    }

    fn write_doc(&self, id: String, doc: &Document) -> StoreResult<DocMeta> {
        let mut docs = self.docs.write();
        let current_rev = docs.get(&id).and_then(|d| d.rev().map(String::from));

        // A write must cite the revision it is replacing; a write against an
        // existing doc without one, or with a stale one, conflicts.
        match (doc.rev(), current_rev.as_deref()) {
            (None, None) => {}
            (Some(supplied), Some(current)) if supplied == current => {}
            _ => return Err(StoreError::conflict(id)),
        }

        let rev = next_rev(current_rev.as_deref());
        let mut stored = doc.clone();
        stored.set_id(id.clone());
        stored.set_rev(rev.clone());
        docs.insert(id.clone(), stored);
        Ok(DocMeta { id, rev })
    }
}

impl DocumentStore for MemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, id: &str) -> StoreResult<Document> {
        self.guard()?;
        self.docs
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(id))
    }

    fn put(&self, doc: &Document) -> StoreResult<DocMeta> {
        self.guard()?;
        let id = doc.id_string().ok_or(StoreError::MissingId)?;
        self.write_doc(id, doc)
    }

    fn post(&self, doc: &Document) -> StoreResult<DocMeta> {
        self.guard()?;
        let id = Uuid::new_v4().simple().to_string();
        self.write_doc(id, doc)
    }

    fn remove(&self, id: &str, rev: &str) -> StoreResult<DocMeta> {
        self.guard()?;
        let mut docs = self.docs.write();
        let current = docs.get(id).ok_or_else(|| StoreError::not_found(id))?;
        if current.rev() != Some(rev) {
            return Err(StoreError::conflict(id));
        }
        let deleted_rev = next_rev(Some(rev));
        docs.remove(id);
        Ok(DocMeta {
            id: id.into(),
            rev: deleted_rev,
        })
    }

    fn all_docs(&self, options: &AllDocsOptions) -> StoreResult<Vec<DocRow>> {
        self.guard()?;
        let docs = self.docs.read();
        Ok(docs
            .values()
            .map(|doc| DocRow {
                id: doc.id().unwrap_or_default().into(),
                rev: doc.rev().unwrap_or_default().into(),
                doc: options.include_docs.then(|| doc.clone()),
            })
            .collect())
    }

    fn bulk_get(&self, requests: &[DocRef]) -> StoreResult<Vec<Option<Document>>> {
        self.guard()?;
        let docs = self.docs.read();
        Ok(requests
            .iter()
            .map(|req| {
                docs.get(&req.id).filter(|doc| match &req.rev {
                    Some(rev) => doc.rev() == Some(rev.as_str()),
                    None => true,
                })
            })
            .map(|doc| doc.cloned())
            .collect())
    }

    fn create_index(&self, fields: &[String]) -> StoreResult<IndexInfo> {
        self.guard()?;
        let name = index_name(fields);
        let id = format!("{DESIGN_DOC_PREFIX}{name}");

        if self.indexes.read().iter().any(|idx| idx.fields == fields) {
            return Err(StoreError::IndexExists { name });
        }

        let mut design = Document::new();
        design.set_id(id.clone());
        design.insert("language", Value::String("query".into()));
        design.insert(
            "fields",
            Value::Array(fields.iter().map(|f| Value::String(f.clone())).collect()),
        );
        self.write_doc(id.clone(), &design)?;
        self.indexes.write().push(IndexDef {
            id: id.clone(),
            fields: fields.to_vec(),
        });

        Ok(IndexInfo {
            id,
            name,
            result: "created".into(),
        })
    }

    fn find(&self, request: &FindRequest) -> StoreResult<Vec<Document>> {
        self.guard()?;
        let selector = request
            .selector
            .as_object()
            .ok_or_else(|| StoreError::backend("selector must be a JSON object"))?;
        let docs = self.docs.read();
        let limit = request.limit.unwrap_or(usize::MAX);
        Ok(docs
            .values()
            .filter(|doc| !doc.is_design_doc())
            .filter(|doc| selector.iter().all(|(field, value)| doc.get(field) == Some(value)))
            .take(limit)
            .cloned()
            .collect())
    }

    fn replicate(
        &self,
        mode: ReplicationMode,
        remote: &str,
        options: &ReplicationOptions,
    ) -> StoreResult<Box<dyn ReplicationHandle>> {
        self.guard()?;
        let _ = (mode, remote, options);
        Ok(Box::new(MemoryReplication::new()))
    }

    fn destroy(&self) -> StoreResult<()> {
        self.guard()?;
        self.destroyed.store(true, Ordering::SeqCst);
        self.docs.write().clear();
        self.indexes.write().clear();
        Ok(())
    }
}

/// Derives a deterministic index name from its field set.
fn index_name(fields: &[String]) -> String {
    let mut hasher = Sha256::new();
    for field in fields {
        hasher.update(field.as_bytes());
        hasher.update([0]);
    }
    let digest = hasher.finalize();
    let hex: String = digest.iter().take(16).map(|b| format!("{b:02x}")).collect();
    format!("idx-{hex}")
}

/// Replication handle produced by [`MemoryStore`].
///
/// A memory store has no wire to a remote, so the session reports the
/// trivially-caught-up lifecycle: `Active` then `Paused` on start, and a
/// terminal `Complete` in response to cancellation.
pub struct MemoryReplication {
    emitter: Arc<ReplicationEmitter>,
    started: AtomicBool,
    cancelled: AtomicBool,
}

impl MemoryReplication {
    /// Creates an inert handle.
    pub fn new() -> Self {
        Self {
            emitter: Arc::new(ReplicationEmitter::new()),
            started: AtomicBool::new(false),
            cancelled: AtomicBool::new(false),
        }
    }
}

impl Default for MemoryReplication {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplicationHandle for MemoryReplication {
    fn emitter(&self) -> Arc<ReplicationEmitter> {
        Arc::clone(&self.emitter)
    }

    fn start(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            return;
        }
        self.emitter.emit(ReplicationEvent::Active);
        self.emitter.emit(ReplicationEvent::Paused);
    }

    fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        self.emitter.emit(ReplicationEvent::Complete);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
