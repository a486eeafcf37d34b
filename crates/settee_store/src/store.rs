//! Document store trait definition.

use crate::document::{DocMeta, DocRef, DocRow, Document};
use crate::error::StoreResult;
use crate::replication::{ReplicationHandle, ReplicationMode, ReplicationOptions};
use serde_json::Value;

/// Options for an all-documents listing.
#[derive(Debug, Clone, Copy)]
pub struct AllDocsOptions {
    /// Include full document bodies in each row.
    pub include_docs: bool,
}

impl Default for AllDocsOptions {
    fn default() -> Self {
        Self { include_docs: true }
    }
}

/// A selector query against the store's index engine.
#[derive(Debug, Clone)]
pub struct FindRequest {
    /// Field/value selector; documents match when every named field equals
    /// the given value.
    pub selector: Value,
    /// Maximum number of documents to return.
    pub limit: Option<usize>,
}

impl FindRequest {
    /// Creates a request from a selector value.
    pub fn new(selector: Value) -> Self {
        Self {
            selector,
            limit: None,
        }
    }

    /// Sets the result limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Result of an index creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexInfo {
    /// Design document id backing the index.
    pub id: String,
    /// Index name.
    pub name: String,
    /// `"created"` for a new index, `"exists"` for an idempotent repeat.
    pub result: String,
}

/// The document-database engine Settee wraps.
///
/// Implementations own storage, the wire protocol, conflict handling, and
/// query planning. Settee only orchestrates and normalizes around this
/// capability.
///
/// # Invariants
///
/// - `put` fails with a conflict when the supplied `_rev` does not match the
///   stored revision
/// - `bulk_get` answers in request order, one slot per request
/// - `replicate` returns an **inert** handle; events flow only after
///   [`ReplicationHandle::start`]
/// - Implementations must be `Send + Sync`
///
/// # Implementors
///
/// - [`crate::MemoryStore`] - In-memory stand-in for tests
pub trait DocumentStore: Send + Sync {
    /// Returns the store's database name.
    fn name(&self) -> &str;

    /// Fetches the latest revision of a document.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when no document has the given id.
    fn get(&self, id: &str) -> StoreResult<Document>;

    /// Creates or updates a document that carries its own `_id`.
    ///
    /// # Errors
    ///
    /// Returns `MissingId` without an id, `Conflict` when `_rev` does not
    /// match the stored revision.
    fn put(&self, doc: &Document) -> StoreResult<DocMeta>;

    /// Inserts a document, assigning a fresh identifier.
    fn post(&self, doc: &Document) -> StoreResult<DocMeta>;

    /// Deletes a document at a specific revision.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown ids, `Conflict` for stale revisions.
    fn remove(&self, id: &str, rev: &str) -> StoreResult<DocMeta>;

    /// Lists all documents, design documents included.
    fn all_docs(&self, options: &AllDocsOptions) -> StoreResult<Vec<DocRow>>;

    /// Fetches a batch of documents in one request.
    ///
    /// The result has one slot per request, in request order; `None` marks a
    /// reference that resolved to nothing.
    fn bulk_get(&self, requests: &[DocRef]) -> StoreResult<Vec<Option<Document>>>;

    /// Creates an index over the given fields.
    ///
    /// # Errors
    ///
    /// Returns `IndexExists` when an index over the same field set already
    /// exists.
    fn create_index(&self, fields: &[String]) -> StoreResult<IndexInfo>;

    /// Runs a selector query.
    fn find(&self, request: &FindRequest) -> StoreResult<Vec<Document>>;

    /// Starts building a replication session against `remote`.
    ///
    /// The returned handle is inert until started, so callers can attach
    /// event listeners without racing the first event.
    fn replicate(
        &self,
        mode: ReplicationMode,
        remote: &str,
        options: &ReplicationOptions,
    ) -> StoreResult<Box<dyn ReplicationHandle>>;

    /// Destroys the database. All subsequent operations fail.
    fn destroy(&self) -> StoreResult<()>;
}
