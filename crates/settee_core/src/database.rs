//! Database facade.

use crate::config::SetteeOptions;
use crate::error::{CoreError, CoreResult};
use crate::resolve::{resolve, ResolvedTarget};
use serde_json::Value;
use settee_replication::{ReplicationController, ReplicationSession};
use settee_store::{
    AllDocsOptions, DocMeta, DocRef, Document, DocumentStore, FindRequest, IndexInfo,
    MemoryStore, ReplicationEmitter, ReplicationOptions, StoreError, DESIGN_DOC_PREFIX,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use tracing::{debug, warn};

/// Options for [`Database::all`].
#[derive(Debug, Clone, Copy)]
pub struct AllOptions {
    /// Include full document bodies. Defaults to true.
    pub include_docs: bool,
    /// Include `_design/` documents. Defaults to false.
    pub include_design_docs: bool,
}

impl Default for AllOptions {
    fn default() -> Self {
        Self {
            include_docs: true,
            include_design_docs: false,
        }
    }
}

/// The main database handle.
///
/// `Database` normalizes CRUD call shapes over an engine implementing
/// [`DocumentStore`], and owns at most one replication session for its
/// lifetime. Construction validates all input before any engine handle
/// exists; a handle that constructs is fully addressable.
///
/// # Opening a Database
///
/// ```rust
/// use settee_core::{Database, SetteeOptions};
///
/// let db = Database::open_in_memory(SetteeOptions::new().with_name("todos")).unwrap();
/// assert_eq!(db.name(), "todos");
/// ```
///
/// Replication is requested at construction time:
///
/// ```rust
/// use settee_core::{Database, ReplicateSpec, SetteeOptions};
///
/// let options = SetteeOptions::new()
///     .with_name("todos")
///     .with_url("https://db.example.com/todos")
///     .with_replicate(ReplicateSpec::shorthand("sync"));
/// let db = Database::open_in_memory(options).unwrap();
/// assert!(db.replication_options().is_some());
/// db.destroy().unwrap();
/// ```
pub struct Database<S: DocumentStore> {
    name: String,
    url: Option<String>,
    local_path: Option<PathBuf>,
    is_couch_safe_enforced: bool,
    store: S,
    session: Option<ReplicationSession>,
}

impl<S: DocumentStore> std::fmt::Debug for Database<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("local_path", &self.local_path)
            .field("is_couch_safe_enforced", &self.is_couch_safe_enforced)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl Database<MemoryStore> {
    /// Opens a database backed by an in-memory store.
    pub fn open_in_memory(options: SetteeOptions) -> CoreResult<Self> {
        Self::open_with(options, |target| Ok(MemoryStore::new(&target.name)))
    }
}

impl<S: DocumentStore> Database<S> {
    /// Opens a database, constructing the engine handle via `factory`.
    ///
    /// Resolution and name validation run strictly before the factory; a
    /// requested replication session is started before the constructor
    /// returns, so no half-constructed handle is ever observable.
    ///
    /// # Errors
    ///
    /// Configuration failures surface here synchronously:
    /// missing identifying input, contradictory url/conn, unsafe names
    /// under enforcement, and replication requested without a remote.
    pub fn open_with<F>(options: SetteeOptions, factory: F) -> CoreResult<Self>
    where
        F: FnOnce(&ResolvedTarget) -> Result<S, StoreError>,
    {
        let target = resolve(&options)?;

        if options.replicate.is_some() && target.url.is_none() {
            return Err(CoreError::configuration(
                "url or conn option required to replicate",
            ));
        }

        if options.verbose {
            debug!(name = %target.name, url = ?target.url, "opening database");
        }

        let store = factory(&target)?;
        let session = match &options.replicate {
            Some(spec) => Some(ReplicationController::start(
                &store,
                target.url.as_deref(),
                spec,
                options.replicate_live(),
            )?),
            None => None,
        };

        Ok(Self {
            name: target.name,
            url: target.url,
            local_path: target.local_path,
            is_couch_safe_enforced: options.couchdb_safe(),
            store,
            session,
        })
    }

    /// Returns the validated database name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the remote address, when one was given or derived.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Returns the local storage path, for locally-addressable handles.
    pub fn local_path(&self) -> Option<&Path> {
        self.local_path.as_deref()
    }

    /// Returns true when name-charset enforcement was active.
    pub fn is_couch_safe_enforced(&self) -> bool {
        self.is_couch_safe_enforced
    }

    /// Borrows the underlying engine handle.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Adds or updates a document.
    ///
    /// A document carrying its own non-empty `_id` (the number `0` counts)
    /// is updated in place; otherwise the engine assigns an identifier. The
    /// assigned identifier and revision are merged back onto the document.
    pub fn save(&self, doc: Value) -> CoreResult<Document> {
        self.save_doc(into_document(doc)?)
    }

    /// [`save`](Self::save), for an already-built [`Document`].
    pub fn save_doc(&self, mut doc: Document) -> CoreResult<Document> {
        let meta = if doc.has_own_id() {
            self.store.put(&doc)?
        } else {
            self.store.post(&doc)?
        };
        doc.set_id(meta.id);
        doc.set_rev(meta.rev);
        Ok(doc)
    }

    /// Alias of [`save`](Self::save).
    pub fn add(&self, doc: Value) -> CoreResult<Document> {
        self.save(doc)
    }

    /// Updates a document that already carries `_id` and `_rev`.
    pub fn update(&self, mut doc: Document) -> CoreResult<Document> {
        let meta = self.store.put(&doc)?;
        doc.set_id(meta.id);
        doc.set_rev(meta.rev);
        Ok(doc)
    }

    /// Fetches a document by id.
    pub fn get(&self, id: &str) -> CoreResult<Document> {
        Ok(self.store.get(id)?)
    }

    /// Deletes a document. The document must carry `_id` and `_rev`.
    pub fn delete(&self, doc: &Document) -> CoreResult<DocMeta> {
        let id = doc.id_string().ok_or(StoreError::MissingId)?;
        let rev = doc
            .rev()
            .ok_or_else(|| StoreError::MissingRev { id: id.clone() })?;
        Ok(self.store.remove(&id, rev)?)
    }

    /// Returns all documents.
    ///
    /// Bodies are included by default and design documents excluded, per
    /// convention. Rows without bodies are reshaped so callers always see
    /// documents with `_id`/`_rev`, regardless of the bodies flag.
    pub fn all(&self, options: AllOptions) -> CoreResult<Vec<Document>> {
        let rows = self.store.all_docs(&AllDocsOptions {
            include_docs: options.include_docs,
        })?;
        Ok(rows
            .into_iter()
            .filter(|row| options.include_design_docs || !row.id.starts_with(DESIGN_DOC_PREFIX))
            .map(|row| match row.doc {
                Some(doc) => doc,
                None => {
                    let mut doc = Document::new();
                    doc.set_id(row.id);
                    doc.set_rev(row.rev);
                    doc
                }
            })
            .collect())
    }

    /// Fetches a batch of documents in one request.
    ///
    /// The output order matches the input order. An empty input resolves to
    /// an empty result without touching the engine.
    ///
    /// # Errors
    ///
    /// Fails with [`CoreError::NotFound`] naming the first reference that
    /// resolved to nothing.
    pub fn get_many(&self, refs: &[DocRef]) -> CoreResult<Vec<Document>> {
        if refs.is_empty() {
            return Ok(Vec::new());
        }
        let results = self.store.bulk_get(refs)?;
        refs.iter()
            .zip(results)
            .map(|(req, doc)| doc.ok_or_else(|| CoreError::not_found(&req.id)))
            .collect()
    }

    /// Deletes every non-design document.
    ///
    /// Individual deletes are issued concurrently with no ordering among
    /// them; the call waits for all to settle. If any delete fails the
    /// aggregate fails, with already-applied deletes left committed (the
    /// engine has no multi-document transaction to roll back into).
    pub fn delete_all(&self) -> CoreResult<Vec<DocMeta>> {
        let docs = self.all(AllOptions::default())?;
        let outcomes: Vec<CoreResult<DocMeta>> = thread::scope(|scope| {
            let handles: Vec<_> = docs
                .iter()
                .map(|doc| scope.spawn(move || self.delete(doc)))
                .collect();
            handles
                .into_iter()
                .map(|handle| match handle.join() {
                    Ok(outcome) => outcome,
                    Err(_) => Err(CoreError::Store(StoreError::backend(
                        "delete worker panicked",
                    ))),
                })
                .collect()
        });
        outcomes.into_iter().collect()
    }

    /// Alias of [`delete_all`](Self::delete_all).
    pub fn clear(&self) -> CoreResult<Vec<DocMeta>> {
        self.delete_all()
    }

    /// Creates an index over the given fields, single or bulk.
    ///
    /// Field names are de-duplicated before submission. An already-existing
    /// index is success, not an error; anything else re-raises.
    pub fn create_indicies<I, T>(&self, fields: I) -> CoreResult<IndexInfo>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for field in fields {
            let field = field.into();
            if !unique.contains(&field) {
                unique.push(field);
            }
        }

        match self.store.create_index(&unique) {
            Ok(info) => Ok(info),
            Err(StoreError::IndexExists { name }) => Ok(IndexInfo {
                id: format!("{DESIGN_DOC_PREFIX}{name}"),
                name,
                result: "exists".into(),
            }),
            Err(err) => Err(err.into()),
        }
    }

    /// Alias of [`create_indicies`](Self::create_indicies) for one field.
    pub fn upsert_index(&self, field: &str) -> CoreResult<IndexInfo> {
        self.create_indicies([field])
    }

    /// Runs a selector query, returning the matching documents directly.
    pub fn find_many(&self, request: FindRequest) -> CoreResult<Vec<Document>> {
        Ok(self.store.find(&request)?)
    }

    /// Returns the replication options actually applied, when a session
    /// was requested at construction.
    pub fn replication_options(&self) -> Option<ReplicationOptions> {
        self.session.as_ref().map(|s| s.options().clone())
    }

    /// Returns the active replication session, if any.
    pub fn session(&self) -> Option<&ReplicationSession> {
        self.session.as_ref()
    }

    /// Returns the session's emitter, for observing replication events.
    pub fn replication_emitter(&self) -> Option<Arc<ReplicationEmitter>> {
        self.session.as_ref().map(|s| s.emitter())
    }

    /// Returns true once the initial sync pass has likely completed.
    ///
    /// Always false for handles without a live replication session.
    pub fn has_likely_synced(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.has_likely_synced())
    }

    /// Destroys the database.
    ///
    /// An active replication session is cancelled and drained first, so no
    /// replication activity outlives the handle; a session that fails to
    /// drain is reported and abandoned rather than blocking destruction.
    pub fn destroy(mut self) -> CoreResult<()> {
        if let Some(session) = self.session.take() {
            if let Err(err) = session.shutdown() {
                warn!(error = %err, "replication session did not shut down cleanly");
            }
        }
        self.store.destroy()?;
        Ok(())
    }
}

fn into_document(value: Value) -> CoreResult<Document> {
    Document::from_value(value)
        .ok_or_else(|| CoreError::Store(StoreError::backend("document body must be a JSON object")))
}
