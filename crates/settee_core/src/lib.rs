//! # Settee Core
//!
//! A thin convenience layer over a document-database engine.
//!
//! This crate provides:
//! - Constructor-input resolution (name, url, or structured conn)
//! - Database-name charset validation
//! - CRUD call-shape normalization over the engine's native API
//! - Replication at construction time, with the synthetic
//!   likely-synced signal
//!
//! ## Example
//!
//! ```rust
//! use settee_core::{Database, SetteeOptions};
//!
//! let db = Database::open_in_memory(SetteeOptions::new().with_name("todos")).unwrap();
//! let doc = db.save(serde_json::json!({ "task": "water plants" })).unwrap();
//! assert!(doc.id().is_some());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod database;
mod error;
mod name;
mod resolve;

pub use config::{ConnectionInfo, SetteeOptions};
pub use database::{AllOptions, Database};
pub use error::{CoreError, CoreResult};
pub use name::{couch_safe, validate_name};
pub use resolve::{resolve, ResolvedTarget};

// Re-exported so callers can speak the store and replication vocabularies
// without naming those crates.
pub use settee_replication::{ReplicateSpec, ReplicationSession};
pub use settee_store::{
    DocMeta, DocRef, Document, DocumentStore, EventKind, FindRequest, IndexInfo, MemoryStore,
    ReplicationEvent, ReplicationOptions,
};
