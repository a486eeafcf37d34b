//! # Settee Store
//!
//! Document store capability boundary for Settee.
//!
//! This crate defines the contract between Settee and the underlying
//! document-database engine. Settee does not implement a document store;
//! it orchestrates and normalizes around one. The engine is modeled as a
//! capability providing:
//!
//! - Document get/put/post/remove and batched fetch
//! - A listing of all documents
//! - Index creation and selector queries
//! - A replication primitive returning an event-emitting handle
//! - A destroy operation
//!
//! ## Design Principles
//!
//! - The [`DocumentStore`] trait is the only seam the upper layers see
//! - Replication handles are inert until [`ReplicationHandle::start`] so
//!   callers can attach listeners before the first event
//! - Event fan-out is synchronous at subscription time: a subscriber never
//!   misses events emitted after `subscribe` returns
//!
//! ## Available Stores
//!
//! - [`MemoryStore`] - In-memory engine stand-in for tests and ephemeral use

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod document;
mod error;
mod events;
mod memory;
mod replication;
mod store;

pub use document::{rev_generation, DocMeta, DocRef, DocRow, Document, DESIGN_DOC_PREFIX};
pub use error::{StoreError, StoreResult};
pub use events::{EventKind, ReplicationEmitter, ReplicationEvent, Subscription, SubscriptionId};
pub use memory::{MemoryReplication, MemoryStore};
pub use replication::{ReplicationHandle, ReplicationMode, ReplicationOptions};
pub use store::{AllDocsOptions, DocumentStore, FindRequest, IndexInfo};
