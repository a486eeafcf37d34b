//! # Settee Replication
//!
//! Replication session lifecycle for Settee.
//!
//! This crate provides:
//! - Replication mode and option resolution (`out` / `in` / `sync`)
//! - Session ownership: start, introspection, teardown
//! - The sync quiescence detector (likely-synced heuristic)
//!
//! ## Architecture
//!
//! A live replication session is designed to run forever; the engine never
//! emits a natural "first pass complete" signal. Consumers still need a
//! finite, observable answer to "has the initial catch-up finished". The
//! quiescence detector infers that point heuristically: a debounce window
//! after the last qualifying event, with a one-shot max-wait ceiling
//! covering streams that never emit at all.
//!
//! ## Key Invariants
//!
//! - Detector listeners attach before the session starts emitting
//! - The synthetic likely-synced event fires at most once per session
//! - Cancellation is idempotent; teardown registers its drain listener
//!   before issuing the cancel
//! - No detector timer survives session shutdown

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod controller;
mod error;
mod mode;
mod quiescence;
mod session;

pub use controller::ReplicationController;
pub use error::{ReplicationError, ReplicationResult};
pub use mode::{parse_mode, ReplicateSpec};
pub use quiescence::{DetectorState, QuiescenceDetector, DEBOUNCE_WINDOW, MAX_SYNC_WAIT};
pub use session::{ReplicationSession, DRAIN_TIMEOUT};
