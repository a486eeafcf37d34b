//! # Settee Testkit
//!
//! Test utilities for Settee.
//!
//! This crate provides:
//! - Document and store fixtures
//! - A scripted event driver for replication-timing tests
//! - Tracing initialization for tests

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod scripted;

pub use fixtures::*;
pub use scripted::*;

/// Initializes a test tracing subscriber.
///
/// Safe to call from every test; only the first call installs anything.
/// Filtering follows `RUST_LOG`.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
