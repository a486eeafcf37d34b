//! Replication session construction.

use crate::error::{ReplicationError, ReplicationResult};
use crate::mode::ReplicateSpec;
use crate::quiescence::QuiescenceDetector;
use crate::session::ReplicationSession;
use settee_store::DocumentStore;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::debug;

/// Builds replication sessions against a store's replication primitive.
pub struct ReplicationController;

impl ReplicationController {
    /// Starts a replication session.
    ///
    /// Resolves the spec into a validated mode and concrete options, builds
    /// the engine handle, and, for live sessions, attaches the quiescence
    /// detector *before* starting the handle. The attach-then-start order is
    /// a correctness requirement: an event emitted before the detector's
    /// listeners exist would be lost, skewing the heuristic.
    ///
    /// # Errors
    ///
    /// Fails with [`ReplicationError::MissingRemote`] when `remote` is
    /// `None`, with [`ReplicationError::InvalidMode`] for a mode outside
    /// `out`/`in`/`sync`, and passes engine failures through.
    pub fn start<S: DocumentStore + ?Sized>(
        store: &S,
        remote: Option<&str>,
        spec: &ReplicateSpec,
        live_default: bool,
    ) -> ReplicationResult<ReplicationSession> {
        let remote = remote.ok_or(ReplicationError::MissingRemote)?;
        let (mode, options) = spec.resolve(live_default)?;

        let handle = store.replicate(mode, remote, &options)?;
        let has_likely_synced = Arc::new(AtomicBool::new(false));

        let detector = options.live.then(|| {
            QuiescenceDetector::attach(handle.emitter(), Arc::clone(&has_likely_synced))
        });

        handle.start();
        debug!(%mode, live = options.live, %remote, "replication session started");

        Ok(ReplicationSession::new(
            mode,
            options,
            handle,
            has_likely_synced,
            detector,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use settee_store::{EventKind, MemoryStore, ReplicationMode, ReplicationOptions};
    use std::time::Duration;

    #[test]
    fn missing_remote_is_rejected() {
        let store = MemoryStore::new("local");
        let err = ReplicationController::start(
            &store,
            None,
            &ReplicateSpec::shorthand("sync"),
            true,
        )
        .unwrap_err();
        assert!(matches!(err, ReplicationError::MissingRemote));
    }

    #[test]
    fn invalid_mode_is_rejected() {
        let store = MemoryStore::new("local");
        let err = ReplicationController::start(
            &store,
            Some("https://db.example.com/remote"),
            &ReplicateSpec::shorthand("both"),
            true,
        )
        .unwrap_err();
        assert!(matches!(err, ReplicationError::InvalidMode { .. }));
    }

    #[test]
    fn live_session_gets_a_detector() {
        let store = MemoryStore::new("local");
        let session = ReplicationController::start(
            &store,
            Some("https://db.example.com/remote"),
            &ReplicateSpec::shorthand("sync"),
            true,
        )
        .unwrap();

        assert_eq!(session.mode(), ReplicationMode::Sync);
        assert!(session.options().live);

        // The detector observed the start-time events and settles on the
        // debounce window, not the ceiling.
        let synced = session
            .emitter()
            .subscribe_filtered(&[EventKind::HasLikelySynced]);
        synced.recv_timeout(Duration::from_millis(450)).unwrap();
        assert!(session.has_likely_synced());
        session.shutdown().unwrap();
    }

    #[test]
    fn session_debug_output_reports_mode_and_state() {
        let store = MemoryStore::new("local");
        let session = ReplicationController::start(
            &store,
            Some("https://db.example.com/remote"),
            &ReplicateSpec::with_options("out", ReplicationOptions::default()),
            true,
        )
        .unwrap();

        let rendered = format!("{session:?}");
        assert!(rendered.contains("ReplicationSession"));
        assert!(rendered.contains("Out"));
        session.shutdown().unwrap();
    }

    #[test]
    fn non_live_session_never_signals() {
        let store = MemoryStore::new("local");
        let session = ReplicationController::start(
            &store,
            Some("https://db.example.com/remote"),
            &ReplicateSpec::with_options("out", ReplicationOptions::default()),
            true,
        )
        .unwrap();

        let synced = session
            .emitter()
            .subscribe_filtered(&[EventKind::HasLikelySynced]);
        assert!(synced
            .recv_timeout(crate::MAX_SYNC_WAIT + Duration::from_millis(150))
            .is_err());
        assert!(!session.has_likely_synced());
        session.shutdown().unwrap();
    }
}
