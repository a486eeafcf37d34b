//! Replication session ownership and teardown.

use crate::error::{ReplicationError, ReplicationResult};
use crate::quiescence::QuiescenceDetector;
use settee_store::{
    EventKind, ReplicationEmitter, ReplicationHandle, ReplicationMode, ReplicationOptions,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Bound on waiting for the terminal drain event during shutdown.
///
/// Cancellation of a live session is asynchronous; the engine acknowledges
/// it with a terminal `Complete`. A session wedged past this bound is
/// reported rather than waited on forever.
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// A running replication session.
///
/// Owned exclusively by one database handle; at most one active session per
/// handle. `has_likely_synced` transitions false to true at most once, and
/// once the session is cancelled no further state transitions are
/// observable.
pub struct ReplicationSession {
    mode: ReplicationMode,
    options: ReplicationOptions,
    handle: Box<dyn ReplicationHandle>,
    emitter: Arc<ReplicationEmitter>,
    has_likely_synced: Arc<AtomicBool>,
    detector: Option<QuiescenceDetector>,
}

impl std::fmt::Debug for ReplicationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplicationSession")
            .field("mode", &self.mode)
            .field("options", &self.options)
            .field("cancelled", &self.handle.is_cancelled())
            .field("has_likely_synced", &self.has_likely_synced())
            .finish_non_exhaustive()
    }
}

impl ReplicationSession {
    pub(crate) fn new(
        mode: ReplicationMode,
        options: ReplicationOptions,
        handle: Box<dyn ReplicationHandle>,
        has_likely_synced: Arc<AtomicBool>,
        detector: Option<QuiescenceDetector>,
    ) -> Self {
        let emitter = handle.emitter();
        Self {
            mode,
            options,
            handle,
            emitter,
            has_likely_synced,
            detector,
        }
    }

    /// Returns the session's direction.
    pub fn mode(&self) -> ReplicationMode {
        self.mode
    }

    /// Returns the options actually applied to the session.
    pub fn options(&self) -> &ReplicationOptions {
        &self.options
    }

    /// Returns the session's event emitter.
    pub fn emitter(&self) -> Arc<ReplicationEmitter> {
        Arc::clone(&self.emitter)
    }

    /// Returns true once the initial sync pass has likely completed.
    pub fn has_likely_synced(&self) -> bool {
        self.has_likely_synced.load(Ordering::SeqCst)
    }

    /// Returns true once the session has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.handle.is_cancelled()
    }

    /// Cancels the session and drains it.
    ///
    /// No-op when already cancelled. For a live session the terminal-event
    /// listener is registered *before* cancellation is issued; `cancel` can
    /// complete synchronously, and a listener registered after it may race
    /// past the event. The detector is detached last so no timer outlives
    /// the session.
    pub fn shutdown(mut self) -> ReplicationResult<()> {
        let result = if self.handle.is_cancelled() {
            Ok(())
        } else if self.options.live {
            let drain = self.emitter.subscribe_filtered(&[EventKind::Complete]);
            self.handle.cancel();
            let outcome = drain.recv_timeout(DRAIN_TIMEOUT);
            self.emitter.unsubscribe(drain.id);
            match outcome {
                Ok(_) => Ok(()),
                Err(_) => Err(ReplicationError::DrainTimeout),
            }
        } else {
            self.handle.cancel();
            Ok(())
        };

        if let Some(detector) = self.detector.take() {
            detector.detach();
        }
        debug!(mode = %self.mode, "replication session shut down");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use settee_store::{MemoryReplication, ReplicationEvent};

    fn live_session() -> (ReplicationSession, Arc<ReplicationEmitter>) {
        let handle = MemoryReplication::new();
        let emitter = handle.emitter();
        let flag = Arc::new(AtomicBool::new(false));
        let detector = QuiescenceDetector::attach(Arc::clone(&emitter), Arc::clone(&flag));
        let session = ReplicationSession::new(
            ReplicationMode::Sync,
            ReplicationOptions::live_retry(),
            Box::new(handle),
            flag,
            Some(detector),
        );
        session.handle.start();
        (session, emitter)
    }

    #[test]
    fn shutdown_waits_for_terminal_event() {
        let (session, emitter) = live_session();
        assert!(!session.is_cancelled());

        session.shutdown().unwrap();
        // Only subscriptions created by later observers remain.
        assert_eq!(emitter.subscriber_count(), 0);
    }

    #[test]
    fn shutdown_after_cancel_is_noop() {
        let (session, _emitter) = live_session();
        session.handle.cancel();
        assert!(session.is_cancelled());
        session.shutdown().unwrap();
    }

    #[test]
    fn non_live_shutdown_does_not_wait() {
        let handle = MemoryReplication::new();
        let session = ReplicationSession::new(
            ReplicationMode::Out,
            ReplicationOptions::default(),
            Box::new(handle),
            Arc::new(AtomicBool::new(false)),
            None,
        );
        session.shutdown().unwrap();
    }

    #[test]
    fn likely_synced_flag_reaches_session() {
        let (session, emitter) = live_session();
        assert!(!session.has_likely_synced());

        // MemoryReplication emitted Active/Paused on start; wait out the
        // debounce window.
        let synced = emitter.subscribe_filtered(&[EventKind::HasLikelySynced]);
        assert_eq!(
            synced.recv_timeout(Duration::from_secs(2)).unwrap(),
            ReplicationEvent::HasLikelySynced
        );
        assert!(session.has_likely_synced());

        emitter.unsubscribe(synced.id);
        session.shutdown().unwrap();
    }
}
