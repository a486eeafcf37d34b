//! Sync quiescence detection.
//!
//! A live replication stream has no natural end. The detector watches the
//! stream's qualifying events and declares the initial catch-up "likely
//! finished" once the stream goes quiet for a debounce window, with a
//! one-shot max-wait ceiling for streams that never emit anything at all.
//!
//! This is a heuristic, not a proof: a stream that keeps emitting inside
//! every debounce window postpones settlement indefinitely. That trade is
//! accepted over implementing checkpoint/sequence tracking.

use parking_lot::RwLock;
use settee_store::{
    EventKind, ReplicationEmitter, ReplicationEvent, Subscription, SubscriptionId,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::trace;

/// Quiet window after the last qualifying event before settling.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(150);

/// Ceiling for a stream that never emits a qualifying event.
pub const MAX_SYNC_WAIT: Duration = Duration::from_millis(500);

/// Events that reset the debounce window.
const QUALIFYING: [EventKind; 4] = [
    EventKind::Change,
    EventKind::Active,
    EventKind::Paused,
    EventKind::Complete,
];

/// State of a quiescence detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    /// Not yet attached to a stream.
    Idle,
    /// Listening; timers armed.
    Watching,
    /// The synthetic event fired; terminal.
    Settled,
}

/// The two detector deadlines, named rather than buried in closures.
///
/// At most one debounce deadline and one max-wait deadline exist at a time.
/// The max-wait deadline is an initial safety net only: the first qualifying
/// event clears it for good, after which debounce alone governs settlement.
#[derive(Debug)]
struct QuiescenceTimers {
    debounce_deadline: Option<Instant>,
    max_wait_deadline: Option<Instant>,
}

impl QuiescenceTimers {
    /// Arms the initial max-wait ceiling.
    fn arm() -> Self {
        Self {
            debounce_deadline: None,
            max_wait_deadline: Some(Instant::now() + MAX_SYNC_WAIT),
        }
    }

    /// Records a qualifying event: cancel both timers, restart debounce.
    fn observe_event(&mut self) {
        self.max_wait_deadline = None;
        self.debounce_deadline = Some(Instant::now() + DEBOUNCE_WINDOW);
    }

    /// Returns the deadline currently governing settlement.
    fn next_deadline(&self) -> Option<Instant> {
        self.debounce_deadline.or(self.max_wait_deadline)
    }
}

/// Watches a replication event stream and emits one synthetic
/// [`ReplicationEvent::HasLikelySynced`] when the stream quiesces.
///
/// The detector is single-shot: once settled it never fires again, even if
/// the underlying session keeps emitting. Attachment registers the stream
/// subscription synchronously in the caller's thread, so a session started
/// after [`attach`](QuiescenceDetector::attach) returns cannot race past
/// the detector's listeners.
pub struct QuiescenceDetector {
    state: Arc<RwLock<DetectorState>>,
    emitter: Arc<ReplicationEmitter>,
    subscription_id: SubscriptionId,
    worker: Option<JoinHandle<()>>,
}

impl QuiescenceDetector {
    /// Attaches a detector to a session's emitter.
    ///
    /// `has_likely_synced` is flipped to true (at most once) when the
    /// detector settles; the owning session exposes it to consumers.
    pub fn attach(emitter: Arc<ReplicationEmitter>, has_likely_synced: Arc<AtomicBool>) -> Self {
        // Subscribe before spawning anything: the subscription must exist
        // before the caller lets the session start emitting.
        let subscription: Subscription = emitter.subscribe_filtered(&QUALIFYING);
        let subscription_id = subscription.id;

        let state = Arc::new(RwLock::new(DetectorState::Watching));
        let worker = {
            let state = Arc::clone(&state);
            let emitter = Arc::clone(&emitter);
            let receiver = subscription.into_receiver();
            thread::spawn(move || {
                run_timer_loop(
                    &receiver,
                    &emitter,
                    subscription_id,
                    &state,
                    &has_likely_synced,
                );
            })
        };

        Self {
            state,
            emitter,
            subscription_id,
            worker: Some(worker),
        }
    }

    /// Returns the detector's current state.
    pub fn state(&self) -> DetectorState {
        *self.state.read()
    }

    /// Returns true once the synthetic event has fired.
    pub fn is_settled(&self) -> bool {
        self.state() == DetectorState::Settled
    }

    /// Detaches the detector and joins its worker.
    ///
    /// Removing the subscription disconnects the worker's channel; a worker
    /// that has not yet settled exits without firing. After this returns no
    /// detector timer remains armed. Idempotent with respect to settlement.
    pub fn detach(mut self) {
        self.emitter.unsubscribe(self.subscription_id);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Timer loop run on the detector's worker thread.
fn run_timer_loop(
    receiver: &Receiver<ReplicationEvent>,
    emitter: &Arc<ReplicationEmitter>,
    subscription_id: SubscriptionId,
    state: &Arc<RwLock<DetectorState>>,
    has_likely_synced: &Arc<AtomicBool>,
) {
    let mut timers = QuiescenceTimers::arm();

    loop {
        let Some(deadline) = timers.next_deadline() else {
            // Unreachable by construction; treat as detached.
            return;
        };
        let wait = deadline.saturating_duration_since(Instant::now());

        match receiver.recv_timeout(wait) {
            Ok(event) => {
                trace!(kind = ?event.kind(), "qualifying replication event");
                timers.observe_event();
            }
            Err(RecvTimeoutError::Timeout) => {
                settle(emitter, subscription_id, state, has_likely_synced);
                return;
            }
            // Emitter torn down or detector detached: exit without settling.
            Err(RecvTimeoutError::Disconnected) => return,
        }
    }
}

/// Terminal action: flag, synthetic event, listener detach.
fn settle(
    emitter: &Arc<ReplicationEmitter>,
    subscription_id: SubscriptionId,
    state: &Arc<RwLock<DetectorState>>,
    has_likely_synced: &Arc<AtomicBool>,
) {
    *state.write() = DetectorState::Settled;
    has_likely_synced.store(true, Ordering::SeqCst);
    trace!("replication stream quiesced");
    emitter.emit(ReplicationEvent::HasLikelySynced);
    // Detach our own listeners so the session cannot re-trigger us.
    emitter.unsubscribe(subscription_id);
}
