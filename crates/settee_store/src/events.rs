//! Replication event fan-out.
//!
//! A replication session reports its lifecycle through a
//! [`ReplicationEmitter`] owned by the engine's replication handle.
//! Subscribers receive events over mpsc channels; registration is
//! synchronous, so a subscriber that registered before the session started
//! never misses an event.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

/// An event observed on a replication session.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplicationEvent {
    /// A batch of documents changed.
    Change(Option<serde_json::Value>),
    /// Replication resumed transferring documents.
    Active,
    /// Replication caught up (or lost its connection) and is waiting.
    Paused,
    /// Replication finished; emitted once, in response to cancellation.
    Complete,
    /// Replication-level failure. Orthogonal to lifecycle tracking.
    Error(String),
    /// Synthetic signal: the initial sync pass has likely finished.
    ///
    /// Never produced by an engine; only the quiescence detector emits it.
    HasLikelySynced,
}

impl ReplicationEvent {
    /// Returns the kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            ReplicationEvent::Change(_) => EventKind::Change,
            ReplicationEvent::Active => EventKind::Active,
            ReplicationEvent::Paused => EventKind::Paused,
            ReplicationEvent::Complete => EventKind::Complete,
            ReplicationEvent::Error(_) => EventKind::Error,
            ReplicationEvent::HasLikelySynced => EventKind::HasLikelySynced,
        }
    }
}

/// Event discriminant, used for filtered subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Documents changed.
    Change,
    /// Transfer in progress.
    Active,
    /// Waiting, caught up or disconnected.
    Paused,
    /// Terminal completion.
    Complete,
    /// Replication-level failure.
    Error,
    /// Synthetic likely-synced signal.
    HasLikelySynced,
}

/// Identifier of one registered subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A registered subscription: an id for later removal plus the receiving
/// end of the event channel.
pub struct Subscription {
    /// Identifier to pass to [`ReplicationEmitter::unsubscribe`].
    pub id: SubscriptionId,
    receiver: Receiver<ReplicationEvent>,
}

impl Subscription {
    /// Blocks until an event arrives or `timeout` elapses.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<ReplicationEvent, RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Returns an event if one is already queued.
    pub fn try_recv(&self) -> Option<ReplicationEvent> {
        self.receiver.try_recv().ok()
    }

    /// Consumes the subscription, returning the raw receiver.
    pub fn into_receiver(self) -> Receiver<ReplicationEvent> {
        self.receiver
    }
}

struct Subscriber {
    id: SubscriptionId,
    kinds: Option<Vec<EventKind>>,
    sender: Sender<ReplicationEvent>,
}

/// Distributes replication events to subscribers.
///
/// The emitter:
/// - Registers subscribers synchronously
/// - Clones each event to every matching subscriber
/// - Prunes disconnected subscribers on emit
/// - Is thread-safe
pub struct ReplicationEmitter {
    subscribers: RwLock<Vec<Subscriber>>,
    next_id: AtomicU64,
}

impl ReplicationEmitter {
    /// Creates an emitter with no subscribers.
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Subscribes to every event.
    pub fn subscribe(&self) -> Subscription {
        self.register(None)
    }

    /// Subscribes to events of the given kinds only.
    pub fn subscribe_filtered(&self, kinds: &[EventKind]) -> Subscription {
        self.register(Some(kinds.to_vec()))
    }

    fn register(&self, kinds: Option<Vec<EventKind>>) -> Subscription {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (sender, receiver) = mpsc::channel();
        self.subscribers.write().push(Subscriber { id, kinds, sender });
        Subscription { id, receiver }
    }

    /// Removes a subscription. Removing an unknown id is a no-op.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers.write().retain(|s| s.id != id);
    }

    /// Emits an event to all matching subscribers.
    pub fn emit(&self, event: ReplicationEvent) {
        let kind = event.kind();
        let mut subscribers = self.subscribers.write();
        subscribers.retain(|s| {
            let wanted = s.kinds.as_ref().is_none_or(|kinds| kinds.contains(&kind));
            if !wanted {
                return true;
            }
            s.sender.send(event.clone()).is_ok()
        });
    }

    /// Returns the number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

impl Default for ReplicationEmitter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn emit_and_receive() {
        let emitter = ReplicationEmitter::new();
        let sub = emitter.subscribe();

        emitter.emit(ReplicationEvent::Active);
        let event = sub.recv_timeout(Duration::from_millis(100)).unwrap();
        assert_eq!(event, ReplicationEvent::Active);
    }

    #[test]
    fn filtered_subscription_skips_other_kinds() {
        let emitter = ReplicationEmitter::new();
        let sub = emitter.subscribe_filtered(&[EventKind::Complete]);

        emitter.emit(ReplicationEvent::Active);
        emitter.emit(ReplicationEvent::Paused);
        emitter.emit(ReplicationEvent::Complete);

        let event = sub.recv_timeout(Duration::from_millis(100)).unwrap();
        assert_eq!(event, ReplicationEvent::Complete);
        assert!(sub.try_recv().is_none());
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let emitter = ReplicationEmitter::new();
        let sub = emitter.subscribe();
        assert_eq!(emitter.subscriber_count(), 1);

        emitter.unsubscribe(sub.id);
        assert_eq!(emitter.subscriber_count(), 0);

        emitter.emit(ReplicationEvent::Active);
        assert!(sub.try_recv().is_none());
    }

    #[test]
    fn unsubscribe_unknown_id_is_noop() {
        let emitter = ReplicationEmitter::new();
        let sub = emitter.subscribe();
        emitter.unsubscribe(sub.id);
        // Second removal of the same id.
        emitter.unsubscribe(sub.id);
        assert_eq!(emitter.subscriber_count(), 0);
    }

    #[test]
    fn disconnected_subscriber_is_pruned() {
        let emitter = ReplicationEmitter::new();
        let sub = emitter.subscribe();
        drop(sub);

        emitter.emit(ReplicationEvent::Paused);
        assert_eq!(emitter.subscriber_count(), 0);
    }

    #[test]
    fn events_buffered_before_receive() {
        // Registration is synchronous: events emitted right after subscribe
        // must be observable even when the receive happens later.
        let emitter = Arc::new(ReplicationEmitter::new());
        let sub = emitter.subscribe();

        let emitter_clone = Arc::clone(&emitter);
        let handle = thread::spawn(move || {
            emitter_clone.emit(ReplicationEvent::Change(None));
            emitter_clone.emit(ReplicationEvent::Paused);
        });
        handle.join().unwrap();

        assert_eq!(
            sub.recv_timeout(Duration::from_millis(100)).unwrap(),
            ReplicationEvent::Change(None)
        );
        assert_eq!(
            sub.recv_timeout(Duration::from_millis(100)).unwrap(),
            ReplicationEvent::Paused
        );
    }
}
