//! Replication primitive exposed by a document store.

use crate::events::ReplicationEmitter;
use std::sync::Arc;
use std::time::Duration;

/// Direction of a replication session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplicationMode {
    /// One-directional push to the remote.
    Out,
    /// One-directional pull from the remote.
    In,
    /// Bidirectional replication.
    Sync,
}

impl ReplicationMode {
    /// Returns the lowercase wire name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplicationMode::Out => "out",
            ReplicationMode::In => "in",
            ReplicationMode::Sync => "sync",
        }
    }
}

impl std::fmt::Display for ReplicationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options passed through to the engine's replication primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicationOptions {
    /// Keep the session running indefinitely, reacting to future changes.
    pub live: bool,
    /// Retry on transient connection loss.
    pub retry: bool,
    /// Heartbeat interval forwarded to the engine.
    pub heartbeat: Option<Duration>,
    /// Connection timeout forwarded to the engine.
    pub timeout: Option<Duration>,
}

impl ReplicationOptions {
    /// Creates options with `live` and `retry` set; no tuning knobs.
    pub fn live_retry() -> Self {
        Self {
            live: true,
            retry: true,
            heartbeat: None,
            timeout: None,
        }
    }

    /// Sets the live flag.
    pub fn with_live(mut self, live: bool) -> Self {
        self.live = live;
        self
    }

    /// Sets the retry flag.
    pub fn with_retry(mut self, retry: bool) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the heartbeat interval.
    pub fn with_heartbeat(mut self, heartbeat: Duration) -> Self {
        self.heartbeat = Some(heartbeat);
        self
    }

    /// Sets the connection timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for ReplicationOptions {
    fn default() -> Self {
        Self {
            live: false,
            retry: false,
            heartbeat: None,
            timeout: None,
        }
    }
}

/// A running (or about-to-run) replication session owned by the engine.
///
/// Handles are created inert: no event is emitted before [`start`] is
/// called. This lets callers attach listeners first; losing the first event
/// is a correctness bug, not a missed optimization. `cancel` is idempotent
/// and the first call makes the session emit a terminal
/// [`ReplicationEvent::Complete`](crate::ReplicationEvent::Complete).
///
/// [`start`]: ReplicationHandle::start
pub trait ReplicationHandle: Send + Sync {
    /// Returns the emitter this session reports through.
    fn emitter(&self) -> Arc<ReplicationEmitter>;

    /// Begins emitting events. Calling `start` more than once is a no-op.
    fn start(&self);

    /// Cancels the session. Idempotent; the first call emits `Complete`.
    fn cancel(&self);

    /// Returns true once the session has been cancelled.
    fn is_cancelled(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_names() {
        assert_eq!(ReplicationMode::Out.as_str(), "out");
        assert_eq!(ReplicationMode::In.as_str(), "in");
        assert_eq!(ReplicationMode::Sync.to_string(), "sync");
    }

    #[test]
    fn options_builder() {
        let options = ReplicationOptions::live_retry()
            .with_heartbeat(Duration::from_secs(10))
            .with_timeout(Duration::from_secs(30));

        assert!(options.live);
        assert!(options.retry);
        assert_eq!(options.heartbeat, Some(Duration::from_secs(10)));
        assert_eq!(options.timeout, Some(Duration::from_secs(30)));

        let options = ReplicationOptions::default();
        assert!(!options.live);
        assert!(!options.retry);
    }
}
