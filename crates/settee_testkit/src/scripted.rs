//! Scripted replication event driver.
//!
//! Replication-timing tests need a stream with a controlled temporal
//! shape. An [`EventScript`] plays a fixed sequence of delay/event pairs
//! against an emitter from a background thread.

use settee_store::{ReplicationEmitter, ReplicationEvent};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// A timed sequence of replication events.
#[derive(Debug, Clone, Default)]
pub struct EventScript {
    steps: Vec<(Duration, ReplicationEvent)>,
}

impl EventScript {
    /// Creates an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event to emit after sleeping `delay` from the previous
    /// step.
    pub fn then_after(mut self, delay: Duration, event: ReplicationEvent) -> Self {
        self.steps.push((delay, event));
        self
    }

    /// Appends an event to emit immediately after the previous step.
    pub fn then(self, event: ReplicationEvent) -> Self {
        self.then_after(Duration::ZERO, event)
    }

    /// Appends `count` repetitions of `event`, `spacing` apart.
    pub fn burst(mut self, count: usize, spacing: Duration, event: ReplicationEvent) -> Self {
        for _ in 0..count {
            self.steps.push((spacing, event.clone()));
        }
        self
    }

    /// Plays the script against `emitter` from a background thread.
    ///
    /// Join the returned handle to wait for the script to finish.
    pub fn play(self, emitter: Arc<ReplicationEmitter>) -> JoinHandle<()> {
        thread::spawn(move || {
            for (delay, event) in self.steps {
                if !delay.is_zero() {
                    thread::sleep(delay);
                }
                emitter.emit(event);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use settee_store::EventKind;

    #[test]
    fn script_plays_in_order() {
        let emitter = Arc::new(ReplicationEmitter::new());
        let sub = emitter.subscribe();

        EventScript::new()
            .then(ReplicationEvent::Active)
            .then_after(Duration::from_millis(10), ReplicationEvent::Paused)
            .play(Arc::clone(&emitter))
            .join()
            .unwrap();

        assert_eq!(
            sub.recv_timeout(Duration::from_millis(100)).unwrap(),
            ReplicationEvent::Active
        );
        assert_eq!(
            sub.recv_timeout(Duration::from_millis(100)).unwrap(),
            ReplicationEvent::Paused
        );
    }

    #[test]
    fn burst_emits_count_events() {
        let emitter = Arc::new(ReplicationEmitter::new());
        let sub = emitter.subscribe_filtered(&[EventKind::Change]);

        EventScript::new()
            .burst(3, Duration::from_millis(5), ReplicationEvent::Change(None))
            .play(Arc::clone(&emitter))
            .join()
            .unwrap();

        for _ in 0..3 {
            sub.recv_timeout(Duration::from_millis(100)).unwrap();
        }
        assert!(sub.try_recv().is_none());
    }
}
