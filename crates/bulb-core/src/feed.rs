//! Fan-out of state snapshots to subscribers.
//!
//! Each subscriber owns a bounded channel. Publishing never blocks: a
//! subscriber whose buffer is full misses that snapshot, and a subscriber
//! whose receiver has been dropped is pruned on the next publish.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};
use tracing::debug;

use crate::state::BulbState;

const FEED_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::feed");

/// Snapshots buffered per subscriber before updates are dropped.
pub const SUBSCRIBER_CAPACITY: usize = 32;

/// Registry of snapshot subscribers.
#[derive(Debug, Default)]
pub struct ChangeFeed {
    registry: Mutex<Registry>,
}

#[derive(Debug, Default)]
struct Registry {
    senders: Vec<Sender<BulbState>>,
    closed: bool,
}

impl ChangeFeed {
    /// Creates a feed without subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new subscriber.
    ///
    /// After [`close`](Self::close) the subscription is born closed.
    pub fn subscribe(&self) -> Subscription {
        let (sender, receiver) = crossbeam_channel::bounded(SUBSCRIBER_CAPACITY);
        let mut registry = self.lock();
        if !registry.closed {
            registry.senders.push(sender);
        }
        Subscription { receiver }
    }

    /// Delivers `snapshot` to every live subscriber.
    ///
    /// Returns the number of subscribers that accepted the snapshot.
    pub fn publish(&self, snapshot: &BulbState) -> usize {
        let mut registry = self.lock();
        let mut delivered = 0;
        registry.senders.retain(|sender| match sender.try_send(snapshot.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(TrySendError::Full(_)) => {
                debug!(target: FEED_TARGET, "subscriber lagging; snapshot dropped");
                true
            }
            Err(TrySendError::Disconnected(_)) => {
                debug!(target: FEED_TARGET, "subscriber disconnected");
                false
            }
        });
        delivered
    }

    /// Number of registered subscribers, including ones not yet pruned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.lock().senders.len()
    }

    /// Drops every subscriber so their receivers observe disconnection, and
    /// refuses new ones.
    pub fn close(&self) {
        let mut registry = self.lock();
        registry.closed = true;
        registry.senders.clear();
    }

    // The registry holds no invariants a panic could break.
    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Receiving end of a feed subscription.
#[derive(Debug)]
pub struct Subscription {
    receiver: Receiver<BulbState>,
}

/// Outcome of waiting on a [`Subscription`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    /// A new snapshot was published.
    Snapshot(BulbState),
    /// Nothing arrived before the timeout.
    Idle,
    /// The feed was closed.
    Closed,
}

impl Subscription {
    /// Waits up to `timeout` for the next snapshot.
    #[must_use]
    pub fn next_timeout(&self, timeout: Duration) -> FeedEvent {
        match self.receiver.recv_timeout(timeout) {
            Ok(snapshot) => FeedEvent::Snapshot(snapshot),
            Err(RecvTimeoutError::Timeout) => FeedEvent::Idle,
            Err(RecvTimeoutError::Disconnected) => FeedEvent::Closed,
        }
    }

    /// Returns a snapshot if one is already queued.
    #[must_use]
    pub fn try_next(&self) -> Option<BulbState> {
        self.receiver.try_recv().ok()
    }
}
