//! Connectivity events and the single consumer that applies them.
//!
//! Store clients report lifecycle changes from their own callbacks, which
//! may run on any thread and in any order. Instead of letting each callback
//! write the tracker, they send a [`StatusEvent`] down a channel and one
//! Tokio task applies the events in arrival order. The tracker then has a
//! single writer for client-driven changes.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::{ConnectivityState, StatusError, StatusTracker, StoreKind};

/// "Store X is now in state Y", as reported by the store's client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusEvent {
    /// The store the event is about.
    pub store: StoreKind,
    /// The state the client reported.
    pub state: ConnectivityState,
}

/// Cloneable sending half handed to store clients.
#[derive(Debug, Clone)]
pub struct StatusSender {
    tx: mpsc::Sender<StatusEvent>,
}

impl StatusSender {
    /// Queues an event, waiting if the queue is full.
    ///
    /// # Errors
    /// [`StatusError::ConsumerClosed`] if the consumer task has stopped.
    pub async fn send(
        &self,
        store: StoreKind,
        state: ConnectivityState,
    ) -> Result<(), StatusError> {
        self.tx
            .send(StatusEvent { store, state })
            .await
            .map_err(|_| StatusError::ConsumerClosed)
    }

    /// Queues an event without waiting. For synchronous client callbacks.
    ///
    /// # Errors
    /// - [`StatusError::QueueFull`]: the consumer is behind
    /// - [`StatusError::ConsumerClosed`]: the consumer task has stopped
    pub fn try_send(
        &self,
        store: StoreKind,
        state: ConnectivityState,
    ) -> Result<(), StatusError> {
        self.tx
            .try_send(StatusEvent { store, state })
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => StatusError::QueueFull,
                mpsc::error::TrySendError::Closed(_) => StatusError::ConsumerClosed,
            })
    }
}

/// Spawns the consumer task and returns its sender and join handle.
///
/// The task runs until every [`StatusSender`] clone has been dropped.
/// `capacity` bounds the queue; it is clamped to at least 1.
pub fn spawn_status_consumer<T: StatusTracker>(
    tracker: T,
    capacity: usize,
) -> (StatusSender, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let handle = tokio::spawn(consume(tracker, rx));
    (StatusSender { tx }, handle)
}

async fn consume<T: StatusTracker>(tracker: T, mut rx: mpsc::Receiver<StatusEvent>) {
    tracing::debug!("status consumer started");

    while let Some(StatusEvent { store, state }) = rx.recv().await {
        // Write first, log second: a reader that sees the log line must
        // also see the new state.
        tracker.set(store, state);

        match state {
            ConnectivityState::Connected => {
                tracing::info!(%store, "store connection established");
            }
            ConnectivityState::Connecting => {
                tracing::info!(%store, "attempting store connection");
            }
            ConnectivityState::Disconnected => {
                tracing::warn!(%store, "store disconnected");
            }
            ConnectivityState::Error => {
                tracing::error!(%store, "store reported an error");
            }
            ConnectivityState::Uninitialized => {
                tracing::debug!(%store, "store reset to uninitialized");
            }
        }
    }

    tracing::debug!("status consumer stopped");
}
