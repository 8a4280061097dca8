//! The tracker trait and its atomic implementation.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::{ConnectivityState, StatusSnapshot, StoreKind};

/// Read/write access to the per-store connectivity state.
///
/// Passed explicitly into the reconnection controller and the session
/// guard instead of living in a global, so tests can hand in a tracker
/// with whatever state they need.
///
/// # Trait bounds
///
/// - `Send + Sync` → written by the controller task and read by every
///   request task at the same time.
/// - `'static` → owned by long-lived tasks.
pub trait StatusTracker: Send + Sync + 'static {
    /// Returns the latest known state of `store`.
    fn get(&self, store: StoreKind) -> ConnectivityState;

    /// Records `state` for `store` and returns it.
    ///
    /// No transition check: any state may follow any other.
    fn set(&self, store: StoreKind, state: ConnectivityState) -> ConnectivityState;

    /// Shorthand for `get(store).is_connected()`.
    fn is_connected(&self, store: StoreKind) -> bool {
        self.get(store).is_connected()
    }

    /// Reads both stores.
    fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            primary: self.get(StoreKind::Primary),
            cache: self.get(StoreKind::Cache),
        }
    }
}

impl<T: StatusTracker> StatusTracker for Arc<T> {
    fn get(&self, store: StoreKind) -> ConnectivityState {
        (**self).get(store)
    }

    fn set(&self, store: StoreKind, state: ConnectivityState) -> ConnectivityState {
        (**self).set(store, state)
    }
}

// ---------------------------------------------------------------------------
// SharedStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Slots {
    primary: AtomicU8,
    cache: AtomicU8,
}

impl Slots {
    fn slot(&self, store: StoreKind) -> &AtomicU8 {
        match store {
            StoreKind::Primary => &self.primary,
            StoreKind::Cache => &self.cache,
        }
    }
}

/// Process-wide connectivity record backed by two atomics.
///
/// Cloning is cheap and every clone sees the same state. Both slots start
/// at [`ConnectivityState::Uninitialized`] (raw value 0).
#[derive(Debug, Clone, Default)]
pub struct SharedStatus {
    slots: Arc<Slots>,
}

impl SharedStatus {
    /// Creates a tracker with both stores `Uninitialized`.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatusTracker for SharedStatus {
    fn get(&self, store: StoreKind) -> ConnectivityState {
        ConnectivityState::from_raw(self.slots.slot(store).load(Ordering::Acquire))
    }

    fn set(&self, store: StoreKind, state: ConnectivityState) -> ConnectivityState {
        let previous = ConnectivityState::from_raw(
            self.slots.slot(store).swap(state.to_raw(), Ordering::AcqRel),
        );
        if previous != state {
            tracing::debug!(%store, from = %previous, to = %state, "connectivity changed");
        }
        state
    }
}
