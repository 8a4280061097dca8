//! The reconnection state machine.
//!
//! The controller owns the attempt counter and is the only thing that
//! writes the cache store's connectivity state in response to client
//! events. Each event is handled in the same order every time:
//!
//!   1. classify (for failures)
//!   2. write the tracker
//!   3. log the notice
//!
//! so that anyone who sees a notice in the logs and then reads the tracker
//! gets a state at least as new as the notice.

use std::time::Duration;

use warden_status::{ConnectivityState, StatusTracker, StoreKind};

use crate::{ConnectFault, FaultClass, ReconnectConfig};

// ---------------------------------------------------------------------------
// Events in, reactions out
// ---------------------------------------------------------------------------

/// Lifecycle events emitted by the cache-store client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    /// The client is about to (re)connect.
    Connecting,
    /// The client connected and is ready for commands.
    Ready,
    /// The client closed its connection on purpose.
    Closed,
    /// A connection attempt or live connection failed.
    Failed(ConnectFault),
}

/// Severity of the notice attached to a retried failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// Ordinary retry; logged at `WARN`.
    Retrying,
    /// Every `alert_every`-th attempt; logged at `ERROR`. Non-fatal.
    Alert,
}

/// What the controller decided about one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reaction {
    /// The event only updated the tracker.
    Applied,
    /// Retry after `delay`. `attempt` is the 0-based attempt the delay was
    /// computed for.
    Retry {
        /// 0-based attempt number this failure counted as.
        attempt: u32,
        /// How long to wait before the next attempt.
        delay: Duration,
        /// Which notice was emitted.
        notice: Notice,
    },
    /// The fault is not retry-handled; the tracker now reads `Error`.
    Escalated(ConnectFault),
}

// ---------------------------------------------------------------------------
// ReconnectController
// ---------------------------------------------------------------------------

/// Decides reconnect delays and feeds cache-store state into the tracker.
///
/// ```text
///  Connecting ──→ tracker: Connecting
///  Ready      ──→ tracker: Connected, attempt ← 0
///  Closed     ──→ tracker: Disconnected
///  Failed     ──→ retry-handled? ── yes ──→ tracker: Connecting,
///                      │                    delay(attempt), notice,
///                      │                    attempt += 1
///                      └──── no ───→ tracker: Error, escalate
/// ```
pub struct ReconnectController<T: StatusTracker> {
    config: ReconnectConfig,
    tracker: T,
    /// 0-based number of the next failed attempt.
    attempt: u32,
    alerts: u64,
}

impl<T: StatusTracker> ReconnectController<T> {
    /// Creates a controller writing to `tracker`.
    pub fn new(config: ReconnectConfig, tracker: T) -> Self {
        Self {
            config: config.validated(),
            tracker,
            attempt: 0,
            alerts: 0,
        }
    }

    /// The attempt number the next failure will be counted as.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Total alerts raised since the controller was created.
    pub fn alerts_raised(&self) -> u64 {
        self.alerts
    }

    /// The (validated) configuration in use.
    pub fn config(&self) -> &ReconnectConfig {
        &self.config
    }

    /// Handles one client event.
    pub fn handle(&mut self, event: CacheEvent) -> Reaction {
        match event {
            CacheEvent::Connecting => {
                self.tracker
                    .set(StoreKind::Cache, ConnectivityState::Connecting);
                tracing::info!("connecting to cache store");
                Reaction::Applied
            }
            CacheEvent::Ready => {
                self.tracker
                    .set(StoreKind::Cache, ConnectivityState::Connected);
                if self.attempt > 0 {
                    tracing::info!(
                        attempts = self.attempt,
                        "cache store reconnected"
                    );
                } else {
                    tracing::info!("cache store connection established");
                }
                self.attempt = 0;
                Reaction::Applied
            }
            CacheEvent::Closed => {
                self.tracker
                    .set(StoreKind::Cache, ConnectivityState::Disconnected);
                tracing::info!("cache store connection closed");
                Reaction::Applied
            }
            CacheEvent::Failed(fault) => self.handle_failure(fault),
        }
    }

    fn handle_failure(&mut self, fault: ConnectFault) -> Reaction {
        let current = self.tracker.get(StoreKind::Cache);

        match fault.classify(current) {
            FaultClass::RetryHandled => {
                self.tracker
                    .set(StoreKind::Cache, ConnectivityState::Connecting);

                let attempt = self.attempt;
                let delay = self.config.delay(attempt);
                let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);

                let notice = if self.config.is_alert_attempt(attempt) {
                    self.alerts += 1;
                    tracing::error!(
                        attempt,
                        delay_ms,
                        error = %fault,
                        "cache store unreachable; sessions unavailable until it returns"
                    );
                    Notice::Alert
                } else {
                    tracing::warn!(
                        attempt,
                        delay_ms,
                        error = %fault,
                        "cache store connection lost, retrying"
                    );
                    Notice::Retrying
                };

                self.attempt = self.attempt.saturating_add(1);
                Reaction::Retry {
                    attempt,
                    delay,
                    notice,
                }
            }
            FaultClass::Escalate => {
                self.tracker.set(StoreKind::Cache, ConnectivityState::Error);
                tracing::error!(
                    error = %fault,
                    previous = %current,
                    "cache store client error"
                );
                Reaction::Escalated(fault)
            }
        }
    }
}
