//! Reconnect timing configuration and the backoff schedule.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Timing knobs for cache-store reconnection.
///
/// The defaults are the production values: 50 ms base, 30 s ceiling,
/// up to 200 ms of jitter, an alert every 5th attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectConfig {
    /// Backoff unit in milliseconds. Attempt `n` waits `2^n` units.
    pub base_delay_ms: u64,
    /// Upper bound on the backoff part of the delay, in milliseconds.
    pub max_delay_ms: u64,
    /// Jitter is drawn uniformly from `[0, jitter_ceiling_ms)`.
    /// 0 disables jitter (deterministic delays, useful in tests).
    pub jitter_ceiling_ms: u64,
    /// Raise an alert on every attempt `n` with `n % alert_every == 0`
    /// (except `n = 0`).
    pub alert_every: u32,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 50,
            max_delay_ms: 30_000,
            jitter_ceiling_ms: 200,
            alert_every: 5,
        }
    }
}

impl ReconnectConfig {
    /// Same config with jitter disabled.
    pub fn without_jitter(self) -> Self {
        Self {
            jitter_ceiling_ms: 0,
            ..self
        }
    }

    /// Fixes out-of-range values so the config is safe to use.
    ///
    /// Called by [`ReconnectController::new`](crate::ReconnectController::new).
    /// Rules:
    /// - `alert_every` of 0 becomes 1.
    /// - `max_delay_ms` below `base_delay_ms` is raised to it.
    pub fn validated(mut self) -> Self {
        if self.alert_every == 0 {
            warn!("alert_every is 0, alerting on every retry instead");
            self.alert_every = 1;
        }
        if self.max_delay_ms < self.base_delay_ms {
            warn!(
                base_ms = self.base_delay_ms,
                max_ms = self.max_delay_ms,
                "max_delay_ms below base_delay_ms, raising ceiling"
            );
            self.max_delay_ms = self.base_delay_ms;
        }
        self
    }

    /// `min(2^attempt * base, max)`, without jitter.
    ///
    /// Saturates instead of overflowing, so any `attempt` is fine.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        let ms = factor
            .saturating_mul(self.base_delay_ms)
            .min(self.max_delay_ms);
        Duration::from_millis(ms)
    }

    /// A fresh jitter sample in `[0, jitter_ceiling_ms)`.
    pub fn jitter(&self) -> Duration {
        if self.jitter_ceiling_ms == 0 {
            return Duration::ZERO;
        }
        let ms = rand::rng().random_range(0..self.jitter_ceiling_ms);
        Duration::from_millis(ms)
    }

    /// Full delay before attempt `attempt`: backoff plus jitter.
    pub fn delay(&self, attempt: u32) -> Duration {
        self.backoff(attempt) + self.jitter()
    }

    /// Whether a failure at `attempt` should raise an alert.
    pub fn is_alert_attempt(&self, attempt: u32) -> bool {
        attempt > 0 && attempt % self.alert_every.max(1) == 0
    }
}
