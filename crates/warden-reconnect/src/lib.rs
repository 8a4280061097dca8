//! Cache-store reconnection policy for Warden.
//!
//! When the cache store drops, its client keeps trying to reconnect. This
//! crate decides how long to wait before each attempt, how loudly to
//! complain, and what the rest of the process should believe about the
//! store in the meantime.
//!
//! # Pieces
//!
//! - [`ReconnectConfig`]: backoff base, ceiling, jitter ceiling, alert cadence
//! - [`ConnectFault`]: client errors, classified retry-handled vs. escalated
//! - [`ReconnectController`]: state machine that turns [`CacheEvent`]s into
//!   tracker writes and a [`Reaction`]
//! - [`spawn_controller`] / [`ControllerHandle`]: runs the controller as the
//!   single consumer of client events
//! - [`reconnect`] + [`Connector`]: the retry loop a cache client runs
//!
//! # Delay schedule
//!
//! ```text
//! attempt n:   0    1    2    3    4    5  ...  9     10+
//! backoff ms:  50   100  200  400  800  1600   25600 30000 (cap)
//! + jitter in [0, 200) ms
//! alert:                           ✓ (n=5)     ✓ (n=10)
//! ```
//!
//! The controller never terminates the process. An escalated fault is
//! reported and handed back; whether it is fatal is the caller's call.

mod config;
mod controller;
mod driver;
mod error;
mod fault;
mod handle;

pub use config::ReconnectConfig;
pub use controller::{CacheEvent, Notice, Reaction, ReconnectController};
pub use driver::{Connector, reconnect};
pub use error::ReconnectError;
pub use fault::{ConnectFault, FaultClass};
pub use handle::{ControllerHandle, spawn_controller};
