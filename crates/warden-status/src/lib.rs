//! Connectivity state tracking for Warden.
//!
//! Warden sits on two backing stores: the **primary store** (system of
//! record for users) and the **cache store** (session records with TTL).
//! Request handlers need to know, without blocking, whether each store is
//! usable right now. This crate keeps that knowledge:
//!
//! 1. **State**: [`ConnectivityState`] per [`StoreKind`]
//! 2. **Tracker**: [`StatusTracker`] trait and the atomic [`SharedStatus`]
//! 3. **Events**: [`StatusEvent`]s sent by store clients and applied by a
//!    single consumer task ([`spawn_status_consumer`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Store client callbacks ──(StatusEvent)──→ consumer task ──→ SharedStatus
//!                                                                 ↑
//! Reconnect controller ──────────────────────────── set() ────────┤
//!                                                                 │
//! Session guard / request handlers ───────────────── get() ───────┘
//! ```
//!
//! The tracker never validates transitions: any state may follow any
//! other, because store clients deliver callbacks out of order.

mod error;
mod events;
mod state;
mod tracker;

pub use error::StatusError;
pub use events::{StatusEvent, StatusSender, spawn_status_consumer};
pub use state::{ConnectivityState, StatusSnapshot, StoreKind};
pub use tracker::{SharedStatus, StatusTracker};
