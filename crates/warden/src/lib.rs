//! # Warden
//!
//! Session and connectivity-state core for API backends.
//!
//! Warden sits between an API layer and two backing stores: a primary
//! store holding users and a cache store holding sessions. It keeps track
//! of whether each store is usable, reconnects to the cache store with
//! backoff, and turns bearer tokens into validated sessions bound to the
//! client that created them.
//!
//! ```text
//!  request ──→ RequestMeta ──→ Warden::context ──→ RequestContext
//!                                   │                   │
//!                              SessionGuard        authorize / log_in /
//!                                   │              log_out / queries
//!                   ┌───────────────┼───────────────┐
//!                   ▼               ▼               ▼
//!             SessionStore    UserDirectory    StatusTracker ◄── reconnect
//!             (cache store)  (primary store)                     controller
//! ```
//!
//! Mutations report domain failures as [`Outcome`] envelopes. Requests
//! that cannot continue fail with a [`WardenError`] carrying a
//! machine-readable code and an HTTP status hint.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use warden::prelude::*;
//!
//! # struct Hashes;
//! # impl CredentialVerifier for Hashes {
//! #     fn verify(&self, _: &str, _: &str) -> bool { false }
//! # }
//! # async fn demo() -> Result<(), WardenError> {
//! let status = SharedStatus::new();
//! let warden = WardenBuilder::new().build(
//!     Arc::new(MemorySessionStore::default()),
//!     Arc::new(MemoryUserDirectory::new()),
//!     status.clone(),
//!     Hashes,
//! );
//!
//! let meta = RequestMeta::new()
//!     .header("authorization", "Bearer 9f2c...")
//!     .header("user-agent", "curl/8.0");
//! let ctx = warden.context(meta).await?;
//! let me = warden.current_user(&ctx);
//! # let _ = me;
//! # Ok(())
//! # }
//! ```

mod config;
mod context;
mod credentials;
mod error;
mod mutations;
mod queries;
mod request;
mod service;
pub mod telemetry;
mod views;

pub use config::WardenConfig;
pub use context::RequestContext;
pub use credentials::CredentialVerifier;
pub use error::WardenError;
pub use request::RequestMeta;
pub use service::{ADMIN, Warden, WardenBuilder};
pub use views::{LogInInput, LogInPayload, LogOutAllPayload, SessionView};

pub use warden_outcome as outcome;
pub use warden_outcome::{Outcome, OutcomeEnvelope, Severity};
pub use warden_reconnect as reconnect;
pub use warden_session as session;
pub use warden_status as status;

/// Everything needed to wire Warden into a service.
pub mod prelude {
    pub use crate::{
        ADMIN, CredentialVerifier, LogInInput, LogInPayload, LogOutAllPayload, RequestContext,
        RequestMeta, SessionView, Warden, WardenBuilder, WardenConfig, WardenError,
    };
    pub use warden_outcome::{Outcome, OutcomeEnvelope, Severity};
    pub use warden_reconnect::{
        CacheEvent, ConnectFault, Connector, ControllerHandle, ReconnectConfig,
        ReconnectController, reconnect, spawn_controller,
    };
    pub use warden_session::{
        AuthenticatedSession, Fingerprint, GuardConfig, MemorySessionStore,
        MemoryUserDirectory, NewUser, Session, SessionConfig, SessionError, SessionStore,
        SessionToken, StoreError, User, UserDirectory, UserId, UserType,
    };
    pub use warden_status::{
        ConnectivityState, SharedStatus, StatusEvent, StatusTracker, StoreKind,
        spawn_status_consumer,
    };
}
