//! Bearer-token sessions for Warden.
//!
//! This crate covers everything between "a request arrived with a token"
//! and "downstream code holds a validated session and its user":
//!
//! 1. **Records**: [`Session`], keyed by an opaque [`SessionToken`] and
//!    bound to the client [`Fingerprint`] it was created with
//! 2. **Storage**: the [`SessionStore`] trait (cache store with TTL) and
//!    the in-process [`MemorySessionStore`]
//! 3. **Users**: the [`UserDirectory`] trait (primary store, read side
//!    of the user collection) and [`MemoryUserDirectory`]
//! 4. **Validation**: [`SessionGuard`], the per-request check that
//!    turns a token into an [`AuthenticatedSession`] or refuses it
//!
//! # How it fits in the stack
//!
//! ```text
//! warden (above)  ← request context, login/logout, access checks
//!     ↕
//! Session layer (this crate)  ← token → session → user, fail-closed
//!     ↕
//! warden-status (below)  ← is the cache/primary store usable right now?
//! ```
//!
//! Sessions and users are never stored together. The guard joins them at
//! read time and hands the pair out as one [`AuthenticatedSession`].

#![allow(async_fn_in_trait)]

mod directory;
mod error;
mod guard;
mod memory;
mod session;
mod store;
mod user;

pub use directory::MemoryUserDirectory;
pub use error::{SessionError, StoreError};
pub use guard::{AuthenticatedSession, GuardConfig, SessionGuard};
pub use memory::MemorySessionStore;
pub use session::{Fingerprint, Session, SessionConfig, SessionToken, UserId};
pub use store::SessionStore;
pub use user::{
    DeleteResult, NewUser, Projection, User, UserDirectory, UserFilter, UserType,
};
