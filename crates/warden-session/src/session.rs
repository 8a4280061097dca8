//! Session types: the records kept in the cache store.
//!
//! A session is the server's record of a logged-in client. It tracks:
//! - WHO it belongs to (`UserId`)
//! - WHERE it was created from (the client [`Fingerprint`])
//! - HOW often it has been revalidated (`version`)
//!
//! The session does not carry the user. The guard resolves the user on
//! every request and keeps the two side by side.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Session lifetime settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Sliding time-to-live, in seconds. Every successful revalidation
    /// resets the countdown to this value.
    ///
    /// Default: 7200 (two hours).
    pub ttl_secs: u64,
}

impl SessionConfig {
    /// The TTL as a [`Duration`].
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { ttl_secs: 7200 }
    }
}

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Opaque bearer token identifying one session.
///
/// Doubles as the client-visible session id. Only [`prefix`](Self::prefix)
/// should ever reach a log line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wraps an existing token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Generates a fresh token: 16 random bytes, lowercase hex (32 chars).
    pub fn generate() -> Self {
        Self(random_hex::<16>())
    }

    /// The full token.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The first 8 characters, for logging.
    pub fn prefix(&self) -> &str {
        self.0.get(..8).unwrap_or(&self.0)
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionToken {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

/// Identifier of a user in the primary store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wraps an existing id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a document-style id: 12 random bytes, lowercase hex.
    pub fn generate() -> Self {
        Self(random_hex::<12>())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

fn random_hex<const N: usize>() -> String {
    let bytes: [u8; N] = rand::rng().random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

// ---------------------------------------------------------------------------
// Fingerprint
// ---------------------------------------------------------------------------

/// The client identity a session is bound to.
///
/// Captured at creation and compared on every use. Both fields must match
/// exactly; there is no normalization.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fingerprint {
    /// The request's `User-Agent` header, empty when absent.
    pub user_agent: String,
    /// The resolved client IP address.
    pub user_address: String,
}

impl Fingerprint {
    /// Creates a fingerprint from a user agent and client address.
    pub fn new(user_agent: impl Into<String>, user_address: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            user_address: user_address.into(),
        }
    }

    /// Whether `session` was created from this client.
    pub fn matches(&self, session: &Session) -> bool {
        self.user_agent == session.user_agent && self.user_address == session.user_address
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One session record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Store key and bearer token.
    pub token: SessionToken,
    /// Owner of the session.
    pub user_id: UserId,
    /// User agent at creation time.
    pub user_agent: String,
    /// Client address at creation time.
    pub user_address: String,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the session was last revalidated. `None` until the first use.
    pub updated_at: Option<DateTime<Utc>>,
    /// Number of successful revalidations.
    pub version: u64,
}

impl Session {
    /// A fresh record: `version` 0, never updated.
    pub fn new(token: SessionToken, user_id: UserId, fingerprint: Fingerprint) -> Self {
        Self {
            token,
            user_id,
            user_agent: fingerprint.user_agent,
            user_address: fingerprint.user_address,
            created_at: Utc::now(),
            updated_at: None,
            version: 0,
        }
    }

    /// Records one successful revalidation.
    pub fn touch(&mut self) {
        self.version = self.version.saturating_add(1);
        self.updated_at = Some(Utc::now());
    }

    /// The fingerprint captured at creation.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::new(self.user_agent.clone(), self.user_address.clone())
    }
}
