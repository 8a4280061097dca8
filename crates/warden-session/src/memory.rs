//! In-process [`SessionStore`]: a TTL map with a per-user index.
//!
//! ```text
//!   records: token ──→ (Session, deadline)
//!   by_user: user_id ──→ {token, token, ...}
//! ```
//!
//! Both maps live behind one lock and are always updated together, so a
//! reader never sees a token in one map but not the other. Deadlines use
//! Tokio's clock; under a paused test runtime TTLs advance with
//! `tokio::time::advance`.
//!
//! Expired records are purged lazily, whenever a read or write touches
//! them, and in bulk by [`MemorySessionStore::purge_expired`]. Records
//! that are never touched again are only reclaimed by the bulk purge, so
//! long-running processes start [`MemorySessionStore::spawn_sweeper`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::{Fingerprint, Session, SessionConfig, SessionStore, SessionToken, StoreError, UserId};

struct Entry {
    session: Session,
    deadline: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.deadline > now
    }
}

#[derive(Default)]
struct Inner {
    records: HashMap<SessionToken, Entry>,
    by_user: HashMap<UserId, HashSet<SessionToken>>,
}

impl Inner {
    /// Removes `token` from both maps. Returns the entry if there was one.
    fn take(&mut self, token: &SessionToken) -> Option<Entry> {
        let entry = self.records.remove(token)?;
        let user_id = &entry.session.user_id;
        if let Some(tokens) = self.by_user.get_mut(user_id) {
            tokens.remove(token);
            if tokens.is_empty() {
                self.by_user.remove(user_id);
            }
        }
        Some(entry)
    }

    /// The live entry for `token`, purging it first if it has expired.
    fn live_mut(&mut self, token: &SessionToken, now: Instant) -> Option<&mut Entry> {
        let expired = self.records.get(token).is_some_and(|e| !e.is_live(now));
        if expired {
            self.take(token);
            return None;
        }
        self.records.get_mut(token)
    }
}

/// Session store kept in process memory.
pub struct MemorySessionStore {
    inner: Mutex<Inner>,
    config: SessionConfig,
}

impl MemorySessionStore {
    /// Creates an empty store using `config.ttl_secs` for new sessions.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            config,
        }
    }

    /// Time left before `token` expires, `None` if it isn't live.
    pub async fn ttl(&self, token: &SessionToken) -> Option<Duration> {
        let now = Instant::now();
        let mut inner = self.inner.lock().await;
        inner
            .live_mut(token, now)
            .map(|entry| entry.deadline.saturating_duration_since(now))
    }

    /// Drops every expired record. Returns how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut inner = self.inner.lock().await;
        let expired: Vec<SessionToken> = inner
            .records
            .iter()
            .filter(|(_, entry)| !entry.is_live(now))
            .map(|(token, _)| token.clone())
            .collect();
        for token in &expired {
            inner.take(token);
        }
        if !expired.is_empty() {
            tracing::debug!(count = expired.len(), "purged expired sessions");
        }
        expired.len()
    }

    /// Spawns a task that runs [`purge_expired`](Self::purge_expired)
    /// every `period` (at least 1 ms).
    ///
    /// The task holds only a weak reference and stops on the first tick
    /// after the last `Arc` to the store is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let store = Arc::downgrade(self);
        let period = period.max(Duration::from_millis(1));

        tokio::spawn(async move {
            let mut ticks = tokio::time::interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                let Some(store) = store.upgrade() else {
                    break;
                };
                store.purge_expired().await;
            }
            tracing::debug!("session sweeper stopped");
        })
    }

    /// Number of records held, live or not yet purged.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.records.len()
    }

    /// Returns `true` if no records are held.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl SessionStore for MemorySessionStore {
    async fn create(
        &self,
        user_id: &UserId,
        user_agent: &str,
        user_address: &str,
    ) -> Result<Session, StoreError> {
        let mut inner = self.inner.lock().await;

        let mut token = SessionToken::generate();
        while inner.records.contains_key(&token) {
            token = SessionToken::generate();
        }

        let session = Session::new(
            token.clone(),
            user_id.clone(),
            Fingerprint::new(user_agent, user_address),
        );
        let deadline = Instant::now() + self.config.ttl();

        inner
            .by_user
            .entry(user_id.clone())
            .or_default()
            .insert(token.clone());
        inner.records.insert(
            token.clone(),
            Entry {
                session: session.clone(),
                deadline,
            },
        );

        tracing::debug!(token = %token.prefix(), %user_id, "session stored");
        Ok(session)
    }

    async fn fetch(&self, token: &SessionToken) -> Result<Option<Session>, StoreError> {
        let now = Instant::now();
        let mut inner = self.inner.lock().await;
        Ok(inner.live_mut(token, now).map(|entry| entry.session.clone()))
    }

    async fn update(&self, session: &Session) -> Result<(), StoreError> {
        let now = Instant::now();
        let mut inner = self.inner.lock().await;

        let Some(entry) = inner.live_mut(&session.token, now) else {
            tracing::debug!(token = %session.token.prefix(), "update of missing session ignored");
            return Ok(());
        };
        let previous_owner = std::mem::replace(&mut entry.session, session.clone()).user_id;

        if previous_owner != session.user_id {
            if let Some(tokens) = inner.by_user.get_mut(&previous_owner) {
                tokens.remove(&session.token);
                if tokens.is_empty() {
                    inner.by_user.remove(&previous_owner);
                }
            }
            inner
                .by_user
                .entry(session.user_id.clone())
                .or_default()
                .insert(session.token.clone());
        }
        Ok(())
    }

    async fn expire(&self, token: &SessionToken, ttl: Duration) -> Result<bool, StoreError> {
        let now = Instant::now();
        let mut inner = self.inner.lock().await;
        match inner.live_mut(token, now) {
            Some(entry) => {
                entry.deadline = now + ttl;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove(&self, tokens: &[SessionToken]) -> Result<usize, StoreError> {
        let now = Instant::now();
        let mut inner = self.inner.lock().await;
        let removed = tokens
            .iter()
            .filter_map(|token| inner.take(token))
            .filter(|entry| entry.is_live(now))
            .count();
        Ok(removed)
    }

    async fn find_all_by_user(&self, user_id: &UserId) -> Result<Vec<Session>, StoreError> {
        let now = Instant::now();
        let mut inner = self.inner.lock().await;

        let tokens: Vec<SessionToken> = inner
            .by_user
            .get(user_id)
            .map(|tokens| tokens.iter().cloned().collect())
            .unwrap_or_default();

        let mut sessions: Vec<Session> = tokens
            .iter()
            .filter_map(|token| inner.live_mut(token, now).map(|e| e.session.clone()))
            .collect();
        sessions.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(sessions)
    }
}

// =========================================================================
// Tests
// =========================================================================
