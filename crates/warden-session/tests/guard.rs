//! Integration tests for `SessionGuard` over the in-memory stores.
//!
//! Covers the full revalidation contract: fingerprint binding, stale
//! users, degraded connectivity, version bumps and sliding TTL.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::time::advance;
use warden_session::{
    Fingerprint, GuardConfig, MemorySessionStore, MemoryUserDirectory, NewUser, Session,
    SessionConfig, SessionError, SessionGuard, SessionStore, SessionToken, StoreError,
    UserDirectory, UserFilter, UserId, UserType,
};
use warden_status::{ConnectivityState, SharedStatus, StatusTracker, StoreKind};

// =========================================================================
// Helpers
// =========================================================================

const TWO_HOURS: Duration = Duration::from_secs(7200);

/// Session store that counts every call before delegating.
#[derive(Default)]
struct CountingStore {
    inner: MemorySessionStore,
    calls: AtomicUsize,
}

impl CountingStore {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl SessionStore for CountingStore {
    async fn create(
        &self,
        user_id: &UserId,
        user_agent: &str,
        user_address: &str,
    ) -> Result<Session, StoreError> {
        self.hit();
        self.inner.create(user_id, user_agent, user_address).await
    }

    async fn fetch(&self, token: &SessionToken) -> Result<Option<Session>, StoreError> {
        self.hit();
        self.inner.fetch(token).await
    }

    async fn update(&self, session: &Session) -> Result<(), StoreError> {
        self.hit();
        self.inner.update(session).await
    }

    async fn expire(&self, token: &SessionToken, ttl: Duration) -> Result<bool, StoreError> {
        self.hit();
        self.inner.expire(token, ttl).await
    }

    async fn remove(&self, tokens: &[SessionToken]) -> Result<usize, StoreError> {
        self.hit();
        self.inner.remove(tokens).await
    }

    async fn find_all_by_user(&self, user_id: &UserId) -> Result<Vec<Session>, StoreError> {
        self.hit();
        self.inner.find_all_by_user(user_id).await
    }
}

type TestGuard = SessionGuard<Arc<CountingStore>, Arc<MemoryUserDirectory>, SharedStatus>;

struct Harness {
    guard: TestGuard,
    store: Arc<CountingStore>,
    users: Arc<MemoryUserDirectory>,
    status: SharedStatus,
}

fn harness() -> Harness {
    let store = Arc::new(CountingStore::default());
    let users = Arc::new(MemoryUserDirectory::new());
    let status = SharedStatus::new();
    status.set(StoreKind::Primary, ConnectivityState::Connected);
    status.set(StoreKind::Cache, ConnectivityState::Connected);

    let guard = SessionGuard::new(
        Arc::clone(&store),
        Arc::clone(&users),
        status.clone(),
        &SessionConfig::default(),
        GuardConfig::default(),
    );
    Harness {
        guard,
        store,
        users,
        status,
    }
}

async fn register(users: &MemoryUserDirectory, email: &str) -> UserId {
    users
        .create(NewUser {
            user_type: UserType::Normal,
            email: email.into(),
            password: Some("pw".into()),
            permissions: vec![],
            created_by: None,
        })
        .await
        .expect("create user")
        .id
}

fn fp(ua: &str, ip: &str) -> Fingerprint {
    Fingerprint::new(ua, ip)
}

// =========================================================================
// Revalidation
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_matching_fingerprint_bumps_version_to_one() {
    let h = harness();
    let uid = register(&h.users, "a@x.io").await;
    let session = h.store.create(&uid, "A", "1.2.3.4").await.unwrap();

    let auth = h
        .guard
        .authenticate(Some(session.token.as_str()), &fp("A", "1.2.3.4"))
        .await
        .unwrap()
        .expect("session");

    assert_eq!(auth.session.version, 1);
    assert_eq!(auth.user.id, uid);
    let stored = h.store.fetch(&session.token).await.unwrap().unwrap();
    assert_eq!(stored.version, 1);
}

#[tokio::test(start_paused = true)]
async fn test_each_revalidation_strictly_increments_version() {
    let h = harness();
    let uid = register(&h.users, "a@x.io").await;
    let session = h.store.create(&uid, "A", "1.2.3.4").await.unwrap();

    let mut versions = Vec::new();
    for _ in 0..3 {
        let auth = h
            .guard
            .authenticate(Some(session.token.as_str()), &fp("A", "1.2.3.4"))
            .await
            .unwrap()
            .expect("session");
        versions.push(auth.session.version);
    }

    assert_eq!(versions, vec![1, 2, 3]);
}

#[tokio::test(start_paused = true)]
async fn test_revalidation_resets_ttl_to_full_two_hours() {
    let h = harness();
    let uid = register(&h.users, "a@x.io").await;
    let session = h.store.create(&uid, "A", "1.2.3.4").await.unwrap();
    advance(Duration::from_secs(5000)).await;
    assert_eq!(
        h.store.inner.ttl(&session.token).await,
        Some(TWO_HOURS - Duration::from_secs(5000))
    );

    h.guard
        .authenticate(Some(session.token.as_str()), &fp("A", "1.2.3.4"))
        .await
        .unwrap()
        .expect("session");

    assert_eq!(h.store.inner.ttl(&session.token).await, Some(TWO_HOURS));
}

#[tokio::test(start_paused = true)]
async fn test_sliding_ttl_keeps_active_session_alive() {
    let h = harness();
    let uid = register(&h.users, "a@x.io").await;
    let session = h.store.create(&uid, "A", "1.2.3.4").await.unwrap();

    // Four uses, each 1.5 h apart: six hours total, never idle for two.
    for _ in 0..4 {
        advance(Duration::from_secs(5400)).await;
        let auth = h
            .guard
            .authenticate(Some(session.token.as_str()), &fp("A", "1.2.3.4"))
            .await
            .unwrap();
        assert!(auth.is_some());
    }
}

#[tokio::test(start_paused = true)]
async fn test_idle_session_expires_after_ttl() {
    let h = harness();
    let uid = register(&h.users, "a@x.io").await;
    let session = h.store.create(&uid, "A", "1.2.3.4").await.unwrap();

    advance(TWO_HOURS).await;

    let auth = h
        .guard
        .authenticate(Some(session.token.as_str()), &fp("A", "1.2.3.4"))
        .await
        .unwrap();
    assert!(auth.is_none());
}

// =========================================================================
// Fail-closed denials
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_user_agent_mismatch_denies_and_deletes_session() {
    let h = harness();
    let uid = register(&h.users, "a@x.io").await;
    let session = h.store.create(&uid, "A", "1.2.3.4").await.unwrap();
    h.guard
        .authenticate(Some(session.token.as_str()), &fp("A", "1.2.3.4"))
        .await
        .unwrap()
        .expect("first use succeeds");

    let err = h
        .guard
        .authenticate(Some(session.token.as_str()), &fp("B", "1.2.3.4"))
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::CredentialMismatch));
    assert!(h.store.fetch(&session.token).await.unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_mismatch_is_deterministic_across_sessions() {
    let h = harness();
    let uid = register(&h.users, "a@x.io").await;

    for _ in 0..10 {
        let session = h.store.create(&uid, "A", "1.2.3.4").await.unwrap();

        let result = h
            .guard
            .authenticate(Some(session.token.as_str()), &fp("A", "4.3.2.1"))
            .await;

        assert!(matches!(result, Err(SessionError::CredentialMismatch)));
        assert!(h.store.fetch(&session.token).await.unwrap().is_none());
    }
}

#[tokio::test(start_paused = true)]
async fn test_mismatch_never_falls_back_to_anonymous() {
    let h = harness();
    let uid = register(&h.users, "a@x.io").await;
    let session = h.store.create(&uid, "A", "1.2.3.4").await.unwrap();

    let first = h
        .guard
        .authenticate(Some(session.token.as_str()), &fp("B", "1.2.3.4"))
        .await;
    // The record is gone now, so a retry with the right fingerprint is
    // simply unknown; the original request was still denied.
    let retry = h
        .guard
        .authenticate(Some(session.token.as_str()), &fp("A", "1.2.3.4"))
        .await;

    assert!(first.is_err());
    assert!(matches!(retry, Ok(None)));
}

#[tokio::test(start_paused = true)]
async fn test_deleted_user_denies_with_distinct_error_and_deletes_session() {
    let h = harness();
    let uid = register(&h.users, "a@x.io").await;
    let session = h.store.create(&uid, "A", "1.2.3.4").await.unwrap();
    h.users.delete_one(&UserFilter::Id(uid)).await.unwrap();

    let err = h
        .guard
        .authenticate(Some(session.token.as_str()), &fp("A", "1.2.3.4"))
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::AccountGone));
    assert!(!matches!(err, SessionError::CredentialMismatch));
    assert!(h.store.fetch(&session.token).await.unwrap().is_none());
}

// =========================================================================
// Degraded connectivity
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_cache_disconnected_returns_none_without_store_calls() {
    let h = harness();
    let uid = register(&h.users, "a@x.io").await;
    let session = h.store.create(&uid, "A", "1.2.3.4").await.unwrap();
    let calls_before = h.store.calls();
    h.status
        .set(StoreKind::Cache, ConnectivityState::Disconnected);

    for token in [session.token.as_str(), "deadbeef", "x"] {
        let result = h.guard.authenticate(Some(token), &fp("A", "1.2.3.4")).await;
        assert!(matches!(result, Ok(None)), "token {token}");
    }

    assert_eq!(h.store.calls(), calls_before);
}

#[tokio::test(start_paused = true)]
async fn test_every_non_connected_cache_state_degrades() {
    let h = harness();
    let uid = register(&h.users, "a@x.io").await;
    let session = h.store.create(&uid, "A", "1.2.3.4").await.unwrap();
    let calls_before = h.store.calls();

    for state in [
        ConnectivityState::Uninitialized,
        ConnectivityState::Connecting,
        ConnectivityState::Disconnected,
        ConnectivityState::Error,
    ] {
        h.status.set(StoreKind::Cache, state);
        let result = h
            .guard
            .authenticate(Some(session.token.as_str()), &fp("B", "0.0.0.0"))
            .await;
        assert!(matches!(result, Ok(None)), "state {state}");
    }

    assert_eq!(h.store.calls(), calls_before);
}

#[tokio::test(start_paused = true)]
async fn test_session_usable_again_after_cache_returns() {
    let h = harness();
    let uid = register(&h.users, "a@x.io").await;
    let session = h.store.create(&uid, "A", "1.2.3.4").await.unwrap();
    h.status.set(StoreKind::Cache, ConnectivityState::Connecting);
    assert!(
        h.guard
            .authenticate(Some(session.token.as_str()), &fp("A", "1.2.3.4"))
            .await
            .unwrap()
            .is_none()
    );

    h.status.set(StoreKind::Cache, ConnectivityState::Connected);

    let auth = h
        .guard
        .authenticate(Some(session.token.as_str()), &fp("A", "1.2.3.4"))
        .await
        .unwrap()
        .expect("session");
    assert_eq!(auth.session.version, 1);
}

// =========================================================================
// Store failures
// =========================================================================

/// Session store with switchable failures, backed by a real memory store.
#[derive(Default)]
struct FaultyStore {
    inner: MemorySessionStore,
    fail_fetch: bool,
    fail_update: bool,
    fail_remove: bool,
    /// `expire` finds the record gone, as if a logout raced the request.
    vanish_on_expire: bool,
}

impl SessionStore for FaultyStore {
    async fn create(
        &self,
        user_id: &UserId,
        user_agent: &str,
        user_address: &str,
    ) -> Result<Session, StoreError> {
        self.inner.create(user_id, user_agent, user_address).await
    }

    async fn fetch(&self, token: &SessionToken) -> Result<Option<Session>, StoreError> {
        if self.fail_fetch {
            return Err(StoreError::Unavailable("fetch".into()));
        }
        self.inner.fetch(token).await
    }

    async fn update(&self, session: &Session) -> Result<(), StoreError> {
        if self.fail_update {
            return Err(StoreError::Backend("update".into()));
        }
        self.inner.update(session).await
    }

    async fn expire(&self, token: &SessionToken, ttl: Duration) -> Result<bool, StoreError> {
        if self.vanish_on_expire {
            self.inner.remove(std::slice::from_ref(token)).await?;
        }
        self.inner.expire(token, ttl).await
    }

    async fn remove(&self, tokens: &[SessionToken]) -> Result<usize, StoreError> {
        if self.fail_remove {
            return Err(StoreError::Backend("remove".into()));
        }
        self.inner.remove(tokens).await
    }

    async fn find_all_by_user(&self, user_id: &UserId) -> Result<Vec<Session>, StoreError> {
        self.inner.find_all_by_user(user_id).await
    }
}

type FaultyGuard = SessionGuard<Arc<FaultyStore>, Arc<MemoryUserDirectory>, SharedStatus>;

fn faulty(store: FaultyStore) -> (FaultyGuard, Arc<FaultyStore>, Arc<MemoryUserDirectory>) {
    let store = Arc::new(store);
    let users = Arc::new(MemoryUserDirectory::new());
    let status = SharedStatus::new();
    status.set(StoreKind::Primary, ConnectivityState::Connected);
    status.set(StoreKind::Cache, ConnectivityState::Connected);

    let guard = SessionGuard::new(
        Arc::clone(&store),
        Arc::clone(&users),
        status,
        &SessionConfig::default(),
        GuardConfig::default(),
    );
    (guard, store, users)
}

#[tokio::test(start_paused = true)]
async fn test_mismatch_denied_even_when_revoke_fails() {
    let (guard, store, users) = faulty(FaultyStore {
        fail_remove: true,
        ..FaultyStore::default()
    });
    let uid = register(&users, "a@x.io").await;
    let session = store.create(&uid, "A", "1.2.3.4").await.unwrap();

    let result = guard
        .authenticate(Some(session.token.as_str()), &fp("B", "1.2.3.4"))
        .await;

    assert!(matches!(result, Err(SessionError::CredentialMismatch)));
    // The delete failed, so the record is still there.
    assert!(store.inner.fetch(&session.token).await.unwrap().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_missing_account_denied_even_when_revoke_fails() {
    let (guard, store, users) = faulty(FaultyStore {
        fail_remove: true,
        ..FaultyStore::default()
    });
    let uid = register(&users, "a@x.io").await;
    let session = store.create(&uid, "A", "1.2.3.4").await.unwrap();
    users.delete_one(&UserFilter::Id(uid)).await.unwrap();

    let result = guard
        .authenticate(Some(session.token.as_str()), &fp("A", "1.2.3.4"))
        .await;

    assert!(matches!(result, Err(SessionError::AccountGone)));
}

#[tokio::test(start_paused = true)]
async fn test_session_removed_during_revalidation_yields_none() {
    let (guard, store, users) = faulty(FaultyStore {
        vanish_on_expire: true,
        ..FaultyStore::default()
    });
    let uid = register(&users, "a@x.io").await;
    let session = store.create(&uid, "A", "1.2.3.4").await.unwrap();

    let result = guard
        .authenticate(Some(session.token.as_str()), &fp("A", "1.2.3.4"))
        .await
        .unwrap();

    assert!(result.is_none());
    assert!(store.inner.fetch(&session.token).await.unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_fetch_failure_surfaces_store_error() {
    let (guard, store, users) = faulty(FaultyStore {
        fail_fetch: true,
        ..FaultyStore::default()
    });
    let uid = register(&users, "a@x.io").await;
    let session = store.create(&uid, "A", "1.2.3.4").await.unwrap();

    let result = guard
        .authenticate(Some(session.token.as_str()), &fp("A", "1.2.3.4"))
        .await;

    assert!(matches!(
        result,
        Err(SessionError::Store(StoreError::Unavailable(_)))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_update_failure_hands_out_no_session() {
    let (guard, store, users) = faulty(FaultyStore {
        fail_update: true,
        ..FaultyStore::default()
    });
    let uid = register(&users, "a@x.io").await;
    let session = store.create(&uid, "A", "1.2.3.4").await.unwrap();

    let result = guard
        .authenticate(Some(session.token.as_str()), &fp("A", "1.2.3.4"))
        .await;

    assert!(matches!(result, Err(SessionError::Store(StoreError::Backend(_)))));
    let stored = store.inner.fetch(&session.token).await.unwrap().unwrap();
    assert_eq!(stored.version, 0);
}
