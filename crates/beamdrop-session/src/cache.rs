//! The session cache: load-on-start, write-through, self-healing.
//!
//! This is the component the composition root constructs once and
//! injects wherever auth state is needed. It owns the session record
//! exclusively — nothing else reads session storage directly.
//!
//! # Lifecycle
//!
//! ```text
//! new() ──→ load() ──→ set_session()/refresh()/logout() ...
//!   │          │                 │
//!   ▼          ▼                 ▼
//! [Uninitialized] [Loading] [Authenticated ⇄ Unauthenticated]
//! ```
//!
//! # Failure policy
//!
//! Storage is best-effort. A failed read means "no session found"; a
//! failed write is logged and the in-memory record still wins for the
//! rest of the process lifetime. No storage error ever reaches the UI
//! layer through this type.

use beamdrop_store::KeyValueStore;
use tokio::sync::watch;

use crate::{Session, SessionError, SessionStatus};

/// The storage key the serialized session record lives under.
const SESSION_KEY: &str = "session";

/// Caches the signed-in user's session over durable local storage.
///
/// All methods take `&self`: the cache is designed to be shared (e.g.
/// in an `Arc`) between the navigation layer and the screens that sign
/// users in and out. Status changes are published through a
/// [`watch`] channel so consumers are notified instead of polling.
///
/// Overlapping calls are not expected — UI actions are serialized by
/// user interaction — but if they happen, last write wins; there is no
/// transaction discipline beyond the store's single-key atomicity.
pub struct SessionCache<S: KeyValueStore> {
    store: S,
    status: watch::Sender<SessionStatus>,
}

impl<S: KeyValueStore> SessionCache<S> {
    /// Creates a cache over `store`. The status starts `Uninitialized`;
    /// call [`load`](Self::load) once at startup.
    pub fn new(store: S) -> Self {
        let (status, _) = watch::channel(SessionStatus::Uninitialized);
        Self { store, status }
    }

    /// Returns the current status.
    pub fn status(&self) -> SessionStatus {
        self.status.borrow().clone()
    }

    /// Returns the current session record, if signed in.
    pub fn session(&self) -> Option<Session> {
        self.status.borrow().session().cloned()
    }

    /// Subscribes to status changes.
    ///
    /// The receiver starts at the current status and is notified on
    /// every transition. When the cache is dropped the channel closes,
    /// which is the subscriber's signal that the cache is gone.
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    /// Performs the once-per-lifetime startup load.
    ///
    /// Publishes `Loading` before touching storage — subscribers see it
    /// while the read is in flight and must gate on it — then settles to
    /// `Authenticated` (valid record found) or `Unauthenticated`
    /// (absent, unreadable, or invalid record; invalid records are also
    /// cleared from storage). Returns the settled status.
    ///
    /// # Errors
    /// Returns [`SessionError::AlreadyLoaded`] on a second call. Use
    /// [`refresh`](Self::refresh) to re-read storage after startup.
    pub async fn load(&self) -> Result<SessionStatus, SessionError> {
        // Claim the startup slot and publish Loading in one step, under
        // the channel's own lock. A plain check-then-publish would let
        // two racing loads both pass the check, and subscribers would
        // see a second Loading transition.
        let claimed = self.status.send_if_modified(|status| {
            if matches!(status, SessionStatus::Uninitialized) {
                *status = SessionStatus::Loading;
                true
            } else {
                false
            }
        });
        if !claimed {
            return Err(SessionError::AlreadyLoaded);
        }

        let settled = self.read_and_validate().await;
        tracing::info!(status = %settled, "session cache loaded");
        self.status.send_replace(settled.clone());
        Ok(settled)
    }

    /// Replaces the session wholesale and persists the change.
    ///
    /// `Some(record)` signs the user in; `None` signs them out and
    /// clears storage. The returned future resolves only after the
    /// persistence write has been attempted. Write failures are logged,
    /// not returned: the in-memory state is the authority for the
    /// current process lifetime, durability is best-effort.
    ///
    /// There are no partial updates — changing one field means writing
    /// a whole new record.
    ///
    /// # Errors
    /// - [`SessionError::NotLoaded`] — called before `load` settled.
    /// - [`SessionError::InvalidRecord`] — the record has an empty
    ///   email or token; it is neither stored nor exposed.
    pub async fn set_session(
        &self,
        session: Option<Session>,
    ) -> Result<(), SessionError> {
        if !self.status().is_settled() {
            return Err(SessionError::NotLoaded);
        }

        match session {
            Some(session) => {
                if !session.is_valid() {
                    return Err(SessionError::InvalidRecord);
                }
                self.persist(&session).await;
                tracing::info!(user = %session, "session replaced");
                self.status
                    .send_replace(SessionStatus::Authenticated(session));
            }
            None => {
                self.clear_storage().await;
                tracing::info!("session cleared");
                self.status.send_replace(SessionStatus::Unauthenticated);
            }
        }
        Ok(())
    }

    /// Re-reads storage and re-validates, settling to the result.
    ///
    /// This is how the client notices externally-invalidated sessions
    /// (e.g. storage wiped or rewritten by another component). The same
    /// validity invariant and self-healing as `load` apply, but the
    /// status moves directly between settled states — `Loading` is
    /// never re-entered.
    ///
    /// # Errors
    /// Returns [`SessionError::NotLoaded`] if called before `load`
    /// settled.
    pub async fn refresh(&self) -> Result<SessionStatus, SessionError> {
        if !self.status().is_settled() {
            return Err(SessionError::NotLoaded);
        }

        let settled = self.read_and_validate().await;
        self.status.send_replace(settled.clone());
        Ok(settled)
    }

    /// Signs the user out unconditionally.
    ///
    /// Clears both persisted and in-memory state. Never fails from the
    /// caller's perspective: if the storage delete goes wrong it is
    /// logged and the in-memory sign-out still completes. Idempotent.
    pub async fn logout(&self) {
        self.clear_storage().await;
        tracing::info!("signed out");
        self.status.send_replace(SessionStatus::Unauthenticated);
    }

    /// Reads the stored record and applies the validity invariant.
    ///
    /// Shared by `load` and `refresh`. Returns the settled status this
    /// read implies; invalid records are cleared as a side effect.
    async fn read_and_validate(&self) -> SessionStatus {
        let raw = match self.store.get(SESSION_KEY).await {
            Ok(raw) => raw,
            Err(err) => {
                // Read failure degrades to signed-out; it must not
                // crash startup or strand the UI on a splash screen.
                tracing::warn!(error = %err, "failed to read stored session");
                return SessionStatus::Unauthenticated;
            }
        };

        let Some(raw) = raw else {
            return SessionStatus::Unauthenticated;
        };

        match serde_json::from_str::<Session>(&raw) {
            Ok(session) if session.is_valid() => {
                SessionStatus::Authenticated(session)
            }
            Ok(_) => {
                tracing::warn!(
                    "stored session is incomplete, clearing it"
                );
                self.clear_storage().await;
                SessionStatus::Unauthenticated
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    "stored session is unparseable, clearing it"
                );
                self.clear_storage().await;
                SessionStatus::Unauthenticated
            }
        }
    }

    /// Writes the record through to storage, best-effort.
    async fn persist(&self, session: &Session) {
        let raw = match serde_json::to_string(session) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(error = %err, "failed to serialize session");
                return;
            }
        };
        if let Err(err) = self.store.set(SESSION_KEY, &raw).await {
            tracing::warn!(
                error = %err,
                "failed to persist session, keeping it in memory only"
            );
        }
    }

    /// Removes the stored record, best-effort.
    async fn clear_storage(&self) {
        if let Err(err) = self.store.remove(SESSION_KEY).await {
            tracing::warn!(error = %err, "failed to clear stored session");
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `SessionCache`.
    //!
    //! "Process restart" is simulated by building a second cache over a
    //! clone of the same `MemoryStore` — clones share the underlying
    //! map, so the new cache sees exactly what the old one persisted.

    use beamdrop_store::{MemoryStore, StoreError};

    use super::*;

    // -- Helpers ----------------------------------------------------------

    fn session() -> Session {
        Session::new("a@b.com", "tok1")
    }

    /// A cache that has already completed its startup load.
    async fn loaded_cache() -> SessionCache<MemoryStore> {
        let cache = SessionCache::new(MemoryStore::new());
        cache.load().await.unwrap();
        cache
    }

    /// A store double whose operations can be made to fail on demand.
    /// Failed operations still don't touch the inner map, which is what
    /// a real dead disk looks like to the caller.
    #[derive(Clone, Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_get: bool,
        fail_set: bool,
        fail_remove: bool,
    }

    impl KeyValueStore for FlakyStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            if self.fail_get {
                return Err(StoreError::Backend("read refused".into()));
            }
            self.inner.get(key).await
        }

        async fn set(
            &self,
            key: &str,
            value: &str,
        ) -> Result<(), StoreError> {
            if self.fail_set {
                return Err(StoreError::Backend("write refused".into()));
            }
            self.inner.set(key, value).await
        }

        async fn remove(&self, key: &str) -> Result<(), StoreError> {
            if self.fail_remove {
                return Err(StoreError::Backend("delete refused".into()));
            }
            self.inner.remove(key).await
        }
    }

    // =====================================================================
    // load()
    // =====================================================================

    #[tokio::test]
    async fn test_load_empty_storage_settles_unauthenticated() {
        let cache = SessionCache::new(MemoryStore::new());

        let settled = cache.load().await.unwrap();

        assert_eq!(settled, SessionStatus::Unauthenticated);
        assert_eq!(cache.status(), SessionStatus::Unauthenticated);
    }

    #[tokio::test]
    async fn test_load_valid_record_settles_authenticated() {
        let store = MemoryStore::new();
        store
            .set("session", &serde_json::to_string(&session()).unwrap())
            .await
            .unwrap();

        let cache = SessionCache::new(store);
        let settled = cache.load().await.unwrap();

        assert_eq!(settled, SessionStatus::Authenticated(session()));
        assert_eq!(cache.session(), Some(session()));
    }

    #[tokio::test]
    async fn test_load_second_call_returns_already_loaded() {
        let cache = loaded_cache().await;

        let result = cache.load().await;

        assert!(matches!(result, Err(SessionError::AlreadyLoaded)));
        // The settled status is untouched by the rejected call.
        assert_eq!(cache.status(), SessionStatus::Unauthenticated);
    }

    #[tokio::test]
    async fn test_load_concurrent_calls_admit_exactly_one() {
        // Two tasks racing the startup load: whatever the interleaving,
        // exactly one wins the Loading slot and the other is refused,
        // so subscribers can never see two Loading transitions.
        let cache =
            std::sync::Arc::new(SessionCache::new(MemoryStore::new()));

        let first = tokio::spawn({
            let cache = std::sync::Arc::clone(&cache);
            async move { cache.load().await }
        });
        let second = tokio::spawn({
            let cache = std::sync::Arc::clone(&cache);
            async move { cache.load().await }
        });

        let outcomes = [
            first.await.unwrap().is_ok(),
            second.await.unwrap().is_ok(),
        ];

        assert_eq!(
            outcomes.iter().filter(|ok| **ok).count(),
            1,
            "exactly one load may win, got {outcomes:?}"
        );
        assert_eq!(cache.status(), SessionStatus::Unauthenticated);
    }

    #[tokio::test]
    async fn test_load_incomplete_record_self_heals() {
        // A record with an empty token parses fine but fails the
        // invariant. It must not surface as signed-in, and it must be
        // scrubbed from storage.
        let store = MemoryStore::new();
        store
            .set("session", r#"{"email":"a@b.com","token":""}"#)
            .await
            .unwrap();

        let cache = SessionCache::new(store.clone());
        let settled = cache.load().await.unwrap();

        assert_eq!(settled, SessionStatus::Unauthenticated);
        assert_eq!(store.get("session").await.unwrap(), None);

        // Idempotent: a fresh process over the now-clean storage loads
        // without error to the same answer.
        let restarted = SessionCache::new(store);
        assert_eq!(
            restarted.load().await.unwrap(),
            SessionStatus::Unauthenticated
        );
    }

    #[tokio::test]
    async fn test_load_unparseable_record_self_heals() {
        let store = MemoryStore::new();
        store.set("session", "not json {").await.unwrap();

        let cache = SessionCache::new(store.clone());
        let settled = cache.load().await.unwrap();

        assert_eq!(settled, SessionStatus::Unauthenticated);
        assert_eq!(store.get("session").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_load_read_failure_degrades_to_unauthenticated() {
        let cache = SessionCache::new(FlakyStore {
            fail_get: true,
            ..FlakyStore::default()
        });

        let settled = cache.load().await.unwrap();

        assert_eq!(settled, SessionStatus::Unauthenticated);
    }

    // =====================================================================
    // set_session()
    // =====================================================================

    #[tokio::test]
    async fn test_set_session_persists_and_authenticates() {
        let store = MemoryStore::new();
        let cache = SessionCache::new(store.clone());
        cache.load().await.unwrap();

        cache.set_session(Some(session())).await.unwrap();

        assert_eq!(cache.status(), SessionStatus::Authenticated(session()));
        // Persisted: a "restarted" cache over the same storage restores it.
        let restarted = SessionCache::new(store);
        assert_eq!(
            restarted.load().await.unwrap(),
            SessionStatus::Authenticated(session())
        );
    }

    #[tokio::test]
    async fn test_set_session_none_clears_everything() {
        let store = MemoryStore::new();
        let cache = SessionCache::new(store.clone());
        cache.load().await.unwrap();
        cache.set_session(Some(session())).await.unwrap();

        cache.set_session(None).await.unwrap();

        assert_eq!(cache.status(), SessionStatus::Unauthenticated);
        assert_eq!(store.get("session").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_session_replaces_whole_record() {
        // No partial updates: the second record fully replaces the
        // first, including fields the second one doesn't set.
        let cache = loaded_cache().await;
        cache
            .set_session(Some(session().with_id("u-1").with_name("Ada")))
            .await
            .unwrap();

        let replacement = Session::new("c@d.com", "tok2");
        cache.set_session(Some(replacement.clone())).await.unwrap();

        assert_eq!(cache.session(), Some(replacement));
    }

    #[tokio::test]
    async fn test_set_session_invalid_record_is_rejected() {
        let cache = loaded_cache().await;

        let result = cache.set_session(Some(Session::new("", "tok1"))).await;

        assert!(matches!(result, Err(SessionError::InvalidRecord)));
        // The rejected record must not leak into the status.
        assert_eq!(cache.status(), SessionStatus::Unauthenticated);
    }

    #[tokio::test]
    async fn test_set_session_before_load_returns_not_loaded() {
        let cache = SessionCache::new(MemoryStore::new());

        let result = cache.set_session(Some(session())).await;

        assert!(matches!(result, Err(SessionError::NotLoaded)));
    }

    #[tokio::test]
    async fn test_set_session_write_failure_still_updates_memory() {
        // Write-through is best-effort: the user stays signed in for
        // this process even if the record never hit the disk.
        let store = FlakyStore {
            fail_set: true,
            ..FlakyStore::default()
        };
        let cache = SessionCache::new(store.clone());
        cache.load().await.unwrap();

        cache.set_session(Some(session())).await.unwrap();

        assert_eq!(cache.status(), SessionStatus::Authenticated(session()));
        assert_eq!(store.inner.get("session").await.unwrap(), None);
    }

    // =====================================================================
    // refresh()
    // =====================================================================

    #[tokio::test]
    async fn test_refresh_picks_up_external_write() {
        let store = MemoryStore::new();
        let cache = SessionCache::new(store.clone());
        cache.load().await.unwrap();
        assert_eq!(cache.status(), SessionStatus::Unauthenticated);

        // Something else (another component, a migration) writes a
        // session behind the cache's back.
        store
            .set("session", &serde_json::to_string(&session()).unwrap())
            .await
            .unwrap();

        let settled = cache.refresh().await.unwrap();

        assert_eq!(settled, SessionStatus::Authenticated(session()));
    }

    #[tokio::test]
    async fn test_refresh_detects_externally_invalidated_session() {
        let store = MemoryStore::new();
        let cache = SessionCache::new(store.clone());
        cache.load().await.unwrap();
        cache.set_session(Some(session())).await.unwrap();

        // Storage wiped externally; the in-memory record is now stale.
        store.remove("session").await.unwrap();

        let settled = cache.refresh().await.unwrap();

        assert_eq!(settled, SessionStatus::Unauthenticated);
        assert_eq!(cache.session(), None);
    }

    #[tokio::test]
    async fn test_refresh_self_heals_invalid_external_data() {
        let store = MemoryStore::new();
        let cache = SessionCache::new(store.clone());
        cache.load().await.unwrap();

        store
            .set("session", r#"{"email":"","token":"tok1"}"#)
            .await
            .unwrap();

        let settled = cache.refresh().await.unwrap();

        assert_eq!(settled, SessionStatus::Unauthenticated);
        assert_eq!(store.get("session").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_refresh_before_load_returns_not_loaded() {
        let cache = SessionCache::new(MemoryStore::new());

        let result = cache.refresh().await;

        assert!(matches!(result, Err(SessionError::NotLoaded)));
    }

    #[tokio::test]
    async fn test_refresh_settles_without_revisiting_loading() {
        let cache = loaded_cache().await;

        let settled = cache.refresh().await.unwrap();

        assert!(settled.is_settled());
        assert_eq!(cache.status(), settled);
    }

    // =====================================================================
    // logout()
    // =====================================================================

    #[tokio::test]
    async fn test_logout_clears_memory_and_storage() {
        let store = MemoryStore::new();
        let cache = SessionCache::new(store.clone());
        cache.load().await.unwrap();
        cache.set_session(Some(session())).await.unwrap();

        cache.logout().await;

        assert_eq!(cache.status(), SessionStatus::Unauthenticated);
        assert_eq!(store.get("session").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let cache = loaded_cache().await;

        cache.logout().await;
        cache.logout().await;

        assert_eq!(cache.status(), SessionStatus::Unauthenticated);
    }

    #[tokio::test]
    async fn test_logout_completes_despite_storage_failure() {
        // Sign-out must never be blocked by a broken disk. The in-memory
        // state goes Unauthenticated even though the delete failed.
        let store = FlakyStore {
            fail_remove: true,
            ..FlakyStore::default()
        };
        let cache = SessionCache::new(store.clone());
        cache.load().await.unwrap();
        cache.set_session(Some(session())).await.unwrap();

        cache.logout().await;

        assert_eq!(cache.status(), SessionStatus::Unauthenticated);
        // The stale record is still on "disk" — the next load's
        // validity check is what protects against it being wrong.
        assert!(store.inner.get("session").await.unwrap().is_some());
    }

    // =====================================================================
    // subscribe()
    // =====================================================================

    #[tokio::test]
    async fn test_subscribe_observes_sign_in_and_out() {
        let cache = loaded_cache().await;
        let mut rx = cache.subscribe();
        rx.mark_unchanged();

        cache.set_session(Some(session())).await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_authenticated());

        cache.logout().await;
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), SessionStatus::Unauthenticated);
    }

    #[tokio::test]
    async fn test_subscribe_channel_closes_when_cache_dropped() {
        let cache = loaded_cache().await;
        let mut rx = cache.subscribe();
        rx.mark_unchanged();

        drop(cache);

        // The closed channel is the "cache disposed" signal.
        assert!(rx.changed().await.is_err());
    }
}
