use crate::auth::{AuthProvider, HostedAuth, MockAuth};
use crate::capture::{DuplicatePolicy, LoadState, TrackerSession};
use crate::config::{AuthMode, Config, StorageMode};
use crate::errors::AppError;
use crate::models::UserId;
use crate::notify::NotificationCenter;
use crate::storage::{JsonFileStore, MemoryStore, MoodStore};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn AuthProvider>,
    pub store: Arc<dyn MoodStore>,
    pub notifications: Arc<NotificationCenter>,
    pub sessions: Arc<Mutex<HashMap<UserId, TrackerSession>>>,
    pub duplicate_policy: DuplicatePolicy,
}

impl AppState {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        store: Arc<dyn MoodStore>,
        duplicate_policy: DuplicatePolicy,
    ) -> Self {
        Self {
            auth,
            store,
            notifications: Arc::new(NotificationCenter::new()),
            sessions: Arc::new(Mutex::new(HashMap::new())),
            duplicate_policy,
        }
    }

    pub async fn from_config(config: &Config) -> Result<Self, AppError> {
        let auth: Arc<dyn AuthProvider> = match config.auth_mode {
            AuthMode::Mock => Arc::new(MockAuth::new()),
            AuthMode::Hosted => Arc::new(HostedAuth::new(
                config.identity_header.clone(),
                config.sign_in_url.clone(),
            )),
        };
        let store: Arc<dyn MoodStore> = match config.storage_mode {
            StorageMode::File => {
                let store = JsonFileStore::open(&config.data_path).await?;
                info!(path = %store.path().display(), "using JSON mood store");
                Arc::new(store)
            }
            StorageMode::Memory => Arc::new(MemoryStore::new()),
        };
        Ok(Self::new(auth, store, config.duplicate_policy))
    }

    /// Locks the session map. The first access for a user loads their history
    /// from the store. A failed load is reported once and not retried; the
    /// user gets a fresh read by signing in again.
    pub async fn tracker(&self, user: &UserId) -> MappedMutexGuard<'_, TrackerSession> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.entry(user.clone()).or_default();
        if session.load_state() == LoadState::Pending {
            // The failure is already surfaced as a notification.
            let _ = session
                .load(user, self.store.as_ref(), self.notifications.as_ref())
                .await;
        }
        MutexGuard::map(sessions, |sessions| sessions.entry(user.clone()).or_default())
    }

    pub async fn end_session(&self, user: &UserId) {
        self.sessions.lock().await.remove(user);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Mood, MoodRecord};
    use crate::notify::Severity;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts reads and fails every one of them.
    #[derive(Default)]
    struct OfflineStore {
        reads: AtomicUsize,
    }

    #[async_trait]
    impl MoodStore for OfflineStore {
        async fn fetch_for_user(&self, _user: &UserId) -> Result<Vec<MoodRecord>, AppError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Err(AppError::persistence("store unavailable"))
        }

        async fn insert(&self, _user: &UserId, _record: MoodRecord) -> Result<(), AppError> {
            Ok(())
        }
    }

    fn state_with(store: Arc<dyn MoodStore>) -> AppState {
        AppState::new(Arc::new(MockAuth::new()), store, DuplicatePolicy::Allow)
    }

    #[tokio::test]
    async fn failed_history_load_is_reported_once() {
        let store = Arc::new(OfflineStore::default());
        let state = state_with(store.clone());
        let user = UserId::new("offline@example.com");

        for _ in 0..3 {
            let session = state.tracker(&user).await;
            assert_eq!(session.load_state(), LoadState::Failed);
            assert!(session.history().is_empty());
        }

        assert_eq!(store.reads.load(Ordering::SeqCst), 1);
        let notes = state.notifications.drain(&user);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].severity, Severity::Destructive);
    }

    #[tokio::test]
    async fn new_session_reads_history_again() {
        let store = Arc::new(OfflineStore::default());
        let state = state_with(store.clone());
        let user = UserId::new("again@example.com");

        drop(state.tracker(&user).await);
        state.end_session(&user).await;
        drop(state.tracker(&user).await);

        assert_eq!(store.reads.load(Ordering::SeqCst), 2);
        assert_eq!(state.notifications.drain(&user).len(), 2);
    }

    #[tokio::test]
    async fn loaded_history_is_kept_across_accesses() {
        let store = Arc::new(MemoryStore::new());
        let user = UserId::new("kept@example.com");
        store
            .insert(&user, MoodRecord::new(Mood::Calm, chrono::Utc::now()))
            .await
            .unwrap();
        let state = state_with(store);

        assert_eq!(state.tracker(&user).await.load_state(), LoadState::Loaded);
        state.tracker(&user).await.select(Mood::Happy).unwrap();

        let session = state.tracker(&user).await;
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.state().mood(), Some(Mood::Happy));
    }
}
