//! In-memory session registry.
//!
//! Each session lives behind its own `tokio::sync::Mutex`. A handler holds
//! that lock for the whole action, LLM round-trips included, so actions on
//! one session run strictly one at a time while distinct sessions proceed
//! independently. Nothing survives a restart and nothing is evicted.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::session::RefinementSession;

/// Shared handle to one session. Lock it to act on the session.
pub type SharedSession = Arc<Mutex<RefinementSession>>;

#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SharedSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fresh idle session and registers it.
    pub async fn create(&self) -> SharedSession {
        let session = RefinementSession::new();
        let id = session.id();
        let handle = Arc::new(Mutex::new(session));
        self.sessions.write().await.insert(id, handle.clone());
        handle
    }

    pub async fn get(&self, id: Uuid) -> Option<SharedSession> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Discards a session. Returns whether it existed.
    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refinement::extract::ExtractedEntities;
    use crate::session::SessionPhase;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_then_get_returns_the_same_session() {
        let store = SessionStore::new();
        let created = store.create().await;
        let id = created.lock().await.id();

        let fetched = store.get(id).await.unwrap();
        assert_eq!(fetched.lock().await.id(), id);
        assert!(Arc::ptr_eq(&created, &fetched));
    }

    #[tokio::test]
    async fn test_get_unknown_id_is_none() {
        let store = SessionStore::new();
        assert!(store.get(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn test_remove_reports_whether_session_existed() {
        let store = SessionStore::new();
        let handle = store.create().await;
        let id = handle.lock().await.id();

        assert!(store.remove(id).await);
        assert!(!store.remove(id).await);
        assert!(store.get(id).await.is_none());
    }

    #[tokio::test]
    async fn test_count_tracks_registered_sessions() {
        let store = SessionStore::new();
        assert_eq!(store.count().await, 0);

        let first = store.create().await;
        store.create().await;
        assert_eq!(store.count().await, 2);

        let id = first.lock().await.id();
        store.remove(id).await;
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn test_sessions_do_not_share_state() {
        let store = SessionStore::new();
        let first = store.create().await;
        let second = store.create().await;

        first.lock().await.begin_run(
            "jd".to_string(),
            ExtractedEntities::Entities(json!({})),
            vec!["1. Q?".to_string()],
        );

        assert_eq!(first.lock().await.phase(), SessionPhase::Extracted);
        assert_eq!(second.lock().await.phase(), SessionPhase::Idle);
    }
}
