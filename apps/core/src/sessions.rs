//! Per-session conversation state.
//!
//! Sessions live in an LRU-bounded map. Each session sits behind its own
//! `tokio::sync::Mutex`, so one request at a time works on a session while
//! different sessions proceed concurrently.

use chrono::{DateTime, Utc};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use tokio::sync::Mutex as AsyncMutex;
use tracing::debug;
use uuid::Uuid;

use crate::brain::memory::{ConversationMemory, SignalHistory};

pub type SharedSession = Arc<AsyncMutex<Session>>;

#[derive(Debug)]
pub struct Session {
    pub id: String,
    pub memory: ConversationMemory,
    pub signal_history: SignalHistory,
    pub created_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl Session {
    pub fn new(id: String, memory_capacity: usize) -> Self {
        let now = Utc::now();
        Self {
            id,
            memory: ConversationMemory::new(memory_capacity),
            signal_history: SignalHistory::new(),
            created_at: now,
            last_seen: now,
        }
    }

    pub fn touch(&mut self) {
        self.last_seen = Utc::now();
    }
}

pub struct SessionStore {
    sessions: Mutex<LruCache<String, SharedSession>>,
    memory_capacity: usize,
}

impl SessionStore {
    pub fn new(session_capacity: usize, memory_capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(session_capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            sessions: Mutex::new(LruCache::new(capacity)),
            memory_capacity,
        }
    }

    /// Trimmed caller id, or a fresh uuid when missing or blank.
    pub fn resolve_id(session_id: Option<String>) -> String {
        session_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string())
    }

    /// Look up a session, creating it when unknown. A missing id gets a fresh uuid.
    ///
    /// The returned id is the one the caller should use for follow-up requests.
    pub fn get_or_create(&self, session_id: Option<String>) -> (String, SharedSession) {
        let id = Self::resolve_id(session_id);

        // A poisoned lock only means another thread panicked mid-insert; the map is still usable.
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(session) = sessions.get(&id) {
            return (id, Arc::clone(session));
        }

        debug!("Creating session {}", id);
        let session = Arc::new(AsyncMutex::new(Session::new(id.clone(), self.memory_capacity)));
        sessions.put(id.clone(), Arc::clone(&session));
        (id, session)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::memory::Turn;

    #[tokio::test]
    async fn test_same_id_same_session() {
        let store = SessionStore::new(4, 6);
        let (id, first) = store.get_or_create(Some("abc".to_string()));
        first.lock().await.memory.append(Turn::user("hello"));

        let (same_id, second) = store.get_or_create(Some(" abc ".to_string()));
        assert_eq!(id, same_id);
        assert_eq!(second.lock().await.memory.len(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_missing_id_gets_uuid() {
        let store = SessionStore::new(4, 6);
        let (a, _) = store.get_or_create(None);
        let (b, _) = store.get_or_create(Some("  ".to_string()));

        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a).is_ok());
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_least_recently_used_is_evicted() {
        let store = SessionStore::new(2, 6);
        let (_, s1) = store.get_or_create(Some("one".to_string()));
        s1.lock().await.memory.append(Turn::user("from one"));
        store.get_or_create(Some("two".to_string()));
        store.get_or_create(Some("one".to_string()));
        store.get_or_create(Some("three".to_string()));

        assert_eq!(store.len(), 2);
        let (_, again) = store.get_or_create(Some("one".to_string()));
        assert_eq!(again.lock().await.memory.len(), 1);
        let (_, two) = store.get_or_create(Some("two".to_string()));
        assert!(two.lock().await.memory.is_empty());
    }

    #[test]
    fn test_session_uses_memory_capacity() {
        let store = SessionStore::new(1, 3);
        let (_, session) = store.get_or_create(None);
        assert_eq!(session.try_lock().unwrap().memory.capacity(), 3);
    }
}
