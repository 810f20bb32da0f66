//! Session storage.

use std::collections::HashMap;
use std::sync::RwLock;

use super::{SessionState, UserId};
use crate::error::BotError;
use crate::Result;

/// Thread-safe storage for per-user conversational state.
///
/// Readers proceed concurrently; writers are exclusive. Every `set` and
/// `get` clones the state, so a caller mutating what it passed in or got
/// back can never alias store-internal data. State lives only for the
/// process lifetime.
pub struct SessionStore {
    sessions: RwLock<HashMap<UserId, SessionState>>,
}

impl SessionStore {
    /// Create a new empty session store.
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Store the state for a user.
    ///
    /// A state with an empty `step` is never persisted: setting it is
    /// equivalent to [`clear`](Self::clear). This keeps "ghost sessions"
    /// with no routable step out of the map entirely.
    pub fn set(&self, user_id: UserId, state: SessionState) -> Result<()> {
        let mut sessions = self.sessions.write().map_err(|_| BotError::LockPoisoned)?;

        if state.step.is_empty() {
            sessions.remove(&user_id);
        } else {
            sessions.insert(user_id, state);
        }
        Ok(())
    }

    /// Get a copy of the state for a user, if any.
    pub fn get(&self, user_id: UserId) -> Result<Option<SessionState>> {
        let sessions = self.sessions.read().map_err(|_| BotError::LockPoisoned)?;
        Ok(sessions.get(&user_id).cloned())
    }

    /// Remove the state for a user.
    pub fn clear(&self, user_id: UserId) -> Result<()> {
        let mut sessions = self.sessions.write().map_err(|_| BotError::LockPoisoned)?;
        sessions.remove(&user_id);
        Ok(())
    }

    /// Number of active sessions.
    pub fn len(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    /// Whether no session is active.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get() {
        let store = SessionStore::new();
        let state = SessionState::at_step("form:filling").with_param("kind", "leave");

        store.set(7, state.clone()).unwrap();
        assert_eq!(store.get(7).unwrap(), Some(state));
    }

    #[test]
    fn test_get_absent() {
        let store = SessionStore::new();
        assert_eq!(store.get(404).unwrap(), None);
    }

    #[test]
    fn test_empty_step_clears() {
        let store = SessionStore::new();
        store.set(7, SessionState::at_step("x")).unwrap();

        store.set(7, SessionState::default()).unwrap();
        assert_eq!(store.get(7).unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_clear() {
        let store = SessionStore::new();
        store.set(7, SessionState::at_step("x")).unwrap();
        store.clear(7).unwrap();
        assert_eq!(store.get(7).unwrap(), None);
    }

    #[test]
    fn test_copy_isolation_on_get() {
        let store = SessionStore::new();
        store
            .set(
                7,
                SessionState::at_step("x")
                    .with_param("a", "1")
                    .with_payload(vec![1, 2]),
            )
            .unwrap();

        let mut copy = store.get(7).unwrap().unwrap();
        copy.params.insert("a".into(), "mutated".into());
        copy.payload.push(99);

        let fresh = store.get(7).unwrap().unwrap();
        assert_eq!(fresh.params.get("a").map(String::as_str), Some("1"));
        assert_eq!(fresh.payload, vec![1, 2]);
    }

    #[test]
    fn test_copy_isolation_on_set() {
        let store = SessionStore::new();
        let mut state = SessionState::at_step("x").with_payload(vec![1]);
        store.set(7, state.clone()).unwrap();

        state.payload.push(2);
        assert_eq!(store.get(7).unwrap().unwrap().payload, vec![1]);
    }

    #[test]
    fn test_concurrent_access() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(SessionStore::new());
        let mut handles = vec![];

        for user in 0..64i64 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                store.set(user, SessionState::at_step("x")).unwrap();
                store.get(user).unwrap()
            }));
        }

        for handle in handles {
            assert!(handle.join().unwrap().is_some());
        }
        assert_eq!(store.len(), 64);
    }
}
