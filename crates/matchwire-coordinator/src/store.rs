//! The session store: the authoritative table of active sessions.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use matchwire_protocol::SessionId;

use crate::{CoordinatorError, Session};

/// All active sessions, keyed by id.
///
/// At most one session exists per id at any time — [`create`](Self::create)
/// refuses duplicates rather than replacing. Callers treat
/// `SessionNotFound` as "revoked, ended, or timed out" and degrade
/// gracefully (a stray move on a vanished session becomes an error
/// event to its sender, nothing more).
///
/// # Concurrency note
///
/// A plain `HashMap`, not a concurrent one: the store is owned by the
/// coordinator task and every mutation funnels through it, which is
/// what upholds the state-machine invariants without locks.
pub struct SessionStore {
    sessions: HashMap<SessionId, Session>,
}

impl SessionStore {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }

    /// Inserts a new session.
    ///
    /// # Errors
    /// [`CoordinatorError::DuplicateSession`] if the id is taken.
    pub fn create(
        &mut self,
        session: Session,
    ) -> Result<&mut Session, CoordinatorError> {
        let id = session.id().clone();
        match self.sessions.entry(id) {
            Entry::Occupied(occupied) => Err(
                CoordinatorError::DuplicateSession(occupied.key().clone()),
            ),
            Entry::Vacant(vacant) => Ok(vacant.insert(session)),
        }
    }

    /// Looks up a session.
    ///
    /// # Errors
    /// [`CoordinatorError::SessionNotFound`] if absent.
    pub fn get(&self, id: &SessionId) -> Result<&Session, CoordinatorError> {
        self.sessions
            .get(id)
            .ok_or_else(|| CoordinatorError::SessionNotFound(id.clone()))
    }

    /// Looks up a session for mutation.
    ///
    /// # Errors
    /// [`CoordinatorError::SessionNotFound`] if absent.
    pub fn get_mut(
        &mut self,
        id: &SessionId,
    ) -> Result<&mut Session, CoordinatorError> {
        self.sessions
            .get_mut(id)
            .ok_or_else(|| CoordinatorError::SessionNotFound(id.clone()))
    }

    /// Removes a session. Idempotent — deleting a missing id is a no-op.
    ///
    /// Dropping the returned session also drops its expiry handle,
    /// which aborts any pending deadline.
    pub fn delete(&mut self, id: &SessionId) -> Option<Session> {
        let removed = self.sessions.remove(id);
        if removed.is_some() {
            tracing::info!(session_id = %id, "session deleted");
        }
        removed
    }

    /// Returns `true` if a session with this id exists.
    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.contains_key(id)
    }

    /// Number of active sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if there are no active sessions.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use matchwire_protocol::{BoardConfig, Density, PlayerId};

    use super::*;

    fn session(id: &str) -> Session {
        Session::new(
            SessionId::new(id),
            PlayerId::new("alice"),
            vec![PlayerId::new("alice"), PlayerId::new("bob")],
            vec![PlayerId::new("bob")],
            BoardConfig {
                num_players: 2,
                size: 6,
                density: Density::Medium,
            },
        )
    }

    #[test]
    fn test_create_then_get() {
        let mut store = SessionStore::new();
        store.create(session("s-1")).unwrap();

        let found = store.get(&SessionId::new("s-1")).unwrap();
        assert_eq!(found.id(), &SessionId::new("s-1"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_create_duplicate_id_fails() {
        let mut store = SessionStore::new();
        store.create(session("s-1")).unwrap();

        let result = store.create(session("s-1"));

        assert!(matches!(
            result,
            Err(CoordinatorError::DuplicateSession(_))
        ));
        assert_eq!(store.len(), 1, "failed create must not replace");
    }

    #[test]
    fn test_get_missing_returns_not_found() {
        let store = SessionStore::new();
        let result = store.get(&SessionId::new("nope"));
        assert!(matches!(
            result,
            Err(CoordinatorError::SessionNotFound(_))
        ));
    }

    #[test]
    fn test_get_mut_allows_mutation() {
        let mut store = SessionStore::new();
        store.create(session("s-1")).unwrap();

        let s = store.get_mut(&SessionId::new("s-1")).unwrap();
        s.accept(&PlayerId::new("bob")).unwrap();

        assert!(store.get(&SessionId::new("s-1")).unwrap().all_accepted());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut store = SessionStore::new();
        store.create(session("s-1")).unwrap();

        assert!(store.delete(&SessionId::new("s-1")).is_some());
        assert!(store.delete(&SessionId::new("s-1")).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_get_after_delete_returns_not_found() {
        let mut store = SessionStore::new();
        store.create(session("s-1")).unwrap();
        store.delete(&SessionId::new("s-1"));

        assert!(matches!(
            store.get(&SessionId::new("s-1")),
            Err(CoordinatorError::SessionNotFound(_))
        ));
    }

    #[test]
    fn test_contains_and_len() {
        let mut store = SessionStore::new();
        assert!(store.is_empty());

        store.create(session("a")).unwrap();
        store.create(session("b")).unwrap();

        assert!(store.contains(&SessionId::new("a")));
        assert!(!store.contains(&SessionId::new("c")));
        assert_eq!(store.len(), 2);
    }
}
