//! Registry of live sessions for broadcast fan-out.
//!
//! Sessions register once they are connected and deregister when destroyed
//! or dropped. Entries are weak, so the registry never keeps a session alive;
//! entries whose session is gone are pruned on the next broadcast.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, Weak};

use rshell_core::{SessionId, ShellBroadcast};
use tracing::debug;

use crate::session::SessionInner;
use crate::sync::{read, write};

/// Process-scoped set of live sessions.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, Weak<SessionInner>>>,
}

impl SessionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register(&self, id: SessionId, session: Weak<SessionInner>) {
        write(&self.sessions).insert(id, session);
    }

    pub(crate) fn deregister(&self, id: SessionId) -> bool {
        write(&self.sessions).remove(&id).is_some()
    }

    /// Whether a live session with this id is registered
    pub fn contains(&self, id: SessionId) -> bool {
        read(&self.sessions)
            .get(&id)
            .is_some_and(|weak| weak.strong_count() > 0)
    }

    /// Number of live registered sessions
    pub fn len(&self) -> usize {
        read(&self.sessions)
            .values()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    /// Whether no live session is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver a broadcast to every live session.
    ///
    /// Returns the number of sessions reached.
    pub fn broadcast(&self, broadcast: &ShellBroadcast) -> usize {
        let live: Vec<Arc<SessionInner>> = {
            let mut sessions = write(&self.sessions);
            sessions.retain(|_, weak| weak.strong_count() > 0);
            sessions.values().filter_map(Weak::upgrade).collect()
        };

        debug!(key = %broadcast.key, sessions = live.len(), "Broadcasting to sessions");
        for session in &live {
            session.deliver_broadcast(broadcast);
        }
        live.len()
    }
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("sessions", &read(&self.sessions).len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_registry() {
        let registry = SessionRegistry::new();
        assert!(registry.is_empty());
        assert!(!registry.contains(SessionId::next()));
        assert_eq!(registry.broadcast(&ShellBroadcast::key_only("noop")), 0);
    }

    #[test]
    fn test_dead_entries_are_not_counted() {
        let registry = SessionRegistry::new();
        let id = SessionId::next();
        registry.register(id, Weak::new());
        assert!(!registry.contains(id));
        assert_eq!(registry.len(), 0);
        assert_eq!(registry.broadcast(&ShellBroadcast::key_only("noop")), 0);
        assert!(!registry.deregister(id));
    }
}
