//! Per-session listener sets.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};

use rshell_core::{BroadcastListener, ConnectionListener, SessionId, ShellBroadcast};

use crate::sync::{read, write};

/// Handle returned by `add_connection_listener`, used to remove the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Strongly held connection listeners.
#[derive(Default)]
pub(crate) struct ConnectionListeners {
    entries: RwLock<Vec<(ListenerId, Arc<dyn ConnectionListener>)>>,
}

impl ConnectionListeners {
    pub fn add(&self, listener: Arc<dyn ConnectionListener>) -> ListenerId {
        let id = ListenerId::next();
        write(&self.entries).push((id, listener));
        id
    }

    pub fn remove(&self, id: ListenerId) -> bool {
        let mut entries = write(&self.entries);
        let before = entries.len();
        entries.retain(|(entry, _)| *entry != id);
        entries.len() != before
    }

    pub fn clear(&self) {
        write(&self.entries).clear();
    }

    /// Call every listener. The set is snapshotted first so a listener may
    /// add or remove listeners without deadlocking.
    pub fn notify_disconnect(&self, session: SessionId) {
        let snapshot: Vec<Arc<dyn ConnectionListener>> = read(&self.entries)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in snapshot {
            listener.on_disconnect(session);
        }
    }
}

/// Weakly held broadcast listeners.
#[derive(Default)]
pub(crate) struct BroadcastListeners {
    entries: RwLock<Vec<Weak<dyn BroadcastListener>>>,
}

impl BroadcastListeners {
    pub fn add(&self, listener: &Arc<dyn BroadcastListener>) {
        write(&self.entries).push(Arc::downgrade(listener));
    }

    pub fn clear(&self) {
        write(&self.entries).clear();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        read(&self.entries)
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    pub fn deliver(&self, session: SessionId, broadcast: &ShellBroadcast) {
        let live: Vec<Arc<dyn BroadcastListener>> = {
            let mut entries = write(&self.entries);
            entries.retain(|weak| weak.strong_count() > 0);
            entries.iter().filter_map(Weak::upgrade).collect()
        };
        for listener in live {
            listener.on_broadcast(session, broadcast);
        }
    }
}
