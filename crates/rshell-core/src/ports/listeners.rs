//! Listener ports for session notifications.

use crate::events::{SessionId, ShellBroadcast};

/// Notified when a session loses its connection for good.
///
/// Called after an unexpected death that could not be repaired by the single
/// reconnection attempt, and after an execution timeout tore the transport
/// down. Sessions hold these listeners strongly; remove them explicitly.
pub trait ConnectionListener: Send + Sync {
    /// The session is now disconnected.
    fn on_disconnect(&self, session: SessionId);
}

/// Receives broadcasts sent through any live session.
///
/// Sessions hold these listeners weakly: a listener stops receiving
/// broadcasts once its owner drops the last `Arc` to it.
pub trait BroadcastListener: Send + Sync {
    /// A broadcast arrived at `session`.
    fn on_broadcast(&self, session: SessionId, broadcast: &ShellBroadcast);
}

/// Adapter turning a closure into a [`ConnectionListener`].
pub struct FnConnectionListener<F>(pub F);

impl<F> ConnectionListener for FnConnectionListener<F>
where
    F: Fn(SessionId) + Send + Sync,
{
    fn on_disconnect(&self, session: SessionId) {
        (self.0)(session);
    }
}

/// Adapter turning a closure into a [`BroadcastListener`].
pub struct FnBroadcastListener<F>(pub F);

impl<F> BroadcastListener for FnBroadcastListener<F>
where
    F: Fn(SessionId, &ShellBroadcast) + Send + Sync,
{
    fn on_broadcast(&self, session: SessionId, broadcast: &ShellBroadcast) {
        (self.0)(session, broadcast);
    }
}
