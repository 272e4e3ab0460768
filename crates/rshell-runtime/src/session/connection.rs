//! Connection lifecycle: connect, probe, death handling and reconnection.

use std::sync::atomic::Ordering;
use std::sync::{Arc, Weak};

use rshell_core::{
    CONNECT_ATTEMPTS, ConnectionState, PROBE_COMMAND, PROBE_PAYLOAD, SessionError, ShellTransport,
    TransportError, TransportEvent, TransportEventReceiver, transport_channel,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::execute::ExecState;
use super::{Attached, SessionInner};
use crate::sync::write;

impl SessionInner {
    /// Initial connection, up to `CONNECT_ATTEMPTS` tries.
    pub(super) async fn connect(self: &Arc<Self>) {
        self.state.send_replace(ConnectionState::Connecting);
        let mut exec = self.exec.lock().await;

        for attempt in 1..=CONNECT_ATTEMPTS {
            match self.open_connection(&mut exec).await {
                Ok(()) => {
                    self.mark_connected();
                    return;
                }
                Err(e) => {
                    warn!(session = %self.id, attempt, error = %e, "Connection attempt failed");
                }
            }
        }

        self.state.send_replace(ConnectionState::Disconnected);
    }

    /// One explicit reconnection attempt.
    pub(super) async fn reconnect(self: &Arc<Self>) -> bool {
        let mut exec = self.exec.lock().await;
        if self.is_destroyed() {
            return false;
        }
        let connected = self.state.borrow().is_connected();
        if connected {
            return true;
        }

        if !self.publish_state(ConnectionState::Connecting) {
            return false;
        }
        match self.open_connection(&mut exec).await {
            Ok(()) => self.mark_connected(),
            Err(e) => {
                warn!(session = %self.id, error = %e, "Reconnection failed");
                self.publish_state(ConnectionState::Disconnected);
                false
            }
        }
    }

    /// React to the death of the transport attached as `generation`.
    ///
    /// A transport is only attached outside the execution lock while the
    /// session is connected, so every death that gets past the generation
    /// check is the loss of a connected session. It gets exactly one
    /// reconnection attempt; if that fails, connection listeners are told
    /// the session is gone.
    pub(super) async fn handle_death(self: Arc<Self>, generation: u64) {
        let mut exec = self.exec.lock().await;
        if self.is_destroyed() || self.generation.load(Ordering::SeqCst) != generation {
            debug!(session = %self.id, generation, "Ignoring stale interpreter death");
            return;
        }

        warn!(session = %self.id, "Interpreter died");
        if let Some(transport) = self.detach() {
            transport.destroy().await;
        }
        exec.events = None;

        if !self.publish_state(ConnectionState::Connecting) {
            return;
        }
        match self.open_connection(&mut exec).await {
            Ok(()) => {
                if self.mark_connected() {
                    info!(session = %self.id, "Reconnected after interpreter death");
                }
            }
            Err(e) => {
                warn!(session = %self.id, error = %e, "Reconnection after death failed");
                self.publish_state(ConnectionState::Disconnected);
                if !self.is_destroyed() {
                    self.connection_listeners.notify_disconnect(self.id);
                }
            }
        }
    }

    /// Create a transport, attach it and run the liveness probe.
    ///
    /// Must be called with the execution lock held. On failure nothing stays
    /// attached.
    async fn open_connection(self: &Arc<Self>, exec: &mut ExecState) -> Result<(), SessionError> {
        let (events, rx) = transport_channel();
        let transport = self.ctx.factory().create(self.elevated, events).await?;
        if !transport.is_active() {
            transport.destroy().await;
            return Err(TransportError::Inactive.into());
        }

        self.attach(exec, transport, rx);

        let probe = self
            .run_locked(exec, &[PROBE_COMMAND.to_string()], &[])
            .await;
        let failure = match probe {
            // destroy() may have run while the transport was being created
            Ok(_) if self.is_destroyed() => SessionError::Destroyed,
            Ok(result) if result.line() == Some(PROBE_PAYLOAD) => return Ok(()),
            Ok(result) => {
                debug!(session = %self.id, line = ?result.line(), "Unexpected probe output");
                SessionError::Unavailable
            }
            Err(e) => e,
        };

        if let Some(transport) = self.detach() {
            transport.destroy().await;
        }
        exec.events = None;
        Err(failure)
    }

    /// Publish `Connected` and register the session for broadcasts.
    ///
    /// Returns `false` when the session was destroyed in the meantime; the
    /// transport attached by then is torn down by `destroy`.
    fn mark_connected(self: &Arc<Self>) -> bool {
        self.ctx.registry().register(self.id, Arc::downgrade(self));
        if !self.publish_state(ConnectionState::Connected) {
            self.ctx.registry().deregister(self.id);
            return false;
        }
        info!(session = %self.id, elevated = self.elevated, "Session connected");
        true
    }

    /// Move to `next` unless the session has been destroyed.
    ///
    /// `destroy` raises the flag before publishing `Disconnected`, so checking
    /// the flag under the channel lock never overwrites its final state.
    fn publish_state(&self, next: ConnectionState) -> bool {
        self.state.send_if_modified(|state| {
            if self.destroyed.load(Ordering::SeqCst) {
                return false;
            }
            *state = next;
            true
        })
    }

    /// Make `transport` the current one and start pumping its events.
    fn attach(
        self: &Arc<Self>,
        exec: &mut ExecState,
        transport: Arc<dyn ShellTransport>,
        events: TransportEventReceiver,
    ) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let (forward, commands) = mpsc::unbounded_channel();
        exec.events = Some(commands);

        let pump = tokio::spawn(pump_events(
            Arc::downgrade(self),
            generation,
            events,
            forward,
        ));

        let previous = write(&self.current).replace(Attached {
            transport,
            pump: pump.abort_handle(),
        });
        if let Some(previous) = previous {
            previous.pump.abort();
        }
    }

    /// Forget the current transport and stop its pump.
    ///
    /// The caller decides what happens to the returned transport.
    pub(super) fn detach(&self) -> Option<Arc<dyn ShellTransport>> {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let attached = write(&self.current).take()?;
        attached.pump.abort();
        Some(attached.transport)
    }
}

/// Forward command events to the session; turn `Died` into death handling.
async fn pump_events(
    session: Weak<SessionInner>,
    generation: u64,
    mut events: TransportEventReceiver,
    forward: mpsc::UnboundedSender<TransportEvent>,
) {
    while let Some(event) = events.recv().await {
        if event != TransportEvent::Died {
            if forward.send(event).is_err() {
                break;
            }
            continue;
        }

        // Closing the command channel fails an execution that is in flight
        drop(forward);
        if let Some(session) = session.upgrade() {
            tokio::spawn(session.handle_death(generation));
        }
        return;
    }
}
