//! Shell transport port.
//!
//! A transport owns one interactive interpreter process and turns its output
//! stream into [`TransportEvent`](crate::events::TransportEvent)s. It knows
//! nothing about candidates, success codes or reconnection; the session
//! builds all of that on top of this interface.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::TransportError;
use crate::events::TransportEventSender;

/// A live connection to an interactive interpreter.
///
/// Implementations must be safe to share between the session's execution
/// path and its teardown path.
#[async_trait]
pub trait ShellTransport: Send + Sync {
    /// Whether the interpreter process is alive.
    fn is_active(&self) -> bool;

    /// Whether a command is currently executing.
    fn is_running(&self) -> bool;

    /// Write a command to the interpreter.
    ///
    /// Returns once the command has been handed to the interpreter; progress
    /// is reported through the event channel.
    async fn execute(&self, command: &str) -> Result<(), TransportError>;

    /// Wait until no command is executing.
    ///
    /// `None` waits without bound. Returns `false` on timeout or when the
    /// transport is no longer active.
    async fn wait_for(&self, timeout: Option<Duration>) -> bool;

    /// Forcefully tear the interpreter down.
    ///
    /// A destroyed transport never reports `Died`. Calling this more than
    /// once is harmless.
    async fn destroy(&self);
}

/// Creates transports on behalf of a session.
#[async_trait]
pub trait TransportFactory: Send + Sync {
    /// Start a new interpreter.
    ///
    /// # Arguments
    ///
    /// * `elevated` - Request an elevated-privilege interpreter
    /// * `events` - Where the transport delivers its events
    async fn create(
        &self,
        elevated: bool,
        events: TransportEventSender,
    ) -> Result<Arc<dyn ShellTransport>, TransportError>;
}
