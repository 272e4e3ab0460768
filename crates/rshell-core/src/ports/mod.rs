//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the session expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No `tokio::process` types in any signature
//! - Transports report progress through events, never through return values
//! - Listener traits are object-safe and fire-and-forget

pub mod listeners;
pub mod transport;

use thiserror::Error;

pub use listeners::{
    BroadcastListener, ConnectionListener, FnBroadcastListener, FnConnectionListener,
};
pub use transport::{ShellTransport, TransportFactory};

/// Errors raised by a transport implementation.
///
/// These never cross the session boundary as-is; the session folds them
/// into [`SessionError`].
#[derive(Debug, Error)]
pub enum TransportError {
    /// The interpreter could not be started.
    #[error("Failed to start interpreter: {0}")]
    Spawn(String),

    /// Reading from or writing to the interpreter failed.
    #[error("Interpreter I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A command is already executing.
    #[error("Interpreter is busy")]
    Busy,

    /// The interpreter is no longer running.
    #[error("Interpreter is not active")]
    Inactive,
}

/// Errors surfaced by session execution.
///
/// None of these are fatal for the process: after any of them a caller
/// should check `is_connected()` and try again.
#[derive(Debug, Error)]
pub enum SessionError {
    /// `execute` was called without any candidate command.
    #[error("No commands to execute")]
    NoCommands,

    /// The session has no transport (never connected, or torn down).
    #[error("Session is not connected")]
    Unavailable,

    /// The transport did not become idle within the timeout.
    #[error("Interpreter did not become idle within {timeout_ms}ms")]
    Unresponsive {
        /// Timeout that elapsed.
        timeout_ms: u64,
    },

    /// A candidate command did not finish within the timeout.
    #[error("Command '{command}' did not finish within {timeout_ms}ms")]
    Timeout {
        /// The candidate that stalled.
        command: String,
        /// Timeout that elapsed.
        timeout_ms: u64,
    },

    /// The interpreter died while a command was executing.
    #[error("Interpreter died during execution")]
    TransportDied,

    /// The session was destroyed.
    #[error("Session has been destroyed")]
    Destroyed,

    /// The transport rejected the command.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl SessionError {
    /// Whether retrying after a reconnection can succeed.
    pub const fn is_retryable(&self) -> bool {
        !matches!(self, Self::NoCommands | Self::Destroyed)
    }
}
