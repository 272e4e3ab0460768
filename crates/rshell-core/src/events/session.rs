//! Session lifecycle and broadcast events.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Stable identifier of a session within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(u64);

impl SessionId {
    /// Allocate the next process-unique id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw numeric value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Connection state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// No usable transport.
    Disconnected,
    /// A transport is being created and probed.
    Connecting,
    /// The transport is alive and answered the liveness probe.
    Connected,
}

impl ConnectionState {
    /// Whether the state is `Connected`.
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

/// A keyed message fanned out to every live session's broadcast listeners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellBroadcast {
    /// What the broadcast is about.
    pub key: String,
    /// Free-form payload.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl ShellBroadcast {
    /// Create a broadcast with a payload.
    pub fn new(key: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            key: key.into(),
            data,
        }
    }

    /// Create a broadcast without a payload.
    pub fn key_only(key: impl Into<String>) -> Self {
        Self::new(key, serde_json::Value::Null)
    }
}
