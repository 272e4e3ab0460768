//! Core domain types and ports for rshell.
//!
//! This crate holds everything the session manager needs that does not touch
//! a real process: the execution result, success-code policy, command variant
//! expansion, transport and listener ports, events, errors and settings.
#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod events;
pub mod ports;
pub mod settings;

// Re-export commonly used types for convenience
pub use domain::{
    BINARY_MARKER, DEFAULT_FLAVORS, DEFAULT_SUCCESS_CODE, ResultCodes, ShellResult, expand,
    expand_one, invocation,
};
pub use events::{
    ConnectionState, SessionId, ShellBroadcast, TransportEvent, TransportEventReceiver,
    TransportEventSender, transport_channel,
};
pub use ports::{
    BroadcastListener, ConnectionListener, FnBroadcastListener, FnConnectionListener,
    SessionError, ShellTransport, TransportError, TransportFactory,
};
pub use settings::{
    CONNECT_ATTEMPTS, DEFAULT_ROOT_SHELL, DEFAULT_SHELL, DEFAULT_TIMEOUT_MS, PROBE_COMMAND,
    PROBE_PAYLOAD, SettingsError, ShellSettings, validate_settings,
};
