//! Event types shared between the session and its collaborators.
//!
//! # Structure
//!
//! - `transport` - Stream events a transport delivers to its session
//! - `session` - Session identity, connection state and cross-session broadcasts

mod session;
mod transport;

pub use session::{ConnectionState, SessionId, ShellBroadcast};
pub use transport::{
    TRANSPORT_EVENT_CAPACITY, TransportEvent, TransportEventReceiver, TransportEventSender,
    transport_channel,
};
