//! Events emitted by a shell transport.

use tokio::sync::mpsc;

/// Capacity of the bounded channel a transport delivers its events on.
pub const TRANSPORT_EVENT_CAPACITY: usize = 256;

/// A single event from the interpreter's output stream.
///
/// For each command the transport emits `Started`, then zero or more `Line`s,
/// then exactly one `Stopped`. `Died` may arrive at any point and is always
/// the last event of a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A command was written; output accumulation starts fresh.
    Started,
    /// One output line, without its trailing newline.
    Line(String),
    /// The current command finished with this exit code.
    Stopped(i32),
    /// The interpreter went away without being asked to.
    Died,
}

/// Sending half handed to a transport at creation.
pub type TransportEventSender = mpsc::Sender<TransportEvent>;

/// Receiving half kept by the session.
pub type TransportEventReceiver = mpsc::Receiver<TransportEvent>;

/// Create a bounded transport event channel.
pub fn transport_channel() -> (TransportEventSender, TransportEventReceiver) {
    mpsc::channel(TRANSPORT_EVENT_CAPACITY)
}
