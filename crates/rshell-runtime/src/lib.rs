//! Session manager and process transport for rshell.
//!
//! # Structure
//!
//! - [`Session`] - Persistent interpreter session (connect, execute, reconnect)
//! - [`ShellContext`] - Process-scoped settings, factory, registry and cache
//! - [`transport`] - Interpreter process transport
//! - [`Attempts`] - Command variants run as one candidate list
#![deny(unsafe_code)]

mod attempts;
mod binary_cache;
mod context;
mod registry;
mod session;
mod sync;
pub mod transport;

pub use attempts::Attempts;
pub use binary_cache::BinaryCache;
pub use context::ShellContext;
pub use registry::SessionRegistry;
pub use session::{EXIT_GRACE, ListenerId, Session};
pub use transport::{ProcessTransport, ProcessTransportFactory};
