//! Live transport over a local interpreter process.
//!
//! - `ProcessTransport` - One interpreter process and its reader/watcher tasks
//! - `ProcessTransportFactory` - Starts the configured shell or root shell
//! - `shutdown_child` - SIGTERM → SIGKILL teardown

mod process;
pub mod shutdown;
mod stream;

use std::sync::Arc;

use async_trait::async_trait;
use rshell_core::{ShellSettings, ShellTransport, TransportError, TransportEventSender, TransportFactory};
use tracing::debug;

pub use process::ProcessTransport;
pub use shutdown::{TERM_GRACE, shutdown_child};

/// Creates [`ProcessTransport`]s from the interpreter programs in the settings.
#[derive(Debug, Clone)]
pub struct ProcessTransportFactory {
    settings: ShellSettings,
}

impl ProcessTransportFactory {
    /// Create a factory using the interpreters configured in `settings`.
    pub fn new(settings: &ShellSettings) -> Self {
        Self {
            settings: settings.clone(),
        }
    }
}

#[async_trait]
impl TransportFactory for ProcessTransportFactory {
    async fn create(
        &self,
        elevated: bool,
        events: TransportEventSender,
    ) -> Result<Arc<dyn ShellTransport>, TransportError> {
        let program = self.settings.program(elevated);
        debug!(program, elevated, "Starting interpreter");
        let transport: Arc<dyn ShellTransport> = ProcessTransport::spawn(program, events)?;
        Ok(transport)
    }
}
