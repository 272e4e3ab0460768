//! Process-scoped shell context.
//!
//! The context is the explicit home of state that every session of a process
//! shares: settings, the transport factory, the session registry used for
//! broadcasts and the binary resolution cache. The composing application
//! builds one context and hands it to each session; clones share state.

use std::sync::Arc;

use rshell_core::{SettingsError, ShellSettings, TransportFactory, validate_settings};

use crate::binary_cache::BinaryCache;
use crate::registry::SessionRegistry;
use crate::transport::ProcessTransportFactory;

/// Shared state for all sessions of a process.
#[derive(Clone)]
pub struct ShellContext {
    settings: Arc<ShellSettings>,
    factory: Arc<dyn TransportFactory>,
    registry: Arc<SessionRegistry>,
    binaries: Arc<BinaryCache>,
}

impl ShellContext {
    /// Create a context around a transport factory.
    pub fn new(
        settings: ShellSettings,
        factory: Arc<dyn TransportFactory>,
    ) -> Result<Self, SettingsError> {
        validate_settings(&settings)?;
        Ok(Self {
            settings: Arc::new(settings),
            factory,
            registry: Arc::new(SessionRegistry::new()),
            binaries: Arc::new(BinaryCache::new()),
        })
    }

    /// Create a context that starts local interpreter processes.
    pub fn with_process_transport(settings: ShellSettings) -> Result<Self, SettingsError> {
        let factory = Arc::new(ProcessTransportFactory::new(&settings));
        Self::new(settings, factory)
    }

    pub fn settings(&self) -> &ShellSettings {
        &self.settings
    }

    pub fn factory(&self) -> &Arc<dyn TransportFactory> {
        &self.factory
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn binaries(&self) -> &BinaryCache {
        &self.binaries
    }
}

impl std::fmt::Debug for ShellContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShellContext")
            .field("settings", &self.settings)
            .field("registry", &self.registry)
            .field("binaries", &self.binaries.len())
            .finish_non_exhaustive()
    }
}
