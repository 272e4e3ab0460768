//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where the shell context is wired together
//! for the CLI adapter: settings from flags and environment, the process
//! transport factory, and the session every handler works through.

use rshell_core::ShellSettings;
use rshell_runtime::{Session, ShellContext};
use tracing::debug;

use crate::error::CliError;
use crate::parser::Cli;

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Settings for the shell context.
    pub settings: ShellSettings,
    /// Whether to open an elevated session.
    pub elevated: bool,
    /// Exit codes accepted as success for every call of this invocation.
    pub extra_codes: Vec<i32>,
    /// Print results as JSON.
    pub json: bool,
}

impl CliConfig {
    /// Create config with default settings.
    pub fn with_defaults() -> Self {
        Self {
            settings: ShellSettings::with_defaults(),
            elevated: false,
            extra_codes: Vec::new(),
            json: false,
        }
    }

    /// Apply the global command-line options on top of the defaults.
    pub fn from_cli(cli: &Cli) -> Self {
        let mut config = Self::with_defaults();
        if let Some(timeout_ms) = cli.timeout_ms {
            config.settings = config.settings.with_timeout_ms(timeout_ms);
        }
        if let Some(shell) = &cli.shell {
            config.settings = config.settings.with_shell(shell.as_str());
        }
        config.elevated = cli.root;
        config.extra_codes.clone_from(&cli.codes);
        config.json = cli.json;
        config
    }
}

/// Fully composed context for CLI commands.
pub struct CliContext {
    /// The process-scoped shell context.
    pub shell: ShellContext,
    /// The configuration this context was built from.
    pub config: CliConfig,
}

impl CliContext {
    /// Open a session, failing if it could not connect.
    pub async fn connect(&self) -> Result<Session, CliError> {
        let session = Session::connect(&self.shell, self.config.elevated).await;
        if !session.is_connected() {
            let program = self.config.settings.program(self.config.elevated);
            return Err(CliError::Unavailable(format!(
                "could not start '{program}'"
            )));
        }
        debug!(session = %session.id(), "CLI session ready");
        Ok(session)
    }
}

/// Bootstrap the CLI context.
///
/// Validates the settings and wires the process transport.
pub fn bootstrap(config: CliConfig) -> Result<CliContext, CliError> {
    let shell = ShellContext::with_process_transport(config.settings.clone())?;
    Ok(CliContext { shell, config })
}
