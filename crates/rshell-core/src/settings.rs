//! Settings domain types and validation.
//!
//! This module contains the settings a shell context is built from.
//! These are pure domain types with no infrastructure dependencies.

use serde::{Deserialize, Serialize};

use crate::domain::DEFAULT_FLAVORS;

/// Default execution timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 1500;

/// Interpreter launched for unprivileged sessions.
pub const DEFAULT_SHELL: &str = "sh";

/// Interpreter launched for elevated sessions.
pub const DEFAULT_ROOT_SHELL: &str = "su";

/// Connection attempts made by a new session before giving up.
pub const CONNECT_ATTEMPTS: usize = 2;

/// Command used as the liveness probe.
pub const PROBE_COMMAND: &str = "echo connected";

/// Output the liveness probe must answer with.
pub const PROBE_PAYLOAD: &str = "connected";

/// Shell context settings.
///
/// Missing fields fall back to their defaults when deserialized.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ShellSettings {
    /// Execution timeout for new sessions, in milliseconds. `0` disables it.
    pub timeout_ms: u64,

    /// Flavors tried by variant expansion and binary resolution, in order.
    /// The empty string is the default (unprefixed) flavor.
    pub flavors: Vec<String>,

    /// Program started for unprivileged sessions.
    pub shell: String,

    /// Program started for elevated sessions.
    pub root_shell: String,
}

impl ShellSettings {
    /// Create settings with sensible defaults.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            flavors: DEFAULT_FLAVORS.iter().map(ToString::to_string).collect(),
            shell: DEFAULT_SHELL.to_string(),
            root_shell: DEFAULT_ROOT_SHELL.to_string(),
        }
    }

    /// Set the execution timeout.
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Replace the flavor list.
    #[must_use]
    pub fn with_flavors<I, S>(mut self, flavors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.flavors = flavors.into_iter().map(Into::into).collect();
        self
    }

    /// Set the unprivileged interpreter.
    #[must_use]
    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    /// Program to launch for the given privilege level.
    pub fn program(&self, elevated: bool) -> &str {
        if elevated { &self.root_shell } else { &self.shell }
    }
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Settings validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("At least one flavor is required (use \"\" for the default toolset)")]
    NoFlavors,

    #[error("Flavor '{0}' must not contain whitespace")]
    InvalidFlavor(String),

    #[error("Interpreter program cannot be empty")]
    EmptyShell,
}

/// Validate settings values.
pub fn validate_settings(settings: &ShellSettings) -> Result<(), SettingsError> {
    if settings.flavors.is_empty() {
        return Err(SettingsError::NoFlavors);
    }

    if let Some(flavor) = settings
        .flavors
        .iter()
        .find(|f| f.chars().any(char::is_whitespace))
    {
        return Err(SettingsError::InvalidFlavor(flavor.clone()));
    }

    if settings.shell.trim().is_empty() || settings.root_shell.trim().is_empty() {
        return Err(SettingsError::EmptyShell);
    }

    Ok(())
}
