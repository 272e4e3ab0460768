//! CLI-specific error types and mappings.
//!
//! This module provides error types for the CLI adapter and mappings
//! from library errors to exit codes and user-facing messages.

use rshell_core::{SessionError, SettingsError};
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Argument parsing error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (output could not be written, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The interpreter could not be started or did not answer the probe.
    #[error("Shell unavailable: {0}")]
    Unavailable(String),

    /// Execution failed without producing a result.
    #[error("Execution error: {0}")]
    Execution(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 0: Success
    /// - 1: General error
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 64-78: Reserved for specific error categories (see sysexits.h)
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Arguments(_) => 2,    // EX_USAGE
            Self::Io(_) => 74,          // EX_IOERR
            Self::Config(_) => 78,      // EX_CONFIG
            Self::Unavailable(_) => 69, // EX_UNAVAILABLE
            Self::Execution(_) => 71,   // EX_OSERR
        }
    }
}

impl From<SessionError> for CliError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NoCommands => Self::Arguments(err.to_string()),
            SessionError::Unavailable | SessionError::Destroyed => {
                Self::Unavailable(err.to_string())
            }
            SessionError::Unresponsive { .. }
            | SessionError::Timeout { .. }
            | SessionError::TransportDied
            | SessionError::Transport(_) => Self::Execution(err.to_string()),
        }
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_errors_map_to_exit_codes() {
        let timeout = CliError::from(SessionError::Timeout {
            command: "sleep 9".to_string(),
            timeout_ms: 10,
        });
        assert_eq!(timeout.exit_code(), 71);
        assert_eq!(CliError::from(SessionError::Unavailable).exit_code(), 69);
        assert_eq!(CliError::from(SessionError::NoCommands).exit_code(), 2);
    }

    #[test]
    fn test_settings_error_is_config() {
        let err = CliError::from(SettingsError::EmptyShell);
        assert_eq!(err.exit_code(), 78);
        assert!(err.to_string().starts_with("Configuration error"));
    }
}
