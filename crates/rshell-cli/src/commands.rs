//! Main commands enum.
//!
//! This module defines the available commands for the CLI tool.

use clap::Subcommand;

/// Available commands.
///
/// Every command that runs something opens one session, uses it for all of
/// its work and destroys it before exiting.
#[derive(Subcommand)]
pub enum Commands {
    /// Run candidate commands in order until one succeeds
    Exec {
        /// Candidate commands, tried in the given order
        #[arg(required = true)]
        commands: Vec<String>,
    },

    /// Run a command template across all flavors until one succeeds
    Attempt {
        /// Command template; `%binary ` marks where the flavor goes
        template: String,
    },

    /// Resolve which flavor of a tool works on this host
    Which {
        /// Tool names (e.g. "cat", "mount")
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Show how a template expands, without running anything
    Expand {
        /// Command template; `%binary ` marks where the flavor goes
        template: String,
    },
}
