//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface definition for the shell session tool.
///
/// This is the top-level parser that handles global options and dispatches
/// to subcommands.
#[derive(Parser)]
#[command(name = "rshell")]
#[command(about = "Run commands through a persistent shell session")]
#[command(version)]
pub struct Cli {
    /// Run an elevated session (uses the root shell)
    #[arg(long, global = true)]
    pub root: bool,

    /// Per-command timeout in milliseconds (0 disables it)
    #[arg(long = "timeout-ms", env = "RSHELL_TIMEOUT_MS", global = true)]
    pub timeout_ms: Option<u64>,

    /// Interpreter to start instead of `sh`
    #[arg(long, env = "RSHELL_SHELL", global = true)]
    pub shell: Option<String>,

    /// Extra exit code to accept as success (repeatable)
    #[arg(long = "code", global = true, allow_negative_numbers = true)]
    pub codes: Vec<i32>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
