//! Command-line adapter for rshell.
//!
//! # Structure
//!
//! - `parser` / `commands` - clap definitions
//! - `bootstrap` - Composition root building the shell context
//! - `handlers` - One module per command
//! - `presentation` - Plain and JSON output
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

#[cfg(test)]
use tokio_test as _;

// Used by the binary only
use anyhow as _;
use dotenvy as _;
use tokio as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod presentation;

// Re-export primary types for convenient access
pub use bootstrap::{CliConfig, CliContext, bootstrap};
pub use commands::Commands;
pub use error::CliError;
pub use parser::Cli;
