//! Command handlers.
//!
//! Handlers follow one pattern:
//! - Signature: `pub async fn execute(ctx: &CliContext, ...) -> Result<bool, CliError>`
//! - The returned flag tells `main` whether the command succeeded
//! - Sessions are destroyed before returning, on success and on error

pub mod attempt;
pub mod exec;
pub mod expand;
pub mod which;
