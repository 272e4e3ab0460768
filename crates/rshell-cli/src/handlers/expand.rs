//! Expand command handler.

use std::io;

use rshell_core::expand;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::write_list;

/// Execute the expand command. Nothing is run.
pub fn execute(ctx: &CliContext, template: &str) -> Result<bool, CliError> {
    let commands = expand(template, &ctx.config.settings.flavors);
    write_list(&mut io::stdout().lock(), &commands, ctx.config.json)?;
    Ok(true)
}
