//! Attempt command handler.

use std::io;

use tracing::debug;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::write_result;

/// Execute the attempt command.
///
/// Expands `template` over the configured flavors and runs the variants
/// until one succeeds.
pub async fn execute(ctx: &CliContext, template: &str) -> Result<bool, CliError> {
    let session = ctx.connect().await?;
    let attempts = session
        .create_attempts(template)
        .with_result_codes(&ctx.config.extra_codes);
    debug!(commands = ?attempts.commands(), "Running attempts");

    let outcome = attempts.execute().await;
    session.destroy().await;

    let result = outcome?;
    write_result(&mut io::stdout().lock(), &result, ctx.config.json)?;
    Ok(result.was_successful())
}
