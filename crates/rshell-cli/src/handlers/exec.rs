//! Exec command handler.
//!
//! Runs the given candidates in order through one session and prints the
//! output of the deciding candidate.

use std::io;

use rshell_runtime::Session;
use tracing::info;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::write_result;

/// Execute the exec command.
///
/// Returns whether the deciding candidate exited with an accepted code.
pub async fn execute(ctx: &CliContext, commands: &[String]) -> Result<bool, CliError> {
    let session = ctx.connect().await?;
    let outcome = run(ctx, &session, commands).await;
    session.destroy().await;
    outcome
}

async fn run(ctx: &CliContext, session: &Session, commands: &[String]) -> Result<bool, CliError> {
    let result = session
        .execute_candidates(commands, &ctx.config.extra_codes)
        .await?;

    info!(
        command_number = result.command_number(),
        code = result.exit_code(),
        "Execution finished"
    );
    write_result(&mut io::stdout().lock(), &result, ctx.config.json)?;
    Ok(result.was_successful())
}
