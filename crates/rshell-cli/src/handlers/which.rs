//! Which command handler.
//!
//! Resolves tool names to the flavor that works on this host.

use std::io;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::write_resolutions;

/// Execute the which command.
///
/// Returns `false` if any name could not be resolved.
pub async fn execute(ctx: &CliContext, names: &[String]) -> Result<bool, CliError> {
    let session = ctx.connect().await?;

    let mut resolved = Vec::with_capacity(names.len());
    for name in names {
        resolved.push((name.clone(), session.get_binary(name).await));
    }
    session.destroy().await;

    write_resolutions(&mut io::stdout().lock(), &resolved, ctx.config.json)?;
    Ok(resolved.iter().all(|(_, found)| found.is_some()))
}
