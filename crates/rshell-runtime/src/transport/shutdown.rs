//! Interpreter teardown with SIGTERM → SIGKILL escalation.

use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use tokio::process::Child;
use tracing::debug;

/// How long an interpreter gets to exit after SIGTERM.
pub const TERM_GRACE: Duration = Duration::from_secs(2);

/// Stop an interpreter process and reap it.
///
/// On unix the interpreter first receives SIGTERM and gets `grace` to exit;
/// if it is still running afterwards it is killed. Elsewhere it is killed
/// right away.
pub async fn shutdown_child(mut child: Child, grace: Duration) -> io::Result<ExitStatus> {
    // Already reaped
    if child.id().is_none() {
        return child.wait().await;
    }

    if send_term(&child)? {
        if let Ok(status) = tokio::time::timeout(grace, child.wait()).await {
            return status;
        }
        debug!(pid = ?child.id(), "Interpreter ignored SIGTERM, killing");
    }

    // Child::kill sends SIGKILL on unix and reaps the process
    child.kill().await?;
    child.wait().await
}

/// Ask the interpreter to terminate. Returns `false` when it is already gone
/// or the platform has no polite way to ask.
#[cfg(unix)]
fn send_term(child: &Child) -> io::Result<bool> {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    let Some(pid) = child.id() else {
        return Ok(false);
    };
    let pid = i32::try_from(pid).map_err(io::Error::other)?;

    match kill(Pid::from_raw(pid), Signal::SIGTERM) {
        Ok(()) => Ok(true),
        Err(Errno::ESRCH) => Ok(false),
        Err(e) => Err(io::Error::other(e)),
    }
}

#[cfg(not(unix))]
fn send_term(_child: &Child) -> io::Result<bool> {
    Ok(false)
}
