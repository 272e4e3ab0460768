//! Candidate execution and output collection.

use std::time::Duration;

use rshell_core::{SessionError, ShellResult, TransportEvent};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, warn};

use super::SessionInner;
use crate::sync::read;

/// State only touched while the execution lock is held.
#[derive(Default)]
pub(crate) struct ExecState {
    /// Command events forwarded by the pump of the attached transport.
    pub events: Option<UnboundedReceiver<TransportEvent>>,
    /// Result of the last completed execution.
    pub last: Option<ShellResult>,
}

/// How collecting one command's output ended.
enum Collected {
    Done { lines: Vec<String>, exit_code: i32 },
    Closed,
    TimedOut,
}

impl SessionInner {
    /// Run `commands` in order until one exits with an accepted code.
    ///
    /// Must be called with the execution lock held.
    pub(super) async fn run_locked(
        &self,
        exec: &mut ExecState,
        commands: &[String],
        extra_codes: &[i32],
    ) -> Result<ShellResult, SessionError> {
        if commands.is_empty() {
            return Err(SessionError::NoCommands);
        }
        let transport = self.transport().ok_or(SessionError::Unavailable)?;
        let events = exec.events.as_mut().ok_or(SessionError::Unavailable)?;

        let timeout = self.timeout();
        if !transport.wait_for(timeout).await {
            return Err(SessionError::Unresponsive {
                timeout_ms: self.timeout_ms(),
            });
        }

        let codes = read(&self.codes).merged(extra_codes);
        let mut outcome = None;
        let mut stalled = None;

        for (index, command) in commands.iter().enumerate() {
            while events.try_recv().is_ok() {}

            debug!(session = %self.id, index, command, "Executing");
            transport.execute(command).await?;

            match collect(events, timeout).await {
                Collected::Done { lines, exit_code } => {
                    let accepted = codes.contains(&exit_code);
                    debug!(session = %self.id, index, code = exit_code, accepted, "Command finished");
                    outcome = Some((lines, exit_code, index));
                    if accepted {
                        break;
                    }
                }
                Collected::Closed if self.is_destroyed() => return Err(SessionError::Destroyed),
                Collected::Closed => return Err(SessionError::TransportDied),
                Collected::TimedOut => {
                    stalled = Some(command.clone());
                    break;
                }
            }
        }

        if let Some(command) = stalled {
            warn!(session = %self.id, command, "Command timed out, tearing interpreter down");
            if let Some(transport) = self.detach() {
                transport.destroy().await;
            }
            exec.events = None;
            self.mark_disconnected();
            return Err(SessionError::Timeout {
                command,
                timeout_ms: self.timeout_ms(),
            });
        }

        let (lines, exit_code, command_number) = outcome.ok_or(SessionError::NoCommands)?;
        let result = ShellResult::new(lines, exit_code, codes, command_number);
        exec.last = Some(result.clone());
        Ok(result)
    }
}

/// Collect one command's output until it stops, bounded by `timeout`.
async fn collect(
    events: &mut UnboundedReceiver<TransportEvent>,
    timeout: Option<Duration>,
) -> Collected {
    let collecting = async {
        let mut lines = Vec::new();
        while let Some(event) = events.recv().await {
            match event {
                TransportEvent::Started => lines.clear(),
                TransportEvent::Line(line) => lines.push(line),
                TransportEvent::Stopped(exit_code) => {
                    return Collected::Done { lines, exit_code };
                }
                TransportEvent::Died => break,
            }
        }
        Collected::Closed
    };

    match timeout {
        Some(limit) => tokio::time::timeout(limit, collecting)
            .await
            .unwrap_or(Collected::TimedOut),
        None => collecting.await,
    }
}
