//! FIFO worker behind `execute_async`.
//!
//! Each session owns one worker task fed by an unbounded queue, so jobs start
//! in submission order and run one at a time. The worker holds the session
//! weakly and stops once the session is destroyed or dropped; jobs still
//! queued at that point fail with `SessionError::Destroyed`.
//!
//! Callbacks run on the blocking pool, one at a time and in order. A callback
//! that blocks or panics cannot stall or kill the worker.

use std::sync::Weak;

use rshell_core::{SessionError, ShellResult};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, warn};

use super::SessionInner;

type Callback = Box<dyn FnOnce(Result<ShellResult, SessionError>) + Send>;

/// One queued execution.
pub(crate) struct Job {
    commands: Vec<String>,
    extra_codes: Vec<i32>,
    callback: Callback,
}

impl Job {
    pub fn new(commands: Vec<String>, extra_codes: Vec<i32>, callback: Callback) -> Self {
        Self {
            commands,
            extra_codes,
            callback,
        }
    }

    pub fn finish(self, outcome: Result<ShellResult, SessionError>) {
        (self.callback)(outcome);
    }
}

pub(super) async fn run_queue(session: Weak<SessionInner>, mut jobs: UnboundedReceiver<Job>) {
    while let Some(job) = jobs.recv().await {
        let outcome = match session.upgrade() {
            Some(inner) => inner.execute(&job.commands, &job.extra_codes).await,
            None => Err(SessionError::Destroyed),
        };
        let callback = tokio::task::spawn_blocking(move || job.finish(outcome));
        if let Err(e) = callback.await {
            warn!(error = %e, "Async execution callback panicked");
        }
    }
    debug!("Session queue worker exiting");
}
