//! Interpreter process transport.
//!
//! Each command is wrapped so the interpreter reports its exit code on
//! stdout after the command's own output:
//!
//! ```text
//! {
//! <command>
//! } 2>&1 </dev/null
//! echo "<marker> $?"
//! ```
//!
//! stderr is merged into the output, stdin is detached so a command cannot
//! swallow the commands that follow it, and the marker is unique per
//! transport so command output cannot fake a completion.

use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rshell_core::{ShellTransport, TransportError, TransportEvent, TransportEventSender};
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tokio::sync::{Mutex, oneshot, watch};
use tracing::{debug, warn};

use super::shutdown::{TERM_GRACE, shutdown_child};
use super::stream::{LossyLines, parse_marker};
use crate::sync::lock;

/// State shared by the transport handle and its reader/watcher tasks.
struct Shared {
    marker: String,
    events: TransportEventSender,
    busy: watch::Sender<bool>,
    active: AtomicBool,
    destroyed: AtomicBool,
}

impl Shared {
    async fn emit(&self, event: TransportEvent) {
        // The session may already have moved on to another transport
        let _ = self.events.send(event).await;
    }
}

/// A live interpreter process driven through its standard streams.
pub struct ProcessTransport {
    pid: Option<u32>,
    stdin: Mutex<ChildStdin>,
    shared: Arc<Shared>,
    kill: std::sync::Mutex<Option<oneshot::Sender<()>>>,
}

impl ProcessTransport {
    /// Start `program` and begin delivering its events.
    pub fn spawn(program: &str, events: TransportEventSender) -> Result<Arc<Self>, TransportError> {
        let mut child = Command::new(program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| TransportError::Spawn(format!("{program}: {e}")))?;

        let pid = child.id();
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| TransportError::Spawn("stdin was not captured".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| TransportError::Spawn("stdout was not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| TransportError::Spawn("stderr was not captured".to_string()))?;

        let (busy, _) = watch::channel(false);
        let shared = Arc::new(Shared {
            marker: format!("RSHELL:{}", uuid::Uuid::new_v4().simple()),
            events,
            busy,
            active: AtomicBool::new(true),
            destroyed: AtomicBool::new(false),
        });

        tokio::spawn(read_output(stdout, Arc::clone(&shared)));
        tokio::spawn(read_stderr(stderr, pid));

        let (kill_tx, kill_rx) = oneshot::channel();
        tokio::spawn(watch_child(child, kill_rx, Arc::clone(&shared)));

        debug!(program, pid = ?pid, "Interpreter started");

        Ok(Arc::new(Self {
            pid,
            stdin: Mutex::new(stdin),
            shared,
            kill: std::sync::Mutex::new(Some(kill_tx)),
        }))
    }

    /// OS process id of the interpreter.
    pub const fn pid(&self) -> Option<u32> {
        self.pid
    }

    fn wrap(&self, command: &str) -> String {
        // An empty brace group is a syntax error
        let command = if command.trim().is_empty() { ":" } else { command };
        format!(
            "{{\n{command}\n}} 2>&1 </dev/null\necho \"{} $?\"\n",
            self.shared.marker
        )
    }
}

#[async_trait]
impl ShellTransport for ProcessTransport {
    fn is_active(&self) -> bool {
        self.shared.active.load(Ordering::SeqCst)
    }

    fn is_running(&self) -> bool {
        *self.shared.busy.borrow()
    }

    async fn execute(&self, command: &str) -> Result<(), TransportError> {
        if !self.is_active() {
            return Err(TransportError::Inactive);
        }
        if self.shared.busy.send_replace(true) {
            return Err(TransportError::Busy);
        }

        self.shared.emit(TransportEvent::Started).await;

        let script = self.wrap(command);
        let mut stdin = self.stdin.lock().await;
        let written = match stdin.write_all(script.as_bytes()).await {
            Ok(()) => stdin.flush().await,
            Err(e) => Err(e),
        };

        if let Err(e) = written {
            self.shared.busy.send_replace(false);
            return Err(e.into());
        }
        Ok(())
    }

    async fn wait_for(&self, timeout: Option<Duration>) -> bool {
        if !self.is_active() {
            return false;
        }

        let mut busy = self.shared.busy.subscribe();
        let idle = async move {
            let idle = busy.wait_for(|running| !*running).await.is_ok();
            idle
        };
        let became_idle = match timeout {
            Some(limit) => tokio::time::timeout(limit, idle).await.unwrap_or(false),
            None => idle.await,
        };

        became_idle && self.is_active()
    }

    async fn destroy(&self) {
        self.shared.destroyed.store(true, Ordering::SeqCst);
        self.shared.active.store(false, Ordering::SeqCst);
        self.shared.busy.send_replace(false);

        if let Some(kill) = lock(&self.kill).take() {
            debug!(pid = ?self.pid, "Destroying interpreter");
            let _ = kill.send(());
        }
    }
}

async fn read_output(stdout: ChildStdout, shared: Arc<Shared>) {
    let mut lines = LossyLines::new(stdout);

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match parse_marker(&line, &shared.marker) {
                Some((prefix, code)) => {
                    if let Some(prefix) = prefix {
                        shared.emit(TransportEvent::Line(prefix.to_string())).await;
                    }
                    // Idle before Stopped, so the next command is accepted
                    shared.busy.send_replace(false);
                    shared.emit(TransportEvent::Stopped(code)).await;
                }
                None => shared.emit(TransportEvent::Line(line)).await,
            },
            Ok(None) => break,
            Err(e) => {
                debug!(error = %e, "stdout reader exiting due to read error");
                break;
            }
        }
    }

    debug!("stdout reader task exiting");
}

async fn read_stderr(stderr: ChildStderr, pid: Option<u32>) {
    let mut lines = LossyLines::new(stderr);
    while let Ok(Some(line)) = lines.next_line().await {
        debug!(pid = ?pid, "interpreter stderr: {}", line);
    }
    debug!(pid = ?pid, "stderr reader task exiting");
}

async fn watch_child(mut child: Child, kill: oneshot::Receiver<()>, shared: Arc<Shared>) {
    // A dropped sender also resolves `kill`, so dropping the transport stops the child
    let exited = tokio::select! {
        status = child.wait() => Some(status),
        _ = kill => None,
    };

    shared.active.store(false, Ordering::SeqCst);
    shared.busy.send_replace(false);

    match exited {
        Some(status) => {
            if shared.destroyed.load(Ordering::SeqCst) {
                return;
            }
            match status {
                Ok(status) => debug!(?status, "Interpreter exited unexpectedly"),
                Err(e) => warn!(error = %e, "Error waiting for interpreter"),
            }
            shared.emit(TransportEvent::Died).await;
        }
        None => {
            if let Err(e) = shutdown_child(child, TERM_GRACE).await {
                debug!(error = %e, "Interpreter shutdown failed");
            }
        }
    }
}
