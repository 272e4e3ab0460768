//! Persistent interpreter sessions.
//!
//! A [`Session`] owns one interpreter transport and serializes every
//! execution through a single async lock, so commands issued from many tasks
//! never interleave their output.
//!
//! # Structure
//!
//! - `connection` - Connect, liveness probe, death handling, reconnection
//! - `execute` - Candidate execution and output collection
//! - `queue` - FIFO worker behind `execute_async`
//! - `listeners` - Connection and broadcast listener sets

mod connection;
mod execute;
mod listeners;
mod queue;

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use rshell_core::{
    BroadcastListener, ConnectionListener, ConnectionState, ResultCodes, SessionError, SessionId,
    ShellBroadcast, ShellResult, ShellTransport, invocation,
};
use tokio::sync::{mpsc, watch};
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use crate::attempts::Attempts;
use crate::context::ShellContext;
use crate::sync::{lock, read, write};

use execute::ExecState;
pub use listeners::ListenerId;
use listeners::{BroadcastListeners, ConnectionListeners};
use queue::Job;

/// Time an interpreter gets to exit on its own after `exit 0` before it is
/// torn down forcefully.
pub const EXIT_GRACE: Duration = Duration::from_millis(500);

/// The transport a session is currently attached to.
struct Attached {
    transport: Arc<dyn ShellTransport>,
    pump: AbortHandle,
}

/// Shared state behind every [`Session`] handle.
pub(crate) struct SessionInner {
    id: SessionId,
    elevated: bool,
    ctx: ShellContext,
    state: watch::Sender<ConnectionState>,
    destroyed: AtomicBool,
    timeout_ms: AtomicU64,
    codes: RwLock<ResultCodes>,
    exec: tokio::sync::Mutex<ExecState>,
    generation: AtomicU64,
    current: RwLock<Option<Attached>>,
    connection_listeners: ConnectionListeners,
    broadcast_listeners: BroadcastListeners,
    queue: Mutex<Option<mpsc::UnboundedSender<Job>>>,
}

impl SessionInner {
    fn new(ctx: ShellContext, elevated: bool) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        let timeout_ms = ctx.settings().timeout_ms;
        Self {
            id: SessionId::next(),
            elevated,
            ctx,
            state,
            destroyed: AtomicBool::new(false),
            timeout_ms: AtomicU64::new(timeout_ms),
            codes: RwLock::new(ResultCodes::new()),
            exec: tokio::sync::Mutex::new(ExecState::default()),
            generation: AtomicU64::new(0),
            current: RwLock::new(None),
            connection_listeners: ConnectionListeners::default(),
            broadcast_listeners: BroadcastListeners::default(),
            queue: Mutex::new(None),
        }
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    fn timeout_ms(&self) -> u64 {
        self.timeout_ms.load(Ordering::SeqCst)
    }

    fn timeout(&self) -> Option<Duration> {
        match self.timeout_ms() {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    fn transport(&self) -> Option<Arc<dyn ShellTransport>> {
        read(&self.current)
            .as_ref()
            .map(|attached| Arc::clone(&attached.transport))
    }

    /// Move to `Disconnected`, notifying connection listeners if the session
    /// was connected until now.
    fn mark_disconnected(&self) {
        let previous = self.state.send_replace(ConnectionState::Disconnected);
        if previous.is_connected() && !self.is_destroyed() {
            info!(session = %self.id, "Session disconnected");
            self.connection_listeners.notify_disconnect(self.id);
        }
    }

    /// Execute a candidate list under the execution lock.
    async fn execute(
        &self,
        commands: &[String],
        extra_codes: &[i32],
    ) -> Result<ShellResult, SessionError> {
        if self.is_destroyed() {
            return Err(SessionError::Destroyed);
        }
        let mut exec = self.exec.lock().await;
        if self.is_destroyed() {
            return Err(SessionError::Destroyed);
        }
        self.run_locked(&mut exec, commands, extra_codes).await
    }

    pub(crate) fn deliver_broadcast(&self, broadcast: &ShellBroadcast) {
        self.broadcast_listeners.deliver(self.id, broadcast);
    }
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        self.ctx.registry().deregister(self.id);
        if let Some(attached) = write(&self.current).take() {
            attached.pump.abort();
        }
    }
}

/// A persistent interpreter session.
///
/// Cloning a `Session` yields another handle to the same session.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    /// Start a session and connect it.
    ///
    /// Connection is attempted a fixed number of times. A session whose
    /// connection failed is still returned; it reports `is_connected() ==
    /// false` and every execution fails with [`SessionError::Unavailable`]
    /// until [`reconnect`](Self::reconnect) succeeds.
    pub async fn connect(ctx: &ShellContext, elevated: bool) -> Self {
        let inner = Arc::new(SessionInner::new(ctx.clone(), elevated));

        let (jobs, rx) = mpsc::unbounded_channel();
        *lock(&inner.queue) = Some(jobs);
        tokio::spawn(queue::run_queue(Arc::downgrade(&inner), rx));

        inner.connect().await;
        Self { inner }
    }

    /// Process-unique id of this session.
    pub fn id(&self) -> SessionId {
        self.inner.id
    }

    /// Whether this session runs an elevated interpreter.
    pub fn is_root(&self) -> bool {
        self.inner.elevated
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.inner.state.borrow()
    }

    /// Whether the session is connected.
    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// Watch connection state changes.
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state.subscribe()
    }

    /// Execute a single command.
    pub async fn execute(&self, command: &str) -> Result<ShellResult, SessionError> {
        self.inner.execute(&[command.to_string()], &[]).await
    }

    /// Execute candidates in order until one exits with a success code.
    ///
    /// `extra_codes` are accepted in addition to the session's codes for
    /// this call only.
    pub async fn execute_candidates<S: AsRef<str>>(
        &self,
        commands: &[S],
        extra_codes: &[i32],
    ) -> Result<ShellResult, SessionError> {
        let commands: Vec<String> = commands.iter().map(|c| c.as_ref().to_string()).collect();
        self.inner.execute(&commands, extra_codes).await
    }

    /// Queue a single command and return immediately.
    pub fn execute_async<F>(&self, command: &str, callback: F)
    where
        F: FnOnce(Result<ShellResult, SessionError>) + Send + 'static,
    {
        self.execute_candidates_async(vec![command.to_string()], Vec::new(), callback);
    }

    /// Queue a candidate list and return immediately.
    ///
    /// Jobs run one at a time in submission order; `callback` is invoked
    /// exactly once with the outcome.
    pub fn execute_candidates_async<F>(
        &self,
        commands: Vec<String>,
        extra_codes: Vec<i32>,
        callback: F,
    ) where
        F: FnOnce(Result<ShellResult, SessionError>) + Send + 'static,
    {
        let job = Job::new(commands, extra_codes, Box::new(callback));
        let rejected = match lock(&self.inner.queue).as_ref() {
            Some(jobs) => jobs.send(job).err().map(|e| e.0),
            None => Some(job),
        };
        if let Some(job) = rejected {
            job.finish(Err(SessionError::Destroyed));
        }
    }

    /// Build a variant executor for `template` over the configured flavors.
    pub fn create_attempts(&self, template: &str) -> Attempts<'_> {
        Attempts::new(self, template, &self.inner.ctx.settings().flavors)
    }

    /// Find the invocation of `name` that works on this host.
    ///
    /// Each configured flavor is probed with `-h`; the first one whose output
    /// does not report a missing tool is cached for the whole process.
    pub async fn get_binary(&self, name: &str) -> Option<String> {
        let cache = self.inner.ctx.binaries();
        if let Some(hit) = cache.get(name) {
            return Some(hit);
        }

        for flavor in &self.inner.ctx.settings().flavors {
            let candidate = invocation(name, flavor);
            let result = match self.execute(&format!("{candidate} -h")).await {
                Ok(result) => result,
                Err(e) => {
                    debug!(session = %self.inner.id, candidate, error = %e, "Binary probe failed");
                    continue;
                }
            };

            let missing = result
                .line()
                .is_some_and(|line| line.ends_with("not found") || line.ends_with("such tool"));
            if !missing {
                debug!(session = %self.inner.id, name, candidate, "Resolved binary");
                return Some(cache.insert(name, candidate));
            }
        }

        None
    }

    /// Accept `code` as success for all later calls.
    pub fn add_result_code(&self, code: i32) -> bool {
        write(&self.inner.codes).add(code)
    }

    /// Stop accepting `code` as success.
    pub fn remove_result_code(&self, code: i32) -> bool {
        write(&self.inner.codes).remove(code)
    }

    /// Restore the default success codes, `{0}`.
    pub fn reset_result_codes(&self) {
        write(&self.inner.codes).reset();
    }

    /// Snapshot of the persistent success codes.
    pub fn result_codes(&self) -> BTreeSet<i32> {
        read(&self.inner.codes).snapshot()
    }

    /// Execution timeout in milliseconds; `0` means none.
    pub fn timeout_ms(&self) -> u64 {
        self.inner.timeout_ms()
    }

    /// Change the execution timeout. `0` disables it.
    pub fn set_timeout_ms(&self, timeout_ms: u64) {
        self.inner.timeout_ms.store(timeout_ms, Ordering::SeqCst);
    }

    /// Execution timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.inner.timeout()
    }

    /// The result of the last completed execution.
    pub async fn last_result(&self) -> Option<ShellResult> {
        self.inner.exec.lock().await.last.clone()
    }

    pub fn add_connection_listener(&self, listener: Arc<dyn ConnectionListener>) -> ListenerId {
        self.inner.connection_listeners.add(listener)
    }

    pub fn remove_connection_listener(&self, id: ListenerId) -> bool {
        self.inner.connection_listeners.remove(id)
    }

    /// Register a broadcast listener. Only a weak handle is kept.
    pub fn add_broadcast_listener(&self, listener: &Arc<dyn BroadcastListener>) {
        self.inner.broadcast_listeners.add(listener);
    }

    /// Send a broadcast to every live session of this context, this one
    /// included. Returns the number of sessions reached.
    pub fn send_broadcast(&self, broadcast: &ShellBroadcast) -> usize {
        self.inner.ctx.registry().broadcast(broadcast)
    }

    /// Try once to restore a lost connection.
    ///
    /// Returns whether the session is connected afterwards.
    pub async fn reconnect(&self) -> bool {
        self.inner.reconnect().await
    }

    /// Shut the session down.
    ///
    /// An idle interpreter is asked to exit and torn down after a short
    /// grace period; a busy or dead one is torn down immediately. Queued
    /// async jobs fail with [`SessionError::Destroyed`]. Calling this more
    /// than once is harmless.
    pub async fn destroy(&self) {
        let inner = &self.inner;
        if inner.destroyed.swap(true, Ordering::SeqCst) {
            return;
        }
        inner.state.send_replace(ConnectionState::Disconnected);
        info!(session = %inner.id, "Destroying session");

        if let Some(transport) = inner.detach() {
            if transport.is_running() || !transport.is_active() {
                transport.destroy().await;
            } else {
                if let Err(e) = transport.execute("exit 0").await {
                    warn!(session = %inner.id, error = %e, "Graceful exit failed");
                }
                tokio::spawn(async move {
                    tokio::time::sleep(EXIT_GRACE).await;
                    if transport.is_active() {
                        debug!("Interpreter still running after exit, tearing down");
                    }
                    transport.destroy().await;
                });
            }
        }

        inner.ctx.registry().deregister(inner.id);
        inner.connection_listeners.clear();
        inner.broadcast_listeners.clear();
        lock(&inner.queue).take();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.inner.id)
            .field("elevated", &self.inner.elevated)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
