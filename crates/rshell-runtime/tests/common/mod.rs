//! Common test utilities.
//!
//! Provides a scripted in-memory transport so session behavior can be tested
//! without starting a real interpreter. Commands are answered by a script
//! function; the default script understands a tiny command language:
//!
//! - `echo <text>` - one line of output, exit code 0
//! - `fail <code>` - no output, exit with `<code>`
//! - `burst <tag>` - five lines `<tag>-0` .. `<tag>-4`, exit code 0
//! - `sleep <ms>` - one line `slept` after `<ms>` milliseconds, exit code 0
//! - `hang` - never finishes
//! - `die` - the interpreter dies mid-command
//! - `exit 0` - the interpreter exits quietly
//! - anything else - `<cmd>: not found`, exit code 127

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rshell_core::{
    ConnectionState, ShellSettings, ShellTransport, TransportError, TransportEvent,
    TransportEventSender, TransportFactory,
};
use rshell_runtime::{Session, ShellContext};
use tokio::sync::watch;

/// How a scripted command behaves.
#[derive(Debug, Clone)]
pub enum Reply {
    Output { lines: Vec<String>, code: i32 },
    Slow { delay: Duration, line: String },
    Hang,
    Die,
    Exit,
}

impl Reply {
    pub fn lines<I, S>(lines: I, code: i32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Output {
            lines: lines.into_iter().map(Into::into).collect(),
            code,
        }
    }

    pub fn code(code: i32) -> Self {
        Self::Output {
            lines: Vec::new(),
            code,
        }
    }
}

pub type Script = Arc<dyn Fn(&str) -> Reply + Send + Sync>;

/// The default command language.
pub fn standard(command: &str) -> Reply {
    let (verb, rest) = command.split_once(' ').unwrap_or((command, ""));
    match verb {
        "echo" => Reply::lines([rest], 0),
        "fail" => Reply::code(rest.parse().unwrap_or(1)),
        "burst" => Reply::lines((0..5).map(|i| format!("{rest}-{i}")), 0),
        "sleep" => Reply::Slow {
            delay: Duration::from_millis(rest.parse().unwrap_or(0)),
            line: "slept".to_string(),
        },
        "hang" => Reply::Hang,
        "die" => Reply::Die,
        "exit" => Reply::Exit,
        _ => Reply::lines([format!("{command}: not found")], 127),
    }
}

// ── Scripted transport ─────────────────────────────────────────────

struct Shared {
    events: TransportEventSender,
    busy: watch::Sender<bool>,
    active: AtomicBool,
    destroyed: AtomicBool,
    commands: Arc<Mutex<Vec<String>>>,
}

pub struct ScriptedTransport {
    shared: Arc<Shared>,
    script: Script,
}

impl ScriptedTransport {
    pub fn is_destroyed(&self) -> bool {
        self.shared.destroyed.load(Ordering::SeqCst)
    }

    /// Mark the interpreter busy or idle without running anything.
    pub fn set_busy(&self, busy: bool) {
        self.shared.busy.send_replace(busy);
    }

    /// Simulate the interpreter dying on its own.
    pub async fn kill(&self) {
        self.shared.active.store(false, Ordering::SeqCst);
        self.shared.busy.send_replace(false);
        let _ = self.shared.events.send(TransportEvent::Died).await;
    }
}

#[async_trait]
impl ShellTransport for ScriptedTransport {
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
        self.shared.commands.lock().unwrap().push(command.to_string());

        let reply = (self.script)(command);
        let shared = Arc::clone(&self.shared);
        shared.events.send(TransportEvent::Started).await.ok();

        tokio::spawn(async move {
            match reply {
                Reply::Output { lines, code } => {
                    for line in lines {
                        tokio::task::yield_now().await;
                        shared.events.send(TransportEvent::Line(line)).await.ok();
                    }
                    shared.busy.send_replace(false);
                    shared.events.send(TransportEvent::Stopped(code)).await.ok();
                }
                Reply::Slow { delay, line } => {
                    tokio::time::sleep(delay).await;
                    shared.events.send(TransportEvent::Line(line)).await.ok();
                    shared.busy.send_replace(false);
                    shared.events.send(TransportEvent::Stopped(0)).await.ok();
                }
                Reply::Hang => {}
                Reply::Die => {
                    shared.active.store(false, Ordering::SeqCst);
                    shared.busy.send_replace(false);
                    shared.events.send(TransportEvent::Died).await.ok();
                }
                Reply::Exit => {
                    shared.active.store(false, Ordering::SeqCst);
                    shared.busy.send_replace(false);
                }
            }
        });
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
    }
}

// ── Scripted factory ───────────────────────────────────────────────

pub struct ScriptedFactory {
    script: Script,
    refuse: AtomicBool,
    create_delay_ms: AtomicU64,
    creates: AtomicUsize,
    spawned: Mutex<Vec<Arc<ScriptedTransport>>>,
    commands: Arc<Mutex<Vec<String>>>,
}

impl ScriptedFactory {
    pub fn new() -> Arc<Self> {
        Self::with_script(standard)
    }

    pub fn with_script<F>(script: F) -> Arc<Self>
    where
        F: Fn(&str) -> Reply + Send + Sync + 'static,
    {
        Arc::new(Self {
            script: Arc::new(script),
            refuse: AtomicBool::new(false),
            create_delay_ms: AtomicU64::new(0),
            creates: AtomicUsize::new(0),
            spawned: Mutex::new(Vec::new()),
            commands: Arc::new(Mutex::new(Vec::new())),
        })
    }

    /// Make later `create` calls fail.
    pub fn refuse(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }

    /// Make later `create` calls take `delay` before spawning.
    pub fn delay_creates(&self, delay: Duration) {
        let ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.create_delay_ms.store(ms, Ordering::SeqCst);
    }

    /// Number of `create` calls, refused ones included.
    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn spawned(&self) -> usize {
        self.spawned.lock().unwrap().len()
    }

    pub fn latest(&self) -> Arc<ScriptedTransport> {
        Arc::clone(self.spawned.lock().unwrap().last().expect("no transport spawned"))
    }

    pub fn transport(&self, index: usize) -> Arc<ScriptedTransport> {
        Arc::clone(&self.spawned.lock().unwrap()[index])
    }

    /// Every command received by any transport, in order.
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    pub fn count(&self, command: &str) -> usize {
        self.commands().iter().filter(|c| *c == command).count()
    }
}

#[async_trait]
impl TransportFactory for ScriptedFactory {
    async fn create(
        &self,
        _elevated: bool,
        events: TransportEventSender,
    ) -> Result<Arc<dyn ShellTransport>, TransportError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        let delay = self.create_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.refuse.load(Ordering::SeqCst) {
            return Err(TransportError::Spawn("refused by test".to_string()));
        }

        let (busy, _) = watch::channel(false);
        let transport = Arc::new(ScriptedTransport {
            shared: Arc::new(Shared {
                events,
                busy,
                active: AtomicBool::new(true),
                destroyed: AtomicBool::new(false),
                commands: Arc::clone(&self.commands),
            }),
            script: Arc::clone(&self.script),
        });
        self.spawned.lock().unwrap().push(Arc::clone(&transport));
        Ok(transport)
    }
}

// ── Helpers ────────────────────────────────────────────────────────

pub const TEST_TIMEOUT_MS: u64 = 500;

pub fn context(factory: &Arc<ScriptedFactory>) -> ShellContext {
    let settings = ShellSettings::with_defaults().with_timeout_ms(TEST_TIMEOUT_MS);
    ShellContext::new(settings, Arc::clone(factory) as Arc<dyn TransportFactory>)
        .expect("valid settings")
}

pub async fn connected(factory: &Arc<ScriptedFactory>) -> (ShellContext, Session) {
    let ctx = context(factory);
    let session = Session::connect(&ctx, false).await;
    assert!(session.is_connected(), "session failed to connect");
    (ctx, session)
}

/// Wait until the session reaches `state`, failing after two seconds.
pub async fn wait_for_state(session: &Session, state: ConnectionState) {
    let mut rx = session.subscribe_state();
    tokio::time::timeout(Duration::from_secs(2), rx.wait_for(|s| *s == state))
        .await
        .expect("state not reached in time")
        .expect("state channel closed");
}

/// Poll `check` until it holds, failing after two seconds.
pub async fn eventually<F: Fn() -> bool>(check: F) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not met in time");
}
