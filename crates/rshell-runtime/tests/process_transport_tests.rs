//! Integration tests for the process transport against a real `sh`.

#![cfg(unix)]

use std::time::Duration;

use rshell_core::{
    SessionError, ShellSettings, ShellTransport, TransportError, TransportEvent,
    TransportEventReceiver, transport_channel,
};
use rshell_runtime::{ProcessTransport, Session, ShellContext};
use tokio_test::{assert_err, assert_ok};

const WAIT: Duration = Duration::from_secs(5);

async fn next_event(rx: &mut TransportEventReceiver) -> TransportEvent {
    tokio::time::timeout(WAIT, rx.recv())
        .await
        .expect("no event in time")
        .expect("event channel closed")
}

/// Collect the events of one command, `Started` through `Stopped`.
async fn run(
    transport: &ProcessTransport,
    rx: &mut TransportEventReceiver,
    command: &str,
) -> Vec<TransportEvent> {
    assert_ok!(transport.execute(command).await);
    let mut events = Vec::new();
    loop {
        let event = next_event(rx).await;
        let stopped = matches!(event, TransportEvent::Stopped(_));
        events.push(event);
        if stopped {
            return events;
        }
    }
}

fn line(text: &str) -> TransportEvent {
    TransportEvent::Line(text.to_string())
}

#[tokio::test]
async fn test_output_and_exit_code() {
    let (tx, mut rx) = transport_channel();
    let transport = assert_ok!(ProcessTransport::spawn("sh", tx));

    let events = run(&transport, &mut rx, "printf 'a\\nb\\n'; (exit 3)").await;

    assert_eq!(
        events,
        vec![
            TransportEvent::Started,
            line("a"),
            line("b"),
            TransportEvent::Stopped(3)
        ]
    );
    transport.destroy().await;
}

#[tokio::test]
async fn test_stderr_is_merged_and_output_without_newline_is_kept() {
    let (tx, mut rx) = transport_channel();
    let transport = assert_ok!(ProcessTransport::spawn("sh", tx));

    let events = run(&transport, &mut rx, "echo oops >&2; printf tail").await;

    assert_eq!(
        events,
        vec![
            TransportEvent::Started,
            line("oops"),
            line("tail"),
            TransportEvent::Stopped(0)
        ]
    );
    transport.destroy().await;
}

#[tokio::test]
async fn test_invalid_utf8_is_decoded_lossily() {
    let (tx, mut rx) = transport_channel();
    let transport = assert_ok!(ProcessTransport::spawn("sh", tx));

    let events = run(&transport, &mut rx, "printf '\\377ok\\n'").await;

    assert_eq!(events[1], line("\u{FFFD}ok"));
    transport.destroy().await;
}

#[tokio::test]
async fn test_empty_command_completes() {
    let (tx, mut rx) = transport_channel();
    let transport = assert_ok!(ProcessTransport::spawn("sh", tx));

    let events = run(&transport, &mut rx, "").await;

    assert_eq!(events, vec![TransportEvent::Started, TransportEvent::Stopped(0)]);
    transport.destroy().await;
}

#[tokio::test]
async fn test_busy_transport_rejects_commands() {
    let (tx, mut rx) = transport_channel();
    let transport = assert_ok!(ProcessTransport::spawn("sh", tx));

    assert_ok!(transport.execute("sleep 0.3").await);
    assert!(transport.is_running());
    assert!(matches!(
        transport.execute("echo no").await,
        Err(TransportError::Busy)
    ));
    assert!(!transport.wait_for(Some(Duration::from_millis(20))).await);
    assert!(transport.wait_for(Some(WAIT)).await);
    assert!(!transport.is_running());

    assert_eq!(next_event(&mut rx).await, TransportEvent::Started);
    assert_eq!(next_event(&mut rx).await, TransportEvent::Stopped(0));
    transport.destroy().await;
}

#[tokio::test]
async fn test_unexpected_exit_reports_died() {
    let (tx, mut rx) = transport_channel();
    let transport = assert_ok!(ProcessTransport::spawn("sh", tx));

    assert_ok!(transport.execute("exit 0").await);

    assert_eq!(next_event(&mut rx).await, TransportEvent::Started);
    assert_eq!(next_event(&mut rx).await, TransportEvent::Died);
    assert!(!transport.is_active());
    assert!(matches!(
        transport.execute("echo no").await,
        Err(TransportError::Inactive)
    ));
}

#[tokio::test]
async fn test_destroy_suppresses_died() {
    let (tx, mut rx) = transport_channel();
    let transport = assert_ok!(ProcessTransport::spawn("sh", tx));

    transport.destroy().await;
    transport.destroy().await;

    assert!(!transport.is_active());
    let event = tokio::time::timeout(Duration::from_millis(300), rx.recv()).await;
    assert!(!matches!(event, Ok(Some(TransportEvent::Died))));
}

#[tokio::test]
async fn test_spawn_failure() {
    let (tx, _rx) = transport_channel();
    let Err(err) = ProcessTransport::spawn("/nonexistent/rshell-test-shell", tx) else {
        panic!("spawning a missing program succeeded");
    };
    assert!(matches!(err, TransportError::Spawn(_)));
}

// ── Sessions over a real interpreter ───────────────────────────────

fn process_context(timeout_ms: u64) -> ShellContext {
    let settings = ShellSettings::with_defaults().with_timeout_ms(timeout_ms);
    assert_ok!(ShellContext::with_process_transport(settings))
}

#[tokio::test]
async fn test_session_over_sh() {
    let ctx = process_context(5_000);
    let session = Session::connect(&ctx, false).await;
    assert!(session.is_connected());

    let result = assert_ok!(
        session
            .execute_candidates(&["no_such_command_rshell", "echo found"], &[])
            .await
    );
    assert_eq!(result.command_number(), 1);
    assert_eq!(result.lines(), ["found"]);

    let result = assert_ok!(session.execute("cd /; pwd").await);
    assert_eq!(result.line(), Some("/"));
    let result = assert_ok!(session.execute("pwd").await);
    assert_eq!(result.line(), Some("/"), "interpreter state persists between calls");

    session.destroy().await;
    assert!(!session.is_connected());
}

#[tokio::test]
async fn test_session_timeout_over_sh() {
    let ctx = process_context(200);
    let session = Session::connect(&ctx, false).await;
    assert!(session.is_connected());

    let err = assert_err!(session.execute("sleep 5").await);

    assert!(matches!(err, SessionError::Timeout { .. }));
    assert!(!session.is_connected());
    assert!(session.reconnect().await);
    let result = assert_ok!(session.execute("echo again").await);
    assert_eq!(result.line(), Some("again"));
    session.destroy().await;
}
