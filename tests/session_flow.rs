//! Integration tests for the voicepad recording session
//!
//! These tests drive the public API end to end: commands in, engine events
//! through the intake, snapshots and notifications out.

use std::sync::Once;

use crossbeam_channel::Receiver;
use voicepad::{
    RecordingSession, ScriptedEngine, SessionConfig, SessionError, SessionEvent,
};

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        use tracing_subscriber::layer::SubscriberExt;
        use tracing_subscriber::util::SubscriberInitExt;

        let _ = tracing_subscriber::registry()
            .with(tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "voicepad=debug".into()))
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .try_init();
    });
}

fn drain(rx: &Receiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Test a complete dictation: start, results streaming in, stop
#[test]
fn test_full_dictation_flow() {
    init_tracing();
    let (engine, handle) = ScriptedEngine::new();
    let mut session =
        RecordingSession::new(Box::new(engine), SessionConfig::default()).unwrap();
    let (_id, rx) = session.subscribe();

    session.start_default().unwrap();
    handle.emit_started();
    handle.emit_results(["the quick"]);
    handle.emit_results(["the quick brown fox"]);
    session.process_events();
    session.stop();

    let snapshot = session.snapshot();
    assert_eq!(snapshot.transcript, "the quick brown fox");
    assert!(!snapshot.is_recording);
    assert_eq!(handle.start_calls(), 1);
    assert_eq!(handle.stop_calls(), 1);

    // Changed for: start, first result, second result, stop
    let changed: Vec<_> = drain(&rx)
        .into_iter()
        .filter_map(|e| match e {
            SessionEvent::Changed(s) => Some(s),
            SessionEvent::Error(_) => None,
        })
        .collect();
    assert_eq!(changed.len(), 4);
    assert!(changed[0].is_recording);
    assert_eq!(changed[0].transcript, "");
    assert_eq!(changed[3].transcript, "the quick brown fox");
    assert!(!changed[3].is_recording);
}

/// Test that a rejected start leaves a usable, idle session
#[test]
fn test_rejected_start_recovery() {
    init_tracing();
    let (engine, handle) = ScriptedEngine::new();
    let mut session =
        RecordingSession::new(Box::new(engine), SessionConfig::default()).unwrap();
    let (_id, rx) = session.subscribe();

    handle.reject_next_start("permission denied");
    let err = session.start_default().unwrap_err();
    assert!(matches!(err, SessionError::StartRejected(_)));
    assert!(err.is_recoverable());

    let snapshot = session.snapshot();
    assert!(!snapshot.is_recording);
    assert_eq!(snapshot.transcript, "");

    let errors = drain(&rx)
        .iter()
        .filter(|e| matches!(e, SessionEvent::Error(_)))
        .count();
    assert_eq!(errors, 1);

    // The session is still usable
    session.start_default().unwrap();
    handle.emit_results(["second attempt"]);
    session.process_events();
    assert_eq!(session.snapshot().transcript, "second attempt");
}

/// Test that an engine failure mid-dictation keeps the partial text
#[test]
fn test_engine_failure_mid_dictation() {
    init_tracing();
    let (engine, handle) = ScriptedEngine::new();
    let mut session =
        RecordingSession::new(Box::new(engine), SessionConfig::default()).unwrap();
    let (_id, rx) = session.subscribe();

    session.start_default().unwrap();
    handle.emit_results(["partial sentence"]);
    session.process_events();

    handle.emit_error("microphone disconnected");
    session.process_events();

    let snapshot = session.snapshot();
    assert!(!snapshot.is_recording);
    assert_eq!(snapshot.transcript, "partial sentence");

    let events = drain(&rx);
    let errors = events
        .iter()
        .filter(|e| matches!(e, SessionEvent::Error(_)))
        .count();
    assert_eq!(errors, 1);

    // A new recording starts clean
    session.start_default().unwrap();
    assert_eq!(session.snapshot().transcript, "");
    assert!(session.is_recording());
}

/// Test that a result delivered after stop still reaches the transcript
#[test]
fn test_result_arriving_after_stop() {
    init_tracing();
    let (engine, handle) = ScriptedEngine::new();
    let mut session =
        RecordingSession::new(Box::new(engine), SessionConfig::default()).unwrap();

    session.start_default().unwrap();
    session.stop();

    handle.emit_results(["arrived late"]);
    handle.emit_ended();
    assert_eq!(session.process_events(), 2);

    let snapshot = session.snapshot();
    assert_eq!(snapshot.transcript, "arrived late");
    assert!(!snapshot.is_recording);
}

/// Test that clear during a recording lands as a single combined update
#[test]
fn test_clear_during_recording_is_one_update() {
    init_tracing();
    let (engine, handle) = ScriptedEngine::new();
    let mut session =
        RecordingSession::new(Box::new(engine), SessionConfig::default()).unwrap();

    session.start_default().unwrap();
    handle.emit_results(["text to discard"]);
    session.process_events();

    let (_id, rx) = session.subscribe();
    session.clear();

    let events = drain(&rx);
    assert_eq!(events.len(), 1);
    match &events[0] {
        SessionEvent::Changed(s) => {
            assert_eq!(s.transcript, "");
            assert!(!s.is_recording);
        }
        other => panic!("expected a single Changed, got {:?}", other),
    }
    assert_eq!(handle.stop_calls(), 1);
}

/// Test that dropping the session releases the engine
#[test]
fn test_drop_releases_engine() {
    init_tracing();
    let (engine, handle) = ScriptedEngine::new();
    let session =
        RecordingSession::new(Box::new(engine), SessionConfig::default()).unwrap();

    drop(session);

    assert!(handle.is_destroyed());
    assert_eq!(handle.destroy_calls(), 1);
}

/// Test reading snapshots from a second thread while the session mutates
#[test]
fn test_snapshot_reads_from_render_thread() {
    init_tracing();
    let (engine, handle) = ScriptedEngine::new();
    let mut session =
        RecordingSession::new(Box::new(engine), SessionConfig::default()).unwrap();

    session.start_default().unwrap();
    handle.emit_results(["cross thread words"]);
    session.process_events();

    let shared = session.state();
    let reader = std::thread::spawn(move || shared.snapshot());
    let snapshot = reader.join().unwrap();

    // Whatever the reader caught is a consistent pair
    assert_eq!(snapshot.transcript, "cross thread words");
    assert!(snapshot.is_recording);
}

/// Test the JSON shape of a snapshot, as a presentation layer would see it
#[test]
fn test_snapshot_serializes_for_presentation() {
    init_tracing();
    let (engine, handle) = ScriptedEngine::new();
    let mut session =
        RecordingSession::new(Box::new(engine), SessionConfig::default()).unwrap();

    session.start_default().unwrap();
    handle.emit_results(["hello json"]);
    session.process_events();

    let json = serde_json::to_value(session.snapshot()).unwrap();
    assert_eq!(json["transcript"], "hello json");
    assert_eq!(json["is_recording"], true);
    assert!(json["last_error"].is_null());
}

/// Test that the configured locale reaches the engine on every start
#[test]
fn test_configured_locale_reaches_engine() {
    init_tracing();
    let (engine, handle) = ScriptedEngine::new();
    let config = SessionConfig::default().with_locale("en-US");
    let mut session = RecordingSession::new(Box::new(engine), config).unwrap();

    session.start_default().unwrap();
    assert_eq!(handle.last_locale().as_deref(), Some("en-US"));
    session.stop();

    session.start("sv-SE").unwrap();
    assert_eq!(handle.last_locale().as_deref(), Some("sv-SE"));
    assert_eq!(session.locale(), "en-US");
}
