//! Speech engine boundary
//!
//! The recording session never talks to a platform recognizer directly; it
//! drives the [`SpeechEngine`] trait and consumes the typed events the
//! engine posts back. Events cross threads through a bounded intake channel
//! and are applied one at a time on the session's own thread, so an engine
//! callback never races a user command.

pub mod scripted;

// Re-export the deterministic engine used by scenarios and tests
pub use scripted::{ScriptedEngine, ScriptedEngineHandle};

use crossbeam_channel::{bounded, Receiver, Sender};
use tracing::warn;

use crate::error::Result;

/// Events a speech engine posts onto the session intake
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The engine began capturing an utterance. Informational.
    Started,
    /// The engine detected end of utterance. Informational; the session's
    /// recording flag moves on commands and errors, not on this.
    Ended,
    /// Ranked transcription candidates, best first. The session consumes
    /// only the top candidate; an empty list is ignored.
    Results(Vec<String>),
    /// The live recognition request failed.
    Error(String),
}

/// Sink handed to a speech engine when the session connects it
///
/// Wraps the sending half of the session intake. Posting never blocks: if
/// the intake is full the event is dropped with a warning rather than
/// stalling the engine's callback thread.
#[derive(Clone)]
pub struct EngineSink {
    tx: Sender<EngineEvent>,
}

impl EngineSink {
    /// Post a capture-start notification
    pub fn started(&self) {
        self.post(EngineEvent::Started);
    }

    /// Post an end-of-utterance notification
    pub fn ended(&self) {
        self.post(EngineEvent::Ended);
    }

    /// Post ranked transcription candidates, best first
    pub fn results(&self, candidates: Vec<String>) {
        self.post(EngineEvent::Results(candidates));
    }

    /// Post a recognition failure
    pub fn error(&self, message: impl Into<String>) {
        self.post(EngineEvent::Error(message.into()));
    }

    fn post(&self, event: EngineEvent) {
        if let Err(e) = self.tx.try_send(event) {
            warn!("engine event dropped: {}", e);
        }
    }
}

/// Create the intake channel connecting an engine to a session
///
/// Returns the sink for the engine side and the receiver the session
/// drains.
pub fn engine_channel(capacity: usize) -> (EngineSink, Receiver<EngineEvent>) {
    let (tx, rx) = bounded(capacity);
    (EngineSink { tx }, rx)
}

/// Contract for a speech recognition engine
///
/// Implementations wrap a platform recognizer. The session owns its engine
/// exclusively: it connects one sink at construction and is the only caller
/// of `start`, `stop` and `destroy`.
pub trait SpeechEngine: Send {
    /// Register the sink the engine posts events through
    ///
    /// Exactly one sink is live per engine; a second call replaces the
    /// first rather than accumulating subscribers.
    fn connect(&mut self, sink: EngineSink);

    /// Begin an asynchronous recognition request for the given locale tag
    ///
    /// Rejections are synchronous: an error is returned when a request is
    /// already active or the platform denies the capability. `Ok` only
    /// means the request was issued; outcomes arrive later as events.
    fn start(&mut self, locale: &str) -> Result<()>;

    /// Request termination of the current recognition
    ///
    /// Safe to call when nothing is active. Candidates already produced
    /// may still arrive as events afterwards.
    fn stop(&mut self);

    /// Release underlying platform resources
    ///
    /// Idempotent, and safe to call mid-recognition. Failures are reported
    /// so the caller can log them; they never stop a teardown.
    fn destroy(&mut self) -> Result<()>;
}
