//! Session state for the voicepad recording core
//!
//! This module provides the pure state owned by the recording session and
//! the thread-safe wrapper the presentation layer reads from:
//! - **RecordingSession**: applies triggers (user commands, engine events)
//!   and commits exactly one state change per trigger
//! - **Presentation layer**: takes snapshots for rendering, never mutates
//!
//! The design separates:
//! - **State**: the mutable `(transcript, phase)` pair plus the last
//!   surfaced error
//! - **Snapshot**: an immutable copy taken under a single lock, so a reader
//!   never sees a recording flag that is stale relative to its transcript

use parking_lot::RwLock;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Recording phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordingPhase {
    /// No recognition request outstanding
    #[default]
    Idle,
    /// A recognition request was accepted and has not been stopped,
    /// cleared, or failed
    Recording,
}

impl RecordingPhase {
    /// Check if a recognition request is believed active
    pub fn is_recording(&self) -> bool {
        matches!(self, RecordingPhase::Recording)
    }

    /// Check if the session is idle
    pub fn is_idle(&self) -> bool {
        matches!(self, RecordingPhase::Idle)
    }
}

impl fmt::Display for RecordingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordingPhase::Idle => write!(f, "Idle"),
            RecordingPhase::Recording => write!(f, "Recording"),
        }
    }
}

/// Session state
///
/// Single source of truth for what the presentation layer shows. Mutated
/// only by the recording session, one trigger at a time.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Current recording phase
    pub phase: RecordingPhase,
    /// Current transcript text (the placeholder greeting before any
    /// recording has happened)
    pub transcript: String,
    /// Most recent surfaced error, if any
    pub last_error: Option<String>,
}

impl SessionState {
    /// Create state showing the given placeholder greeting
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            phase: RecordingPhase::Idle,
            transcript: placeholder.into(),
            last_error: None,
        }
    }

    /// A recognition request was accepted: the transcript is cleared
    /// before any result arrives and prior errors are forgotten
    pub fn begin_recording(&mut self) {
        self.phase = RecordingPhase::Recording;
        self.transcript.clear();
        self.last_error = None;
    }

    /// The request ended (stop command or failure); the transcript keeps
    /// whatever the engine produced so far
    pub fn end_recording(&mut self) {
        self.phase = RecordingPhase::Idle;
    }

    /// Clear command: transcript and phase move in the same mutation so a
    /// snapshot never catches one without the other
    pub fn clear(&mut self) {
        self.transcript.clear();
        self.phase = RecordingPhase::Idle;
    }

    /// Result event: full replacement of the transcript, never an append.
    /// Applies in any phase; a result arriving after stop is still shown.
    pub fn apply_transcript(&mut self, text: impl Into<String>) {
        self.transcript = text.into();
    }

    /// Engine failure: the phase drops to idle, the transcript is kept
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.phase = RecordingPhase::Idle;
        self.last_error = Some(message.into());
    }

    /// Check if a recognition request is believed active
    pub fn is_recording(&self) -> bool {
        self.phase.is_recording()
    }

    /// Check if the session is idle
    pub fn is_idle(&self) -> bool {
        self.phase.is_idle()
    }

    /// Take an immutable copy of the current state
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            transcript: self.transcript.clone(),
            is_recording: self.phase.is_recording(),
            last_error: self.last_error.clone(),
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new("")
    }
}

/// Immutable snapshot of the session state
///
/// The `(transcript, is_recording)` pair is copied under one lock, so a
/// reader never observes a half-applied trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    /// Transcript text at the time of the snapshot
    pub transcript: String,
    /// Whether a recognition request was believed active
    pub is_recording: bool,
    /// Most recent surfaced error, if any
    pub last_error: Option<String>,
}

impl SessionSnapshot {
    /// True when there is text worth clearing
    pub fn has_transcript(&self) -> bool {
        !self.transcript.is_empty()
    }
}

/// Thread-safe shared session state
///
/// Wraps `SessionState` in `Arc<RwLock>`. The recording session holds one
/// clone and writes through it; any number of readers may hold clones and
/// take snapshots without coordinating with the session.
#[derive(Clone)]
pub struct SharedSessionState {
    inner: Arc<RwLock<SessionState>>,
}

impl SharedSessionState {
    /// Create shared state showing the given placeholder greeting
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(SessionState::new(placeholder))),
        }
    }

    /// Get read access to the state
    pub fn read(&self) -> parking_lot::RwLockReadGuard<'_, SessionState> {
        self.inner.read()
    }

    /// Get write access to the state. Restricted to the session so every
    /// mutation goes through one commit path.
    pub(crate) fn write(&self) -> parking_lot::RwLockWriteGuard<'_, SessionState> {
        self.inner.write()
    }

    /// Take an atomic snapshot of the current state
    pub fn snapshot(&self) -> SessionSnapshot {
        self.read().snapshot()
    }

    /// Check if a recognition request is believed active
    pub fn is_recording(&self) -> bool {
        self.read().is_recording()
    }

    /// Get the current transcript text
    pub fn transcript(&self) -> String {
        self.read().transcript.clone()
    }

    /// Get the most recent surfaced error, if any
    pub fn last_error(&self) -> Option<String> {
        self.read().last_error.clone()
    }
}

impl Default for SharedSessionState {
    fn default() -> Self {
        Self::new("")
    }
}
