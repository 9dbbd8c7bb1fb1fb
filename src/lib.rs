//! Voicepad - recording session core for a single-screen speech-to-text app
//!
//! This crate coordinates user commands (start, stop, clear), an external
//! asynchronous speech-recognition engine, and the atomic
//! `(transcript, is_recording)` snapshot a presentation layer renders.
//! Audio capture and rendering stay outside: engines plug in through the
//! [`SpeechEngine`] trait, and the presentation layer reads snapshots and
//! subscribes to change notifications.

pub mod config;
pub mod engine;
pub mod error;
pub mod scenario;
pub mod session;
pub mod state;

// Re-export error types
pub use error::{Result, SessionError};

// Re-export the engine boundary
pub use engine::{EngineEvent, EngineSink, ScriptedEngine, ScriptedEngineHandle, SpeechEngine};

// Re-export session types
pub use session::{RecordingSession, SessionEvent, SubscriberId};

// Re-export state types
pub use state::{RecordingPhase, SessionSnapshot, SessionState, SharedSessionState};

// Re-export configuration
pub use config::{SessionConfig, DEFAULT_LOCALE, DEFAULT_PLACEHOLDER};
