//! Error types for the voicepad session core
//!
//! This module defines the error taxonomy shared by the recording session
//! and the speech engine boundary.

use thiserror::Error;

/// Errors surfaced by the recording session and the engine boundary
#[derive(Error, Debug, Clone)]
pub enum SessionError {
    /// The engine synchronously refused a recognition request (already
    /// active, permission denied, unsupported locale).
    #[error("recognition start rejected: {0}")]
    StartRejected(String),

    /// The engine reported a failure while a recognition request was live.
    #[error("speech engine error: {0}")]
    Engine(String),

    /// Releasing the engine at teardown failed. Logged and swallowed; the
    /// remaining teardown steps still run.
    #[error("engine teardown error: {0}")]
    Teardown(String),

    /// Internal notification plumbing failure.
    #[error("channel error: {0}")]
    Channel(String),

    /// Invalid session configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl SessionError {
    /// Check if this error is recoverable
    ///
    /// Recoverable errors leave the session usable; the user may simply
    /// retry the recording. Non-recoverable errors mean the engine or the
    /// session plumbing needs to be rebuilt.
    pub fn is_recoverable(&self) -> bool {
        match self {
            // The user can retry after a rejected or failed request
            SessionError::StartRejected(_) => true,
            SessionError::Engine(_) => true,
            // Teardown failures mean the engine is already gone
            SessionError::Teardown(_) => false,
            // Channel errors indicate internal issues
            SessionError::Channel(_) => false,
            SessionError::Config(_) => false,
        }
    }

    /// Get a user-friendly description of the error
    ///
    /// Returns a message suitable for display by the presentation layer.
    pub fn user_message(&self) -> String {
        match self {
            SessionError::StartRejected(_) => {
                "Could not start recording. Please check microphone permissions and try again."
                    .to_string()
            }
            SessionError::Engine(_) => "Speech recognition failed. Please try again.".to_string(),
            SessionError::Teardown(_) => {
                "The speech engine did not shut down cleanly.".to_string()
            }
            SessionError::Channel(_) => {
                "Internal communication error. Please restart the application.".to_string()
            }
            SessionError::Config(_) => {
                "Configuration error. Please check your settings.".to_string()
            }
        }
    }
}

/// Result type alias for session operations
pub type Result<T> = std::result::Result<T, SessionError>;
