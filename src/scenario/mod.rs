//! Scripted scenario module for exercising a recording session
//!
//! This module provides functionality to run predefined session scenarios
//! by loading TOML files that describe an ordered script of user commands
//! and injected engine events. Scenarios are deterministic: each step is
//! applied to completion before the next one, matching the session's own
//! one-trigger-at-a-time processing model, so no step ever needs a wall
//! clock or a sleep.

mod runner;

pub use runner::{CheckOutcome, ScenarioReport, ScenarioRunner};

use serde::Deserialize;
use std::fs;
use std::path::Path;

/// A scenario loaded from a TOML file
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioConfig {
    /// Scenario metadata
    pub scenario: ScenarioMetadata,
    /// Ordered list of steps to execute
    pub steps: Vec<ScenarioStep>,
}

/// Metadata about the scenario
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioMetadata {
    /// Name of the scenario
    pub name: String,
    /// Description of what the scenario validates
    #[serde(default)]
    pub description: String,
    /// Recognition locale for the session under test (defaults apply when
    /// omitted)
    #[serde(default)]
    pub locale: Option<String>,
}

/// A single scripted step
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioStep {
    /// The action to perform
    pub action: StepAction,
    /// Optional check to evaluate after the action has applied
    #[serde(default)]
    pub check: Option<StepCheck>,
}

/// Actions a scenario step can perform
///
/// User commands go straight to the session; `engine_*` steps inject an
/// event through the engine's sink and then pump the intake so the event
/// has fully applied before any check runs.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepAction {
    /// Issue the start command
    Start {
        /// Locale override; the session default is used when omitted
        #[serde(default)]
        locale: Option<String>,
    },
    /// Issue the stop command
    Stop,
    /// Issue the clear command
    Clear,
    /// Inject a capture-start event
    EngineStarted,
    /// Inject an end-of-utterance event
    EngineEnded,
    /// Inject ranked transcription candidates, best first
    EngineResults {
        /// Candidate texts
        candidates: Vec<String>,
    },
    /// Inject a recognition failure
    EngineError {
        /// Failure message
        message: String,
    },
    /// Queue a synchronous rejection for the next start command
    RejectNextStart {
        /// Rejection reason
        reason: String,
    },
    /// Log a message for debugging
    Log {
        /// Message to log
        message: String,
    },
    /// Close the session
    Close,
}

/// Checks evaluated against the session after a step
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepCheck {
    /// Assert the full snapshot pair at once
    Snapshot {
        /// Expected transcript text
        transcript: String,
        /// Expected recording flag
        is_recording: bool,
    },
    /// Assert the transcript equals the given text
    TranscriptIs {
        /// Expected text
        text: String,
    },
    /// Assert the transcript contains a substring (case-sensitive)
    TranscriptContains {
        /// Substring to search for
        text: String,
    },
    /// Assert that a recognition request is believed active
    IsRecording,
    /// Assert that the session is idle
    IsIdle,
    /// Assert how many error notifications have been observed so far
    ErrorCount {
        /// Expected count
        count: usize,
    },
    /// Assert how many change notifications have been observed so far
    ChangeCount {
        /// Expected count
        count: usize,
    },
    /// Assert how many start calls the engine has observed
    EngineStartCount {
        /// Expected count
        count: u32,
    },
    /// Assert how many stop calls the engine has observed
    EngineStopCount {
        /// Expected count
        count: u32,
    },
    /// Assert how many destroy calls the engine has observed
    EngineDestroyCount {
        /// Expected count
        count: u32,
    },
}

impl ScenarioConfig {
    /// Load a scenario from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ScenarioError::IoError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        let config: ScenarioConfig =
            toml::from_str(&content).map_err(|e| ScenarioError::ParseError {
                path: path.display().to_string(),
                error: e.to_string(),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the scenario
    fn validate(&self) -> Result<(), ScenarioError> {
        if self.steps.is_empty() {
            return Err(ScenarioError::ValidationError(
                "Scenario must have at least one step".to_string(),
            ));
        }

        // A queued rejection that no later start consumes is a scripting
        // mistake
        let mut rejection_pending = false;
        for step in &self.steps {
            match step.action {
                StepAction::RejectNextStart { .. } => rejection_pending = true,
                StepAction::Start { .. } => rejection_pending = false,
                _ => {}
            }
        }
        if rejection_pending {
            return Err(ScenarioError::ValidationError(
                "reject_next_start must be followed by a start step".to_string(),
            ));
        }

        Ok(())
    }
}

/// Errors that can occur when loading or validating scenarios
#[derive(Debug, Clone)]
pub enum ScenarioError {
    /// IO error reading the file
    IoError { path: String, error: String },
    /// Error parsing the TOML
    ParseError { path: String, error: String },
    /// Validation error in the scenario
    ValidationError(String),
}

impl std::fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioError::IoError { path, error } => {
                write!(f, "Failed to read scenario '{}': {}", path, error)
            }
            ScenarioError::ParseError { path, error } => {
                write!(f, "Failed to parse scenario '{}': {}", path, error)
            }
            ScenarioError::ValidationError(msg) => {
                write!(f, "Invalid scenario: {}", msg)
            }
        }
    }
}

impl std::error::Error for ScenarioError {}
