//! Scenario runner for executing scripted session scenarios
//!
//! This module provides the ScenarioRunner that drives a fresh recording
//! session, backed by a scripted engine, through the steps of a scenario
//! and records the outcome of every check.

use crossbeam_channel::Receiver;
use tracing::{debug, error, info};

use super::{ScenarioConfig, StepAction, StepCheck};
use crate::config::SessionConfig;
use crate::engine::{ScriptedEngine, ScriptedEngineHandle};
use crate::error::Result;
use crate::session::{RecordingSession, SessionEvent};

/// Result of a single check
#[derive(Debug, Clone)]
pub enum CheckOutcome {
    /// Check passed
    Passed,
    /// Check failed with reason
    Failed(String),
}

/// Outcome of a full scenario run
#[derive(Debug, Clone)]
pub struct ScenarioReport {
    /// Name of the scenario
    pub name: String,
    /// Number of steps executed
    pub steps_executed: usize,
    /// Failure descriptions, one per failed check
    pub failures: Vec<String>,
}

impl ScenarioReport {
    /// Check if every check in the scenario passed
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }

    /// Get a summary of the scenario result
    pub fn summary(&self) -> String {
        let status = if self.passed() { "PASSED" } else { "FAILED" };
        format!(
            "[SCENARIO] Scenario '{}' {}: Executed {} steps, {} failed checks",
            self.name,
            status,
            self.steps_executed,
            self.failures.len()
        )
    }
}

/// Drives a recording session through a scripted scenario
///
/// The runner subscribes to the session before the first step, so the
/// notification counts its checks see start at zero.
pub struct ScenarioRunner {
    config: ScenarioConfig,
    session: RecordingSession,
    engine: ScriptedEngineHandle,
    notifications: Receiver<SessionEvent>,
    changes_seen: usize,
    errors_seen: usize,
}

impl ScenarioRunner {
    /// Create a runner with a fresh session and scripted engine
    pub fn new(config: ScenarioConfig) -> Result<Self> {
        info!("[SCENARIO] Loaded scenario: {}", config.scenario.name);
        if !config.scenario.description.is_empty() {
            info!("[SCENARIO] Description: {}", config.scenario.description);
        }
        info!("[SCENARIO] Total steps: {}", config.steps.len());

        let (engine, handle) = ScriptedEngine::new();
        let mut session_config = SessionConfig::default();
        if let Some(locale) = &config.scenario.locale {
            session_config = session_config.with_locale(locale.clone());
        }
        let mut session = RecordingSession::new(Box::new(engine), session_config)?;
        let (_id, notifications) = session.subscribe();

        Ok(Self {
            config,
            session,
            engine: handle,
            notifications,
            changes_seen: 0,
            errors_seen: 0,
        })
    }

    /// Execute every step and return the report
    pub fn run(mut self) -> ScenarioReport {
        let steps = self.config.steps.clone();
        let name = self.config.scenario.name.clone();
        let mut failures = Vec::new();

        for (index, step) in steps.iter().enumerate() {
            debug!("[SCENARIO] Executing step {}: {:?}", index, step.action);
            self.apply(&step.action);
            self.drain_notifications();

            if let Some(check) = &step.check {
                match self.check(check) {
                    CheckOutcome::Passed => {
                        info!("[SCENARIO] PASS: Check {:?}", check);
                    }
                    CheckOutcome::Failed(reason) => {
                        error!("[SCENARIO] FAIL: Check {:?} - {}", check, reason);
                        failures.push(format!("step {}: {}", index, reason));
                    }
                }
            }
        }

        let report = ScenarioReport {
            name,
            steps_executed: steps.len(),
            failures,
        };
        info!("{}", report.summary());
        report
    }

    fn apply(&mut self, action: &StepAction) {
        match action {
            StepAction::Start { locale } => {
                let result = match locale {
                    Some(tag) => self.session.start(tag),
                    None => self.session.start_default(),
                };
                if let Err(err) = result {
                    debug!("[SCENARIO] Start rejected: {}", err);
                }
            }
            StepAction::Stop => self.session.stop(),
            StepAction::Clear => self.session.clear(),
            StepAction::EngineStarted => {
                self.engine.emit_started();
                self.session.process_events();
            }
            StepAction::EngineEnded => {
                self.engine.emit_ended();
                self.session.process_events();
            }
            StepAction::EngineResults { candidates } => {
                self.engine.emit_results(candidates.clone());
                self.session.process_events();
            }
            StepAction::EngineError { message } => {
                self.engine.emit_error(message.clone());
                self.session.process_events();
            }
            StepAction::RejectNextStart { reason } => {
                self.engine.reject_next_start(reason.clone());
            }
            StepAction::Log { message } => {
                info!("[SCENARIO] Log: {}", message);
            }
            StepAction::Close => self.session.close(),
        }
    }

    fn drain_notifications(&mut self) {
        while let Ok(event) = self.notifications.try_recv() {
            match event {
                SessionEvent::Changed(_) => self.changes_seen += 1,
                SessionEvent::Error(_) => self.errors_seen += 1,
            }
        }
    }

    fn check(&self, check: &StepCheck) -> CheckOutcome {
        let snapshot = self.session.snapshot();
        match check {
            StepCheck::Snapshot {
                transcript,
                is_recording,
            } => {
                if &snapshot.transcript == transcript && snapshot.is_recording == *is_recording {
                    CheckOutcome::Passed
                } else {
                    CheckOutcome::Failed(format!(
                        "Expected snapshot ({:?}, recording: {}), got ({:?}, recording: {})",
                        transcript, is_recording, snapshot.transcript, snapshot.is_recording
                    ))
                }
            }
            StepCheck::TranscriptIs { text } => {
                if &snapshot.transcript == text {
                    CheckOutcome::Passed
                } else {
                    CheckOutcome::Failed(format!(
                        "Expected transcript {:?}, got {:?}",
                        text, snapshot.transcript
                    ))
                }
            }
            StepCheck::TranscriptContains { text } => {
                if snapshot.transcript.contains(text) {
                    CheckOutcome::Passed
                } else {
                    CheckOutcome::Failed(format!(
                        "Expected transcript to contain {:?}, got {:?}",
                        text, snapshot.transcript
                    ))
                }
            }
            StepCheck::IsRecording => {
                if snapshot.is_recording {
                    CheckOutcome::Passed
                } else {
                    CheckOutcome::Failed("Expected session to be recording".to_string())
                }
            }
            StepCheck::IsIdle => {
                if !snapshot.is_recording {
                    CheckOutcome::Passed
                } else {
                    CheckOutcome::Failed("Expected session to be idle".to_string())
                }
            }
            StepCheck::ErrorCount { count } => {
                if self.errors_seen == *count {
                    CheckOutcome::Passed
                } else {
                    CheckOutcome::Failed(format!(
                        "Expected {} error notifications, observed {}",
                        count, self.errors_seen
                    ))
                }
            }
            StepCheck::ChangeCount { count } => {
                if self.changes_seen == *count {
                    CheckOutcome::Passed
                } else {
                    CheckOutcome::Failed(format!(
                        "Expected {} change notifications, observed {}",
                        count, self.changes_seen
                    ))
                }
            }
            StepCheck::EngineStartCount { count } => {
                if self.engine.start_calls() == *count {
                    CheckOutcome::Passed
                } else {
                    CheckOutcome::Failed(format!(
                        "Expected {} engine start calls, observed {}",
                        count,
                        self.engine.start_calls()
                    ))
                }
            }
            StepCheck::EngineStopCount { count } => {
                if self.engine.stop_calls() == *count {
                    CheckOutcome::Passed
                } else {
                    CheckOutcome::Failed(format!(
                        "Expected {} engine stop calls, observed {}",
                        count,
                        self.engine.stop_calls()
                    ))
                }
            }
            StepCheck::EngineDestroyCount { count } => {
                if self.engine.destroy_calls() == *count {
                    CheckOutcome::Passed
                } else {
                    CheckOutcome::Failed(format!(
                        "Expected {} engine destroy calls, observed {}",
                        count,
                        self.engine.destroy_calls()
                    ))
                }
            }
        }
    }
}
