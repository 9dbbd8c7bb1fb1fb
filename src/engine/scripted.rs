//! Scripted speech engine
//!
//! A deterministic [`SpeechEngine`] for scenarios and tests. It recognizes
//! nothing by itself: it records every call the session makes and lets a
//! handle inject events through the connected sink exactly as a platform
//! recognizer would from its callback thread.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::warn;

use crate::engine::{EngineSink, SpeechEngine};
use crate::error::{Result, SessionError};

#[derive(Default)]
struct Inner {
    sink: Option<EngineSink>,
    active: bool,
    destroyed: bool,
    reject_next_start: Option<String>,
    fail_next_destroy: Option<String>,
    start_calls: u32,
    stop_calls: u32,
    destroy_calls: u32,
    locales: Vec<String>,
}

/// Deterministic engine: records calls, emits only what its handle injects
pub struct ScriptedEngine {
    inner: Arc<Mutex<Inner>>,
}

/// Test-side handle observing and driving a [`ScriptedEngine`]
#[derive(Clone)]
pub struct ScriptedEngineHandle {
    inner: Arc<Mutex<Inner>>,
}

impl ScriptedEngine {
    /// Create an engine and the handle that observes it
    pub fn new() -> (Self, ScriptedEngineHandle) {
        let inner = Arc::new(Mutex::new(Inner::default()));
        (
            Self {
                inner: inner.clone(),
            },
            ScriptedEngineHandle { inner },
        )
    }
}

impl SpeechEngine for ScriptedEngine {
    fn connect(&mut self, sink: EngineSink) {
        // Replace, never accumulate
        self.inner.lock().sink = Some(sink);
    }

    fn start(&mut self, locale: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.start_calls += 1;
        inner.locales.push(locale.to_string());

        if let Some(reason) = inner.reject_next_start.take() {
            return Err(SessionError::StartRejected(reason));
        }
        if inner.destroyed {
            return Err(SessionError::StartRejected("engine destroyed".to_string()));
        }
        if inner.active {
            return Err(SessionError::StartRejected(
                "recognition already active".to_string(),
            ));
        }

        inner.active = true;
        Ok(())
    }

    fn stop(&mut self) {
        let mut inner = self.inner.lock();
        inner.stop_calls += 1;
        inner.active = false;
    }

    fn destroy(&mut self) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.destroy_calls += 1;

        if let Some(reason) = inner.fail_next_destroy.take() {
            return Err(SessionError::Teardown(reason));
        }

        inner.destroyed = true;
        inner.active = false;
        Ok(())
    }
}

impl ScriptedEngineHandle {
    /// Queue a synchronous rejection for the next `start` call
    pub fn reject_next_start(&self, reason: impl Into<String>) {
        self.inner.lock().reject_next_start = Some(reason.into());
    }

    /// Queue a failure for the next `destroy` call
    pub fn fail_next_destroy(&self, reason: impl Into<String>) {
        self.inner.lock().fail_next_destroy = Some(reason.into());
    }

    /// Post a capture-start event through the connected sink
    pub fn emit_started(&self) {
        self.with_sink(|sink| sink.started());
    }

    /// Post an end-of-utterance event through the connected sink
    pub fn emit_ended(&self) {
        self.with_sink(|sink| sink.ended());
    }

    /// Post ranked candidates through the connected sink, best first
    pub fn emit_results<I, S>(&self, candidates: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let candidates: Vec<String> = candidates.into_iter().map(Into::into).collect();
        self.with_sink(|sink| sink.results(candidates));
    }

    /// Post a recognition failure through the connected sink
    pub fn emit_error(&self, message: impl Into<String>) {
        let message = message.into();
        self.with_sink(|sink| sink.error(message));
    }

    /// Number of `start` calls observed
    pub fn start_calls(&self) -> u32 {
        self.inner.lock().start_calls
    }

    /// Number of `stop` calls observed
    pub fn stop_calls(&self) -> u32 {
        self.inner.lock().stop_calls
    }

    /// Number of `destroy` calls observed
    pub fn destroy_calls(&self) -> u32 {
        self.inner.lock().destroy_calls
    }

    /// Whether a recognition request is currently active
    pub fn is_active(&self) -> bool {
        self.inner.lock().active
    }

    /// Whether the engine's resources have been released
    pub fn is_destroyed(&self) -> bool {
        self.inner.lock().destroyed
    }

    /// Locale of the most recent `start` call, if any
    pub fn last_locale(&self) -> Option<String> {
        self.inner.lock().locales.last().cloned()
    }

    fn with_sink(&self, f: impl FnOnce(&EngineSink)) {
        let sink = self.inner.lock().sink.clone();
        match sink {
            Some(sink) => f(&sink),
            None => warn!("scripted engine has no sink connected, event dropped"),
        }
    }
}
