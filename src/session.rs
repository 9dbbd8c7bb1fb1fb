//! Recording session
//!
//! The aggregate that coordinates user commands, engine events and the
//! shared state. It owns the speech engine exclusively, drains the engine
//! intake on its own thread, and commits exactly one atomic state change
//! per trigger. Observers subscribe for change notifications and read
//! snapshots; they never mutate.
//!
//! Commands apply to completion before returning: when `start` returns,
//! the new snapshot is already visible to every reader. Engine events are
//! queued on the intake and applied in arrival order by `process_events`,
//! so a result callback can never interleave with a half-applied command.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use tracing::{debug, error, info, warn};

use crate::config::SessionConfig;
use crate::engine::{engine_channel, EngineEvent, SpeechEngine};
use crate::error::{Result, SessionError};
use crate::state::{SessionSnapshot, SessionState, SharedSessionState};

/// Notifications delivered to subscribers
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The snapshot changed; the payload is the post-change state
    Changed(SessionSnapshot),
    /// An error was surfaced (start rejection or engine failure)
    Error(SessionError),
}

/// Token returned by `subscribe`, used to remove the registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

/// Coordinates user commands, engine events and the shared state
///
/// Construction wires the engine's event sink to the session intake.
/// Dropping the session releases the engine; `close` does the same thing
/// explicitly and is safe to call more than once.
pub struct RecordingSession {
    config: SessionConfig,
    state: SharedSessionState,
    engine: Box<dyn SpeechEngine>,
    intake: Receiver<EngineEvent>,
    subscribers: Vec<(SubscriberId, Sender<SessionEvent>)>,
    next_subscriber: u64,
    /// Bumped on every accepted start; appears in logs for correlation
    generation: u64,
    closed: bool,
}

impl RecordingSession {
    /// Create a session owning the given engine
    ///
    /// The engine's event sink is connected exactly once, here.
    pub fn new(mut engine: Box<dyn SpeechEngine>, config: SessionConfig) -> Result<Self> {
        config.validate().map_err(SessionError::Config)?;

        let (sink, intake) = engine_channel(config.intake_capacity);
        engine.connect(sink);
        let state = SharedSessionState::new(config.placeholder.clone());

        info!("Recording session created (locale: {})", config.locale);
        Ok(Self {
            config,
            state,
            engine,
            intake,
            subscribers: Vec::new(),
            next_subscriber: 0,
            generation: 0,
            closed: false,
        })
    }

    /// Start a recognition request for the configured locale
    pub fn start_default(&mut self) -> Result<()> {
        let locale = self.config.locale.clone();
        self.start(&locale)
    }

    /// Start a recognition request
    ///
    /// The transcript is cleared and the recording flag raised before the
    /// engine is invoked, so the first snapshot a reader sees is already
    /// the fresh one. A synchronous rejection reverts the flag, surfaces
    /// the error to subscribers and is also returned to the caller. While
    /// a request is already active this is a no-op.
    pub fn start(&mut self, locale: &str) -> Result<()> {
        if self.closed {
            warn!("Cannot start recording: session is closed");
            return Err(SessionError::StartRejected("session is closed".to_string()));
        }
        if self.state.is_recording() {
            warn!("Cannot start recording: already recording");
            return Ok(());
        }

        self.commit(|state| state.begin_recording());

        match self.engine.start(locale) {
            Ok(()) => {
                self.generation = self.generation.wrapping_add(1);
                info!(
                    "Recognition request {} started (locale: {})",
                    self.generation, locale
                );
                Ok(())
            }
            Err(err) => {
                warn!("Engine rejected start: {}", err);
                let message = err.to_string();
                self.commit(|state| state.record_error(message));
                self.broadcast(SessionEvent::Error(err.clone()));
                Err(err)
            }
        }
    }

    /// Stop the active recognition request
    ///
    /// The engine is asked to stop unconditionally (its stop is a no-op
    /// when nothing is active) and the recording flag drops immediately.
    /// Results already queued on the intake still apply afterwards.
    pub fn stop(&mut self) {
        if self.closed {
            debug!("Stop ignored: session is closed");
            return;
        }

        let was_recording = self.state.is_recording();
        self.engine.stop();
        self.commit(|state| state.end_recording());

        if was_recording {
            debug!("Recognition request {} stopped", self.generation);
        }
    }

    /// Clear the transcript, stopping the recognition first if one is live
    ///
    /// Transcript and flag move in one commit so observers never see them
    /// change separately. Clearing an already-empty idle session changes
    /// nothing and notifies nobody.
    pub fn clear(&mut self) {
        if self.closed {
            debug!("Clear ignored: session is closed");
            return;
        }

        let was_recording = self.state.is_recording();
        if was_recording {
            self.engine.stop();
            debug!("Recognition request {} cleared", self.generation);
        }
        self.commit(|state| state.clear());
    }

    /// Drain the engine intake, applying each event to completion
    ///
    /// Call this from the owning thread whenever engine events may have
    /// arrived. Returns the number of events applied.
    pub fn process_events(&mut self) -> usize {
        if self.closed {
            return 0;
        }

        let mut applied = 0;
        while let Ok(event) = self.intake.try_recv() {
            self.handle_engine_event(event);
            applied += 1;
        }
        applied
    }

    /// Register a notification subscriber
    ///
    /// Returns the removal token and the receiving end of the subscriber's
    /// queue. One `Changed` is delivered per snapshot change, plus one
    /// `Error` per surfaced failure. A full queue drops notifications for
    /// that subscriber only; it never blocks the session.
    pub fn subscribe(&mut self) -> (SubscriberId, Receiver<SessionEvent>) {
        let id = SubscriberId(self.next_subscriber);
        self.next_subscriber += 1;
        let (tx, rx) = bounded(self.config.notify_capacity);
        self.subscribers.push((id, tx));
        debug!("Subscriber {:?} registered", id);
        (id, rx)
    }

    /// Remove a subscriber registration; unknown tokens are ignored
    pub fn unsubscribe(&mut self, id: SubscriberId) {
        self.subscribers.retain(|(sub, _)| *sub != id);
        debug!("Subscriber {:?} removed", id);
    }

    /// Take an atomic snapshot of the current state
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.snapshot()
    }

    /// Get a shared handle for reading state from other threads
    pub fn state(&self) -> SharedSessionState {
        self.state.clone()
    }

    /// Check if a recognition request is believed active
    pub fn is_recording(&self) -> bool {
        self.state.is_recording()
    }

    /// Locale used by `start_default`
    pub fn locale(&self) -> &str {
        &self.config.locale
    }

    /// Release the engine and the subscriber registry
    ///
    /// Stops a live recognition first, then destroys the engine. Only the
    /// first call has effect; `drop` calls this too, so every exit path
    /// releases the engine exactly once.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if self.state.is_recording() {
            self.engine.stop();
            self.commit(|state| state.end_recording());
        }

        if let Err(err) = self.engine.destroy() {
            // Never fatal; the remaining teardown steps still run
            warn!("Engine destroy failed: {}", err);
        }

        // Dropping the receiver disconnects the engine's sink
        self.intake = crossbeam_channel::never();
        self.subscribers.clear();
        info!("Recording session closed");
    }

    fn handle_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Started => {
                debug!("Engine reported capture start");
            }
            EngineEvent::Ended => {
                // End of utterance is not a stop; the flag moves on
                // commands and errors only
                debug!("Engine reported end of utterance");
            }
            EngineEvent::Results(candidates) => {
                let Some(top) = candidates.into_iter().next() else {
                    warn!("Result event with no candidates, ignoring");
                    return;
                };
                debug!("Applying transcript candidate ({} chars)", top.len());
                self.commit(|state| state.apply_transcript(top));
            }
            EngineEvent::Error(message) => {
                error!("Engine error: {}", message);
                let err = SessionError::Engine(message.clone());
                self.commit(|state| state.record_error(message));
                self.broadcast(SessionEvent::Error(err));
            }
        }
    }

    /// Apply one mutation under the write lock and notify on change
    ///
    /// This is the only path that mutates the shared state, which is what
    /// makes each trigger atomic: readers see either the whole change or
    /// none of it, and subscribers get at most one `Changed` per trigger.
    fn commit(&mut self, apply: impl FnOnce(&mut SessionState)) -> bool {
        let (before, after) = {
            let mut state = self.state.write();
            let before = state.snapshot();
            apply(&mut state);
            (before, state.snapshot())
        };

        let changed = after != before;
        if changed {
            self.broadcast(SessionEvent::Changed(after));
        }
        changed
    }

    fn broadcast(&mut self, event: SessionEvent) {
        // Disconnected subscribers are pruned as they are discovered
        self.subscribers.retain(|(id, tx)| match tx.try_send(event.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("Subscriber {:?} queue full, notification dropped", id);
                true
            }
            Err(TrySendError::Disconnected(_)) => {
                debug!("Subscriber {:?} disconnected, removing", id);
                false
            }
        });
    }
}

impl Drop for RecordingSession {
    fn drop(&mut self) {
        self.close();
    }
}
