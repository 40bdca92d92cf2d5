use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::clock::RecordingClock;
use crate::engine::{EngineError, EngineEvent, PermissionState, SpeechEngine};
use crate::transcript::TranscriptReconciler;

/// Session lifecycle states
///
/// `Unsupported` is terminal: the environment has no recognition engine
/// and no retry can change that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    RequestingPermission,
    Recording,
    Stopped,
    Unsupported,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("speech recognition is not available in this environment")]
    Unsupported,

    #[error("microphone permission denied")]
    PermissionDenied,

    #[error("a recording session is already active")]
    AlreadyRecording,

    #[error("no recording session is active")]
    NotRecording,

    #[error(transparent)]
    Engine(#[from] anyhow::Error),
}

/// Point-in-time view of a session for status reporting
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub elapsed_seconds: u64,
    pub last_error: Option<String>,
}

/// Owns the lifecycle of a continuous recognition engine instance
///
/// Continuous engines silently end after a timeout/silence window; an
/// unexpected end while the session is logically recording restarts the
/// engine transparently. `stop()` flips the logical flag *before* closing
/// the engine so the restart guard observes it and stands down.
pub struct RecognitionSession {
    engine: Arc<Mutex<Option<Box<dyn SpeechEngine>>>>,

    state: Arc<Mutex<SessionState>>,

    /// Logical recording flag: the restart guard. Cooperative cancellation
    /// checks this rather than killing callbacks.
    recording: Arc<AtomicBool>,

    reconciler: Arc<Mutex<TranscriptReconciler>>,

    clock: Arc<Mutex<RecordingClock>>,

    last_error: Arc<Mutex<Option<EngineError>>>,

    pump_task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl RecognitionSession {
    /// Create a session around a recognition engine
    pub fn new(
        engine: Box<dyn SpeechEngine>,
        reconciler: Arc<Mutex<TranscriptReconciler>>,
    ) -> Self {
        Self {
            engine: Arc::new(Mutex::new(Some(engine))),
            state: Arc::new(Mutex::new(SessionState::Idle)),
            recording: Arc::new(AtomicBool::new(false)),
            reconciler,
            clock: Arc::new(Mutex::new(RecordingClock::new())),
            last_error: Arc::new(Mutex::new(None)),
            pump_task: Arc::new(Mutex::new(None)),
        }
    }

    /// Create a session for an environment with no recognition engine.
    /// Every `start()` fails with `Unsupported`.
    pub fn unsupported(reconciler: Arc<Mutex<TranscriptReconciler>>) -> Self {
        Self {
            engine: Arc::new(Mutex::new(None)),
            state: Arc::new(Mutex::new(SessionState::Unsupported)),
            recording: Arc::new(AtomicBool::new(false)),
            reconciler,
            clock: Arc::new(Mutex::new(RecordingClock::new())),
            last_error: Arc::new(Mutex::new(None)),
            pump_task: Arc::new(Mutex::new(None)),
        }
    }

    /// Start recording
    ///
    /// Legal from `Idle` or `Stopped`. Requests microphone access first; a
    /// denial returns the session to `Idle` and is retryable.
    pub async fn start(&self) -> Result<(), SessionError> {
        {
            let mut state = self.state.lock().await;
            match *state {
                SessionState::Idle | SessionState::Stopped => {}
                SessionState::Unsupported => return Err(SessionError::Unsupported),
                SessionState::Recording | SessionState::RequestingPermission => {
                    warn!("start rejected: session already active");
                    return Err(SessionError::AlreadyRecording);
                }
            }
            *state = SessionState::RequestingPermission;
        }

        // The previous pump has observed Stopped and exited; reap it
        if let Some(task) = self.pump_task.lock().await.take() {
            let _ = task.await;
        }

        let mut engine_slot = self.engine.lock().await;
        let engine = match engine_slot.as_mut() {
            Some(engine) => engine,
            None => {
                *self.state.lock().await = SessionState::Unsupported;
                return Err(SessionError::Unsupported);
            }
        };

        match engine.request_permission().await {
            Ok(PermissionState::Granted) => {}
            Ok(PermissionState::Denied) => {
                *self.state.lock().await = SessionState::Idle;
                *self.last_error.lock().await = Some(EngineError::PermissionDenied);
                warn!("microphone permission denied");
                return Err(SessionError::PermissionDenied);
            }
            Err(e) => {
                *self.state.lock().await = SessionState::Idle;
                return Err(SessionError::Engine(e));
            }
        }

        // New session: transcript state and seen keys reset here and only here
        self.reconciler.lock().await.reset();
        *self.last_error.lock().await = None;

        let events = match engine.open().await {
            Ok(events) => events,
            Err(e) => {
                *self.state.lock().await = SessionState::Idle;
                error!("failed to open recognition engine: {}", e);
                return Err(SessionError::Engine(e));
            }
        };
        let engine_name = engine.name().to_string();
        drop(engine_slot);

        *self.state.lock().await = SessionState::Recording;
        self.recording.store(true, Ordering::SeqCst);
        self.clock.lock().await.start();

        info!(engine = %engine_name, "recording session started");

        let pump = tokio::spawn(Self::pump(
            Arc::clone(&self.engine),
            Arc::clone(&self.state),
            Arc::clone(&self.recording),
            Arc::clone(&self.reconciler),
            Arc::clone(&self.clock),
            Arc::clone(&self.last_error),
            events,
        ));

        *self.pump_task.lock().await = Some(pump);

        Ok(())
    }

    /// Stop recording
    ///
    /// Sets the logical state to `Stopped` *before* closing the engine so
    /// an in-flight `Ended` event cannot trigger a restart.
    pub async fn stop(&self) -> Result<(), SessionError> {
        {
            let mut state = self.state.lock().await;
            if *state != SessionState::Recording {
                warn!("stop rejected: session not recording");
                return Err(SessionError::NotRecording);
            }
            *state = SessionState::Stopped;
        }

        self.recording.store(false, Ordering::SeqCst);
        self.clock.lock().await.stop();

        if let Some(engine) = self.engine.lock().await.as_mut() {
            engine.close().await.map_err(SessionError::Engine)?;
        }

        if let Some(task) = self.pump_task.lock().await.take() {
            if let Err(e) = task.await {
                error!("event pump task panicked: {}", e);
            }
        }

        info!("recording session stopped");

        Ok(())
    }

    /// Event pump: forwards recognition results to the reconciler in
    /// arrival order and restarts the engine across unexpected ends.
    async fn pump(
        engine: Arc<Mutex<Option<Box<dyn SpeechEngine>>>>,
        state: Arc<Mutex<SessionState>>,
        recording: Arc<AtomicBool>,
        reconciler: Arc<Mutex<TranscriptReconciler>>,
        clock: Arc<Mutex<RecordingClock>>,
        last_error: Arc<Mutex<Option<EngineError>>>,
        mut events: mpsc::Receiver<EngineEvent>,
    ) {
        debug!("recognition event pump started");

        'capture: loop {
            // A closed channel without an explicit Ended means the same
            // thing: the engine is gone
            while let Some(event) = events.recv().await {
                match event {
                    EngineEvent::Result { segments } => {
                        let mut reconciler = reconciler.lock().await;
                        for segment in segments {
                            if segment.is_final {
                                reconciler.push_final(&segment.text);
                            } else {
                                reconciler.push_interim(&segment.text);
                            }
                        }
                    }

                    EngineEvent::Error(EngineError::NoSpeechTimeout) => {
                        // Expected on silence; capture continues
                        debug!("engine reported no-speech timeout; ignoring");
                    }

                    EngineEvent::Error(e) => {
                        warn!("recognition error: {}", e);
                        recording.store(false, Ordering::SeqCst);
                        *state.lock().await = SessionState::Stopped;
                        clock.lock().await.stop();
                        *last_error.lock().await = Some(e);

                        if let Some(engine) = engine.lock().await.as_mut() {
                            if let Err(e) = engine.close().await {
                                warn!("failed to close engine after error: {}", e);
                            }
                        }
                        break 'capture;
                    }

                    EngineEvent::Ended => break,
                }
            }

            if !recording.load(Ordering::SeqCst) {
                break;
            }

            // Engine ended on its own while we are logically recording:
            // restart it transparently so continuous capture survives the
            // platform's silence window
            let mut engine_slot = engine.lock().await;

            // stop() may have won the race for the engine lock
            if !recording.load(Ordering::SeqCst) {
                break;
            }

            let Some(engine) = engine_slot.as_mut() else {
                break;
            };

            debug!("engine ended unexpectedly; restarting");

            match engine.open().await {
                Ok(next_events) => {
                    events = next_events;
                }
                Err(e) => {
                    error!("engine restart failed: {}", e);
                    recording.store(false, Ordering::SeqCst);
                    *state.lock().await = SessionState::Stopped;
                    clock.lock().await.stop();
                    *last_error.lock().await = Some(EngineError::Other(e.to_string()));
                    break;
                }
            }
        }

        debug!("recognition event pump stopped");
    }

    pub async fn state(&self) -> SessionState {
        *self.state.lock().await
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let clock = self.clock.lock().await;

        SessionSnapshot {
            state: *self.state.lock().await,
            started_at: clock.started_at(),
            ended_at: clock.ended_at(),
            elapsed_seconds: clock.elapsed_seconds(),
            last_error: self
                .last_error
                .lock()
                .await
                .as_ref()
                .map(|e| e.to_string()),
        }
    }
}
