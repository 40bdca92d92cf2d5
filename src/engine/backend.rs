use anyhow::Result;
use tokio::sync::mpsc;

/// A single recognition result from the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptSegment {
    /// Recognized text
    pub text: String,
    /// Whether the engine considers this text settled (not subject to revision)
    pub is_final: bool,
    /// Position in the engine's result list; strictly increasing within a capture
    pub sequence_index: usize,
}

impl TranscriptSegment {
    pub fn final_text(sequence_index: usize, text: &str) -> Self {
        Self {
            text: text.to_string(),
            is_final: true,
            sequence_index,
        }
    }

    pub fn interim_text(sequence_index: usize, text: &str) -> Self {
        Self {
            text: text.to_string(),
            is_final: false,
            sequence_index,
        }
    }
}

/// Engine-level error classification
///
/// `NoSpeechTimeout` is not an error condition for this domain: continuous
/// engines raise it after a silence window and capture must survive it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("microphone permission denied")]
    PermissionDenied,

    #[error("no speech before engine silence timeout")]
    NoSpeechTimeout,

    #[error("recognition aborted")]
    Aborted,

    #[error("recognition error: {0}")]
    Other(String),
}

/// Event emitted by an open recognition engine
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A batch of *new* segments since the last event, in increasing
    /// sequence order (per the engine contract)
    Result { segments: Vec<TranscriptSegment> },

    /// Engine-reported error; capture may or may not continue
    Error(EngineError),

    /// The engine closed on its own. Continuous engines do this
    /// periodically after a silence window.
    Ended,
}

/// Outcome of a microphone permission request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Denied,
}

/// Continuous speech recognition engine
///
/// Implementations:
/// - Scripted: deterministic event playback (tests, demo service)
/// - Platform: a real recognizer supplied by the embedding environment
#[async_trait::async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Request microphone access. May be denied by the user.
    async fn request_permission(&mut self) -> Result<PermissionState>;

    /// Open a continuous, interim-results-enabled capture.
    ///
    /// Returns a channel receiver for recognition events. Each call yields
    /// a fresh event stream; re-opening after `Ended` resumes capture.
    async fn open(&mut self) -> Result<mpsc::Receiver<EngineEvent>>;

    /// Close the capture. Cooperative: in-flight events may still arrive
    /// before the stream ends.
    async fn close(&mut self) -> Result<()>;

    /// Check if the engine is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get engine name for logging
    fn name(&self) -> &str;
}

/// Which engine to create
#[derive(Debug, Clone)]
pub enum EngineKind {
    /// Deterministic scripted engine (tests, demo service)
    Scripted(super::EngineScript),
    /// Recognizer supplied by the embedding platform
    Platform,
}

/// Recognition engine factory
pub struct EngineFactory;

impl EngineFactory {
    /// Create an engine for the requested kind
    ///
    /// An environment with no usable recognizer is a terminal condition:
    /// the widget surfaces it once and never retries.
    pub fn create(kind: EngineKind) -> Result<Box<dyn SpeechEngine>> {
        match kind {
            EngineKind::Scripted(script) => Ok(Box::new(super::ScriptedEngine::new(script))),

            EngineKind::Platform => {
                anyhow::bail!("no platform speech recognition engine is available")
            }
        }
    }

    /// Parse an engine kind from a config string
    pub fn kind_from_config(name: &str) -> Result<EngineKind> {
        match name {
            "scripted" => Ok(EngineKind::Scripted(super::EngineScript::demo())),
            "platform" => Ok(EngineKind::Platform),
            other => anyhow::bail!("unknown engine kind: {}", other),
        }
    }
}
