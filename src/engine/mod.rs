//! Speech recognition engine seam
//!
//! The widget never performs speech-to-text itself; it drives a
//! platform-supplied continuous recognition engine through the
//! `SpeechEngine` trait:
//! - Microphone permission handling
//! - Continuous, interim-results-enabled capture
//! - Result/error/end event delivery over a channel
//! - A scripted implementation for tests and the demo service

mod backend;
mod scripted;

pub use backend::{
    EngineError, EngineEvent, EngineFactory, EngineKind, PermissionState, SpeechEngine,
    TranscriptSegment,
};
pub use scripted::{EngineScript, ScriptStep, ScriptedEngine};
