//! Recording session management
//!
//! This module provides the `RecognitionSession` state machine that manages:
//! - Microphone permission and engine lifecycle
//! - Transparent engine restart across platform silence-window ends
//! - Error classification and surfacing
//! - The recording clock and session snapshots

mod clock;
mod session;

pub use clock::RecordingClock;
pub use session::{RecognitionSession, SessionError, SessionSnapshot, SessionState};
