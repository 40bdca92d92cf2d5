use anyhow::Result;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::debug;

use super::backend::{EngineError, EngineEvent, PermissionState, SpeechEngine, TranscriptSegment};

/// One step of a scripted capture
#[derive(Debug, Clone)]
pub enum ScriptStep {
    /// Sleep before playing the next step
    Wait(Duration),
    /// Deliver a result batch
    Emit(Vec<TranscriptSegment>),
    /// Deliver an engine error
    Fail(EngineError),
    /// Close the event stream spontaneously, as continuous engines do
    /// after a silence window. Remaining steps play after the next `open`.
    EndStream,
}

/// Script driving a `ScriptedEngine`
#[derive(Debug, Clone, Default)]
pub struct EngineScript {
    pub steps: Vec<ScriptStep>,
    /// Deny this many permission requests before granting
    pub deny_permission_times: usize,
}

impl EngineScript {
    pub fn new(steps: Vec<ScriptStep>) -> Self {
        Self {
            steps,
            deny_permission_times: 0,
        }
    }

    /// Canned capture used by the demo service: an interim result, a
    /// corrected final, a silence-window end, and a second utterance
    /// after the transparent restart.
    pub fn demo() -> Self {
        Self::new(vec![
            ScriptStep::Wait(Duration::from_millis(150)),
            ScriptStep::Emit(vec![TranscriptSegment::interim_text(0, "this is a")]),
            ScriptStep::Wait(Duration::from_millis(150)),
            ScriptStep::Emit(vec![TranscriptSegment::final_text(
                0,
                "this is a demo voice response",
            )]),
            ScriptStep::EndStream,
            ScriptStep::Wait(Duration::from_millis(150)),
            ScriptStep::Emit(vec![TranscriptSegment::final_text(
                1,
                "captured across an engine restart",
            )]),
        ])
    }
}

/// Deterministic recognition engine playing back a script
///
/// Used wherever a real recognizer would be injected by the embedding
/// platform: state-machine tests, resolver/widget integration tests, and
/// the demo service. Implements the same event contract the session's
/// auto-restart logic depends on.
pub struct ScriptedEngine {
    steps: Arc<Mutex<VecDeque<ScriptStep>>>,
    deny_permission_remaining: usize,
    capturing: Arc<AtomicBool>,
    player: Option<JoinHandle<()>>,
}

impl ScriptedEngine {
    pub fn new(script: EngineScript) -> Self {
        Self {
            steps: Arc::new(Mutex::new(script.steps.into())),
            deny_permission_remaining: script.deny_permission_times,
            capturing: Arc::new(AtomicBool::new(false)),
            player: None,
        }
    }
}

impl Drop for ScriptedEngine {
    fn drop(&mut self) {
        if let Some(player) = self.player.take() {
            player.abort();
        }
    }
}

#[async_trait::async_trait]
impl SpeechEngine for ScriptedEngine {
    async fn request_permission(&mut self) -> Result<PermissionState> {
        if self.deny_permission_remaining > 0 {
            self.deny_permission_remaining -= 1;
            debug!("scripted engine denying microphone permission");
            return Ok(PermissionState::Denied);
        }
        Ok(PermissionState::Granted)
    }

    async fn open(&mut self) -> Result<mpsc::Receiver<EngineEvent>> {
        let (tx, rx) = mpsc::channel(32);

        self.capturing.store(true, Ordering::SeqCst);

        let steps = Arc::clone(&self.steps);
        let capturing = Arc::clone(&self.capturing);

        self.player = Some(tokio::spawn(async move {
            loop {
                if !capturing.load(Ordering::SeqCst) {
                    break;
                }

                let step = { steps.lock().await.pop_front() };

                match step {
                    // Script exhausted: stay open and silent until closed,
                    // like a real engine waiting for speech
                    None => std::future::pending::<()>().await,

                    Some(ScriptStep::Wait(duration)) => tokio::time::sleep(duration).await,

                    Some(ScriptStep::Emit(segments)) => {
                        if tx.send(EngineEvent::Result { segments }).await.is_err() {
                            break;
                        }
                    }

                    Some(ScriptStep::Fail(error)) => {
                        if tx.send(EngineEvent::Error(error)).await.is_err() {
                            break;
                        }
                    }

                    Some(ScriptStep::EndStream) => {
                        let _ = tx.send(EngineEvent::Ended).await;
                        break;
                    }
                }
            }
        }));

        Ok(rx)
    }

    async fn close(&mut self) -> Result<()> {
        self.capturing.store(false, Ordering::SeqCst);

        if let Some(player) = self.player.take() {
            player.abort();
        }

        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
