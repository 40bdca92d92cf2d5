use chrono::Utc;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::params::WidgetParams;
use crate::bridge::{HostBridge, HostEndpoint};
use crate::config::WidgetConfig;
use crate::engine::SpeechEngine;
use crate::host::{FieldResolver, HostDocument};
use crate::session::{RecognitionSession, SessionError, SessionState};
use crate::transcript::TranscriptReconciler;
use crate::webhook::{resolve_identity, SubmissionRecord, WebhookClient, RESPONSE_TYPE_VOICE};

#[derive(Debug, thiserror::Error)]
pub enum WidgetError {
    #[error("cannot keep a response while recording")]
    StillRecording,

    #[error("no final transcript to keep")]
    NothingToKeep,

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Point-in-time view of a widget for the control API
#[derive(Debug, Clone, Serialize)]
pub struct WidgetSnapshot {
    pub widget_id: String,
    pub question_id: String,
    pub question_title: String,
    pub state: SessionState,
    pub saved: bool,
    /// Committed transcript
    pub transcript: String,
    /// Committed transcript plus pending interim text
    pub display_text: String,
    pub elapsed_seconds: u64,
    pub word_count: usize,
    /// Whether keep/delete actions apply: recording stopped with a
    /// non-empty final transcript, not yet kept
    pub keepable: bool,
    pub last_error: Option<String>,
}

/// Top-level orchestrator binding user actions to the recognition
/// session, reconciler, field resolver, host bridge, and webhook
///
/// Owns every piece of per-instance state; creating one widget per
/// question keeps instances fully isolated.
pub struct WidgetController {
    id: String,
    params: WidgetParams,
    doc: Arc<dyn HostDocument>,
    session: RecognitionSession,
    reconciler: Arc<Mutex<TranscriptReconciler>>,
    resolver: Arc<FieldResolver>,
    bridge: Arc<HostBridge>,
    webhook: WebhookClient,
    saved: AtomicBool,
}

impl WidgetController {
    /// Create a widget instance
    ///
    /// `engine: None` models an environment without a recognition engine;
    /// the widget still constructs so its terminal `Unsupported` state can
    /// be surfaced, but can never record.
    pub async fn new(
        params: WidgetParams,
        engine: Option<Box<dyn SpeechEngine>>,
        doc: Arc<dyn HostDocument>,
        config: &WidgetConfig,
    ) -> (Arc<Self>, HostEndpoint) {
        let reconciler = Arc::new(Mutex::new(TranscriptReconciler::new()));

        let session = match engine {
            Some(engine) => RecognitionSession::new(engine, Arc::clone(&reconciler)),
            None => RecognitionSession::unsupported(Arc::clone(&reconciler)),
        };

        let resolver = Arc::new(FieldResolver::new(
            Arc::clone(&doc),
            config.resolver_config(),
        ));

        let (bridge, endpoint) = HostBridge::connect(Arc::clone(&doc));

        let webhook = WebhookClient::new(
            params
                .webhook_url
                .clone()
                .or_else(|| config.webhook_url.clone()),
        );

        // Identity may arrive later; the keep path falls back gracefully
        bridge.request_user_info().await;

        let widget = Arc::new(Self {
            id: uuid::Uuid::new_v4().to_string(),
            params,
            doc,
            session,
            reconciler,
            resolver,
            bridge,
            webhook,
            saved: AtomicBool::new(false),
        });

        info!(widget_id = %widget.id, question_id = %widget.params.question_id, "widget created");

        (widget, endpoint)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn params(&self) -> &WidgetParams {
        &self.params
    }

    /// Start a new recording session
    pub async fn start(&self) -> Result<(), SessionError> {
        self.session.start().await?;
        self.saved.store(false, Ordering::SeqCst);
        Ok(())
    }

    /// Stop the active recording session; the transcript stays visible
    pub async fn stop(&self) -> Result<(), SessionError> {
        self.session.stop().await
    }

    /// Keep the response: log it, notify the host, and write the
    /// transcript into the host's answer field
    ///
    /// Returns as soon as the work is dispatched; webhook delivery and
    /// field resolution run on their own tasks and never block the caller.
    pub async fn keep_response(&self) -> Result<SubmissionRecord, WidgetError> {
        let snapshot = self.session.snapshot().await;

        if matches!(
            snapshot.state,
            SessionState::Recording | SessionState::RequestingPermission
        ) {
            return Err(WidgetError::StillRecording);
        }

        let (transcript, word_count) = {
            let reconciler = self.reconciler.lock().await;
            (
                reconciler.committed_text().to_string(),
                reconciler.word_count(),
            )
        };

        if transcript.is_empty() {
            return Err(WidgetError::NothingToKeep);
        }

        let identity = self.bridge.identity().await;
        let (rep_name, rep_email) = resolve_identity(
            self.params.name.as_deref(),
            self.params.email.as_deref(),
            &identity,
            &self.doc,
        );

        let now = Utc::now().to_rfc3339();
        let record = SubmissionRecord {
            submission_timestamp: now.clone(),
            recording_start_time: snapshot.started_at.map(|t| t.to_rfc3339()),
            recording_end_time: snapshot.ended_at.map(|t| t.to_rfc3339()),
            timestamp: now,
            rep_name,
            rep_email,
            question_id: self.params.question_id.clone(),
            question_title: self.params.question_title.clone(),
            transcript: transcript.clone(),
            recording_duration: snapshot.elapsed_seconds,
            word_count,
            response_type: RESPONSE_TYPE_VOICE.to_string(),
        };

        self.webhook.send(record.clone());

        self.bridge
            .announce_ready(
                &self.params.question_id,
                &transcript,
                self.params.answer_field_id.as_deref(),
            )
            .await;

        // Field delivery retries with backoff; run it off the caller's
        // path. Failure is non-fatal: the record is already on its way.
        let resolver = Arc::clone(&self.resolver);
        let field_id = self.params.answer_field_id.clone();
        tokio::spawn(async move {
            if let Err(e) = resolver.deliver(field_id.as_deref(), &transcript).await {
                warn!("transcript not written into host field: {}", e);
            }
        });

        self.saved.store(true, Ordering::SeqCst);

        info!(
            widget_id = %self.id,
            words = word_count,
            duration = record.recording_duration,
            "response kept"
        );

        Ok(record)
    }

    /// Discard the response and let the host clear its copy
    pub async fn delete_response(&self) -> Result<(), WidgetError> {
        if self.session.state().await == SessionState::Recording {
            self.session.stop().await?;
        }

        self.reconciler.lock().await.reset();
        self.saved.store(false, Ordering::SeqCst);

        self.bridge
            .announce_deleted(&self.params.question_id)
            .await;

        info!(widget_id = %self.id, "response deleted");

        Ok(())
    }

    pub async fn snapshot(&self) -> WidgetSnapshot {
        let session = self.session.snapshot().await;
        let saved = self.saved.load(Ordering::SeqCst);

        let (transcript, display_text, word_count) = {
            let reconciler = self.reconciler.lock().await;
            (
                reconciler.committed_text().to_string(),
                reconciler.display_text(),
                reconciler.word_count(),
            )
        };

        WidgetSnapshot {
            widget_id: self.id.clone(),
            question_id: self.params.question_id.clone(),
            question_title: self.params.question_title.clone(),
            state: session.state,
            saved,
            keepable: session.state == SessionState::Stopped && !transcript.is_empty() && !saved,
            transcript,
            display_text,
            elapsed_seconds: session.elapsed_seconds,
            word_count,
            last_error: session.last_error,
        }
    }
}
