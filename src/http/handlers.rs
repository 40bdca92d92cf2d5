use super::state::{AppState, WidgetEntry};
use crate::bridge::BridgeMessage;
use crate::engine::EngineFactory;
use crate::host::MemoryDocument;
use crate::session::SessionError;
use crate::widget::{WidgetController, WidgetError, WidgetParams};
use axum::{
    extract::{Path, RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct CreateWidgetResponse {
    pub widget_id: String,
    pub question_id: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub widget_id: String,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub widget_id: String,
    pub transcript: String,
    pub display_text: String,
    pub word_count: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: String) -> axum::response::Response {
    (status, Json(ErrorResponse { error })).into_response()
}

fn session_error_status(error: &SessionError) -> StatusCode {
    match error {
        SessionError::Unsupported => StatusCode::NOT_IMPLEMENTED,
        SessionError::PermissionDenied => StatusCode::FORBIDDEN,
        SessionError::AlreadyRecording | SessionError::NotRecording => StatusCode::CONFLICT,
        SessionError::Engine(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn widget_error_status(error: &WidgetError) -> StatusCode {
    match error {
        WidgetError::StillRecording | WidgetError::NothingToKeep => StatusCode::CONFLICT,
        WidgetError::Session(e) => session_error_status(e),
    }
}

async fn find_widget(state: &AppState, widget_id: &str) -> Option<Arc<WidgetEntry>> {
    let widgets = state.widgets.read().await;
    widgets.get(widget_id).cloned()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /widgets?questionId=...&answerFieldId=...
/// Create a widget instance from init query parameters
pub async fn create_widget(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> impl IntoResponse {
    let params = WidgetParams::from_query(query.as_deref().unwrap_or(""));

    info!("Creating widget for question: {}", params.question_id);

    let kind = match EngineFactory::kind_from_config(&state.config.widget.engine) {
        Ok(kind) => kind,
        Err(e) => {
            error!("Invalid engine configuration: {}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Invalid engine configuration: {}", e),
            );
        }
    };

    // A missing platform engine is a terminal condition the widget still
    // reports through its status, not a creation failure
    let engine = match EngineFactory::create(kind) {
        Ok(engine) => Some(engine),
        Err(e) => {
            error!("No recognition engine available: {}", e);
            None
        }
    };

    let field_id = params
        .answer_field_id
        .clone()
        .unwrap_or_else(|| "voice-answer".to_string());
    let doc = Arc::new(MemoryDocument::sample_form(&field_id));

    let (controller, endpoint) =
        WidgetController::new(params, engine, doc, &state.config.widget).await;

    let widget_id = controller.id().to_string();
    let question_id = controller.params().question_id.clone();

    let entry = Arc::new(WidgetEntry {
        controller,
        from_widget: Arc::new(Mutex::new(endpoint.from_widget)),
        to_widget: endpoint.to_widget,
    });

    {
        let mut widgets = state.widgets.write().await;
        widgets.insert(widget_id.clone(), entry);
    }

    info!("Widget created: {}", widget_id);

    (
        StatusCode::OK,
        Json(CreateWidgetResponse {
            widget_id,
            question_id,
            status: "ready".to_string(),
        }),
    )
        .into_response()
}

/// POST /widgets/:widget_id/start
/// Start a recording session
pub async fn start_recording(
    State(state): State<AppState>,
    Path(widget_id): Path<String>,
) -> impl IntoResponse {
    let Some(entry) = find_widget(&state, &widget_id).await else {
        return error_response(
            StatusCode::NOT_FOUND,
            format!("Widget {} not found", widget_id),
        );
    };

    match entry.controller.start().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ActionResponse {
                widget_id,
                status: "recording".to_string(),
                message: "Recording started".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to start recording: {}", e);
            error_response(session_error_status(&e), e.to_string())
        }
    }
}

/// POST /widgets/:widget_id/stop
/// Stop the active recording session
pub async fn stop_recording(
    State(state): State<AppState>,
    Path(widget_id): Path<String>,
) -> impl IntoResponse {
    let Some(entry) = find_widget(&state, &widget_id).await else {
        return error_response(
            StatusCode::NOT_FOUND,
            format!("Widget {} not found", widget_id),
        );
    };

    match entry.controller.stop().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ActionResponse {
                widget_id,
                status: "stopped".to_string(),
                message: "Recording stopped".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to stop recording: {}", e);
            error_response(session_error_status(&e), e.to_string())
        }
    }
}

/// POST /widgets/:widget_id/keep
/// Keep the response: log, notify the host, write the host field
pub async fn keep_response(
    State(state): State<AppState>,
    Path(widget_id): Path<String>,
) -> impl IntoResponse {
    let Some(entry) = find_widget(&state, &widget_id).await else {
        return error_response(
            StatusCode::NOT_FOUND,
            format!("Widget {} not found", widget_id),
        );
    };

    match entry.controller.keep_response().await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => {
            error!("Failed to keep response: {}", e);
            error_response(widget_error_status(&e), e.to_string())
        }
    }
}

/// POST /widgets/:widget_id/delete
/// Discard the response
pub async fn delete_response(
    State(state): State<AppState>,
    Path(widget_id): Path<String>,
) -> impl IntoResponse {
    let Some(entry) = find_widget(&state, &widget_id).await else {
        return error_response(
            StatusCode::NOT_FOUND,
            format!("Widget {} not found", widget_id),
        );
    };

    match entry.controller.delete_response().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ActionResponse {
                widget_id,
                status: "ready".to_string(),
                message: "Response deleted".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to delete response: {}", e);
            error_response(widget_error_status(&e), e.to_string())
        }
    }
}

/// GET /widgets/:widget_id/status
/// Get a widget snapshot
pub async fn get_widget_status(
    State(state): State<AppState>,
    Path(widget_id): Path<String>,
) -> impl IntoResponse {
    match find_widget(&state, &widget_id).await {
        Some(entry) => (StatusCode::OK, Json(entry.controller.snapshot().await)).into_response(),
        None => error_response(
            StatusCode::NOT_FOUND,
            format!("Widget {} not found", widget_id),
        ),
    }
}

/// GET /widgets/:widget_id/transcript
/// Get the reconciled transcript
pub async fn get_widget_transcript(
    State(state): State<AppState>,
    Path(widget_id): Path<String>,
) -> impl IntoResponse {
    match find_widget(&state, &widget_id).await {
        Some(entry) => {
            let snapshot = entry.controller.snapshot().await;
            (
                StatusCode::OK,
                Json(TranscriptResponse {
                    widget_id,
                    transcript: snapshot.transcript,
                    display_text: snapshot.display_text,
                    word_count: snapshot.word_count,
                }),
            )
                .into_response()
        }
        None => error_response(
            StatusCode::NOT_FOUND,
            format!("Widget {} not found", widget_id),
        ),
    }
}

/// GET /widgets/:widget_id/messages
/// Drain pending widget → host messages
pub async fn drain_widget_messages(
    State(state): State<AppState>,
    Path(widget_id): Path<String>,
) -> impl IntoResponse {
    let Some(entry) = find_widget(&state, &widget_id).await else {
        return error_response(
            StatusCode::NOT_FOUND,
            format!("Widget {} not found", widget_id),
        );
    };

    let mut messages: Vec<BridgeMessage> = Vec::new();
    {
        let mut from_widget = entry.from_widget.lock().await;
        while let Ok(message) = from_widget.try_recv() {
            messages.push(message);
        }
    }

    (StatusCode::OK, Json(messages)).into_response()
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
