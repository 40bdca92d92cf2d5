use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Widget lifecycle
        .route("/widgets", post(handlers::create_widget))
        .route("/widgets/:widget_id/start", post(handlers::start_recording))
        .route("/widgets/:widget_id/stop", post(handlers::stop_recording))
        .route("/widgets/:widget_id/keep", post(handlers::keep_response))
        .route("/widgets/:widget_id/delete", post(handlers::delete_response))
        // Widget queries
        .route("/widgets/:widget_id/status", get(handlers::get_widget_status))
        .route(
            "/widgets/:widget_id/transcript",
            get(handlers::get_widget_transcript),
        )
        .route(
            "/widgets/:widget_id/messages",
            get(handlers::drain_widget_messages),
        )
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
