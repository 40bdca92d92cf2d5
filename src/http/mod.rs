//! HTTP API server for external control
//!
//! This module provides a REST API for driving widget instances:
//! - POST /widgets - Create a widget from init query parameters
//! - POST /widgets/:id/start - Start recording
//! - POST /widgets/:id/stop - Stop recording
//! - POST /widgets/:id/keep - Keep the response
//! - POST /widgets/:id/delete - Discard the response
//! - GET /widgets/:id/status - Query widget status
//! - GET /widgets/:id/transcript - Get the reconciled transcript
//! - GET /widgets/:id/messages - Drain widget → host messages
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
