//! Submission logging
//!
//! One record per kept response, shipped to an external HTTP sink with
//! fire-and-forget delivery: the response is never awaited or interpreted
//! because cross-origin constraints make it unreadable anyway.

mod client;
mod record;

pub use client::WebhookClient;
pub use record::{resolve_identity, SubmissionRecord, RESPONSE_TYPE_VOICE};
