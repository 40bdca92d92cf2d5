//! Transcript reconciliation
//!
//! Continuous recognizers re-emit overlapping or superset/substring
//! variants of text they already delivered as final. Naive concatenation
//! produces visible duplicate phrases; the reconciler collapses them into
//! a single append-only transcript.

mod reconciler;

pub use reconciler::{normalize, FinalOutcome, TranscriptReconciler};
