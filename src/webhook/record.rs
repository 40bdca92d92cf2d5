use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::bridge::HostIdentity;
use crate::host::HostDocument;

pub const RESPONSE_TYPE_VOICE: &str = "Voice";

/// Placeholders used when no identity source yields a value; logging is
/// prioritized over completeness
pub const PLACEHOLDER_NAME: &str = "Unknown";
pub const PLACEHOLDER_EMAIL: &str = "Not provided";

/// Record shipped to the logging sink, one per kept response
///
/// Immutable once constructed; the sink is append-only and offers no
/// update or delete semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub submission_timestamp: String,
    pub recording_start_time: Option<String>,
    pub recording_end_time: Option<String>,
    pub timestamp: String,
    pub rep_name: String,
    pub rep_email: String,
    pub question_id: String,
    pub question_title: String,
    pub transcript: String,
    /// Recording duration in whole seconds
    pub recording_duration: u64,
    pub word_count: usize,
    pub response_type: String,
}

/// Best-effort identity recovery
///
/// Precedence: widget init parameters, then the latest host-supplied
/// identity, then direct inspection of host-document inputs that look
/// name- or email-like. Missing values get explicit placeholders rather
/// than blocking submission.
pub fn resolve_identity(
    param_name: Option<&str>,
    param_email: Option<&str>,
    host: &HostIdentity,
    doc: &Arc<dyn HostDocument>,
) -> (String, String) {
    let name = non_empty(param_name)
        .or_else(|| host.name.clone())
        .or_else(|| sniff_input(doc, &["name"], &[]))
        .unwrap_or_else(|| PLACEHOLDER_NAME.to_string());

    let email = non_empty(param_email)
        .or_else(|| host.email.clone())
        .or_else(|| sniff_input(doc, &["email"], &["email"]))
        .unwrap_or_else(|| PLACEHOLDER_EMAIL.to_string());

    (name, email)
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Scan host-document inputs for one whose attributes or label suggest
/// the wanted field, returning its non-empty value
fn sniff_input(doc: &Arc<dyn HostDocument>, keywords: &[&str], types: &[&str]) -> Option<String> {
    for node in doc.text_inputs() {
        let Some(snapshot) = doc.probe(node) else {
            continue;
        };

        if snapshot.value.trim().is_empty() {
            continue;
        }

        let type_attr = snapshot.attrs.get("type").map(String::as_str).unwrap_or("");
        if types.contains(&type_attr) {
            return Some(snapshot.value.trim().to_string());
        }

        let haystack = format!(
            "{} {} {}",
            snapshot.attrs.get("id").map(String::as_str).unwrap_or(""),
            snapshot.attrs.get("name").map(String::as_str).unwrap_or(""),
            snapshot.label_text.as_deref().unwrap_or("")
        )
        .to_lowercase();

        if keywords.iter().any(|k| haystack.contains(k)) {
            return Some(snapshot.value.trim().to_string());
        }
    }

    None
}
