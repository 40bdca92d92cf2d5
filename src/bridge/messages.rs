use serde::{Deserialize, Serialize};

/// Message protocol between the widget and the host document
///
/// The `type` field discriminates on the wire; payload fields are
/// camelCase to match what the host page's own scripts expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BridgeMessage {
    /// widget → host: ask the host to supply identity
    #[serde(rename = "REQUEST_USER_INFO")]
    RequestUserInfo,

    /// host → widget: identity response
    #[serde(rename = "USER_INFO", rename_all = "camelCase")]
    UserInfo {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        email: Option<String>,
    },

    /// widget → host: transcript finalized; the host may copy it into its
    /// own field model
    #[serde(rename = "VOICE_RESPONSE_READY", rename_all = "camelCase")]
    VoiceResponseReady {
        question_id: String,
        transcript: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        answer_field_id: Option<String>,
    },

    /// widget → host: the user discarded the response; the host should
    /// clear its copy and disable progression
    #[serde(rename = "VOICE_RESPONSE_DELETED", rename_all = "camelCase")]
    VoiceResponseDeleted { question_id: String },
}
